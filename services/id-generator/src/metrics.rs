//! Prometheus metrics for batch generation.
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `diamond_batches_total` | Counter | `category`, `rule_set` |
//! | `diamond_rows_total` | Counter | `category` |
//! | `diamond_row_failures_total` | Counter | `sentinel` |
//! | `diamond_missing_column_rejections_total` | Counter | `category` |

use diamond_engine::GenerationReport;
use diamond_models::Category;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("failed to register metric: {0}")]
    Registration(#[from] prometheus::Error),

    #[error("failed to encode metrics: {0}")]
    Encoding(String),
}

pub type MetricsResult<T> = Result<T, MetricsError>;

/// Counters owned by a private registry so each app instance starts at zero.
#[derive(Clone)]
pub struct GeneratorMetrics {
    registry: Registry,
    batches_total: IntCounterVec,
    rows_total: IntCounterVec,
    row_failures_total: IntCounterVec,
    missing_column_rejections_total: IntCounterVec,
}

impl GeneratorMetrics {
    pub fn new() -> MetricsResult<Self> {
        let registry = Registry::new();

        let batches_total = IntCounterVec::new(
            Opts::new("diamond_batches_total", "Batches processed"),
            &["category", "rule_set"],
        )?;
        registry.register(Box::new(batches_total.clone()))?;

        let rows_total = IntCounterVec::new(Opts::new("diamond_rows_total", "Rows processed"), &["category"])?;
        registry.register(Box::new(rows_total.clone()))?;

        let row_failures_total = IntCounterVec::new(
            Opts::new("diamond_row_failures_total", "Rows written with a sentinel instead of an ID"),
            &["sentinel"],
        )?;
        registry.register(Box::new(row_failures_total.clone()))?;

        let missing_column_rejections_total = IntCounterVec::new(
            Opts::new(
                "diamond_missing_column_rejections_total",
                "Batches rejected for missing required columns",
            ),
            &["category"],
        )?;
        registry.register(Box::new(missing_column_rejections_total.clone()))?;

        Ok(Self {
            registry,
            batches_total,
            rows_total,
            row_failures_total,
            missing_column_rejections_total,
        })
    }

    pub fn record_report(&self, report: &GenerationReport) {
        let category = report.category.prefix().to_string();

        self.batches_total
            .with_label_values(&[category.as_str(), report.rule_set.as_str()])
            .inc();
        self.rows_total
            .with_label_values(&[category.as_str()])
            .inc_by(report.summary.total_rows as u64);

        for failure in report.outcomes.iter().filter_map(|outcome| outcome.failure()) {
            self.row_failures_total
                .with_label_values(&[failure.sentinel()])
                .inc();
        }
    }

    pub fn record_missing_columns(&self, category: Category) {
        self.missing_column_rejections_total
            .with_label_values(&[category.prefix().to_string().as_str()])
            .inc();
    }

    /// Text exposition format for scraping
    pub fn encode_text(&self) -> MetricsResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| MetricsError::Encoding(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| MetricsError::Encoding(e.to_string()))
    }
}
