//! Diamond ID Generator Service
//!
//! HTTP front end for the Diamond ID engine: upload a BOM, pick a category,
//! preview the generated IDs or download the BOM with the ID column appended.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, Method},
    routing::get,
    serve, Router,
};
use diamond_engine::DiamondIdGenerator;
use diamond_models::RuleSet;
use diamond_utils::{init_logging, AppConfig};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

mod error;
mod handlers;
mod metrics;
mod middleware;
mod routes;

use handlers::{health_check, metrics_handler};
use metrics::GeneratorMetrics;
use middleware::request_id_middleware;

#[tokio::main]
async fn main() -> Result<()> {
    let (config, load_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    init_logging(&config.logging)?;
    if let Some(e) = load_error {
        warn!(error = %e, "Failed to load configuration, using defaults");
    }
    info!(rule_set = %config.generator.rule_set, "Starting Diamond ID generator");

    let state = AppState::new(config).context("Invalid configuration")?;
    let app = create_app(state.clone());

    let addr: SocketAddr = state
        .config
        .bind_address()
        .parse()
        .context("Invalid server bind address")?;
    let listener = TcpListener::bind(&addr).await?;
    info!("Diamond ID generator listening on {}", addr);

    serve(listener, app).await?;

    Ok(())
}

pub fn create_app(state: AppState) -> Router {
    let request_id = HeaderName::from_static(middleware::REQUEST_ID_HEADER);

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .nest("/api/v1", routes::create_api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([Method::GET, Method::POST])
                        .allow_headers([header::CONTENT_TYPE, request_id.clone()])
                        .expose_headers([
                            header::CONTENT_DISPOSITION,
                            request_id,
                            HeaderName::from_static(handlers::WARNINGS_HEADER),
                        ]),
                )
                .layer(TimeoutLayer::new(Duration::from_secs(state.config.server.timeout_seconds)))
                .layer(DefaultBodyLimit::max(state.config.server.max_request_size)),
        )
        .with_state(state)
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub delimiter: u8,
    pub metrics: Arc<GeneratorMetrics>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let delimiter = config.generator.delimiter_byte()?;
        let metrics = GeneratorMetrics::new()?;

        Ok(Self {
            config: Arc::new(config),
            delimiter,
            metrics: Arc::new(metrics),
        })
    }

    /// Generator for one request; `rule_set` overrides the configured default.
    pub fn generator(&self, rule_set: Option<RuleSet>) -> DiamondIdGenerator {
        let settings = &self.config.generator;
        DiamondIdGenerator::new(rule_set.unwrap_or(settings.rule_set)).with_max_rows(settings.max_rows)
    }
}

#[cfg(test)]
mod tests;
