//! Diamond ID Generation Handlers
//!
//! Both endpoints take a multipart upload with one file field plus the
//! category as a query parameter. Preview returns the processed table as JSON,
//! download returns it as a CSV attachment.

use axum::{
    extract::{Multipart, Query, State},
    http::{header, HeaderName},
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use diamond_engine::{GenerationReport, GenerationSummary};
use diamond_models::{Category, RuleSet};
use diamond_utils::{
    validate_file_size, validate_file_type, validate_model, BomFormat, BomParser, BomWriter, DiamondError,
    ParsedBom,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::error::ApiResult;
use crate::AppState;

const ALLOWED_EXTENSIONS: &[&str] = &["csv", "txt", "xlsx", "xls"];

/// Number of parse and validation warnings behind a CSV download
pub const WARNINGS_HEADER: &str = "x-diamond-warnings";

/// Query parameters shared by preview and download
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateParams {
    /// Selector label (`"5: Cladding Assy"`) or bare prefix digit
    #[validate(length(min = 1, max = 64))]
    pub category: String,
    pub rule_set: Option<RuleSet>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub message: String,
    pub category: Category,
    pub rule_set: RuleSet,
    pub filename: String,
    pub output_column: String,
    pub download_filename: String,
    pub summary: GenerationSummary,
    pub warnings: Vec<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub generated_at: DateTime<Utc>,
}

struct Upload {
    filename: String,
    content_type: Option<String>,
    data: Vec<u8>,
}

/// Generate IDs and return the processed table
///
/// POST /api/v1/diamond-ids/preview
pub async fn preview_diamond_ids(
    State(state): State<AppState>,
    Query(params): Query<GenerateParams>,
    multipart: Multipart,
) -> ApiResult<Json<PreviewResponse>> {
    let (bom, report) = process_upload(&state, params, multipart).await?;

    Ok(Json(PreviewResponse {
        message: format!(
            "Generated {} Diamond IDs for {}",
            report.summary.generated, report.category
        ),
        category: report.category,
        rule_set: report.rule_set,
        filename: bom.filename,
        output_column: report.output_column,
        download_filename: report.category.download_filename(),
        summary: report.summary,
        warnings: report.warnings,
        headers: bom.column_headers,
        rows: bom.rows.into_iter().map(|row| row.values).collect(),
        generated_at: report.generated_at,
    }))
}

/// Generate IDs and return the processed table as a CSV attachment
///
/// POST /api/v1/diamond-ids/download
pub async fn download_diamond_ids(
    State(state): State<AppState>,
    Query(params): Query<GenerateParams>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let (bom, report) = process_upload(&state, params, multipart).await?;
    let body = BomWriter::new().with_delimiter(state.delimiter).to_csv(&bom)?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        report.category.download_filename()
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (HeaderName::from_static(WARNINGS_HEADER), report.warnings.len().to_string()),
        ],
        body,
    ))
}

async fn process_upload(
    state: &AppState,
    params: GenerateParams,
    multipart: Multipart,
) -> ApiResult<(ParsedBom, GenerationReport)> {
    validate_model(&params)?;
    let category: Category = params.category.parse()?;
    let generator = state.generator(params.rule_set);

    let upload = read_upload(multipart).await?;
    let format = BomFormat::detect(&upload.filename, upload.content_type.as_deref());
    if format.is_none() {
        validate_file_type(&upload.filename, ALLOWED_EXTENSIONS)?;
    }
    validate_file_size(upload.data.len() as u64, state.config.server.max_request_size as u64)?;

    info!(
        category = %category,
        rule_set = %generator.rule_set(),
        filename = %upload.filename,
        bytes = upload.data.len(),
        "Processing BOM upload"
    );

    let delimiter = state.delimiter;
    let result = tokio::task::spawn_blocking(move || {
        let mut bom = BomParser::new()
            .with_delimiter(delimiter)
            .parse_bytes(&upload.filename, &upload.data, format)
            .map_err(|e| DiamondError::bom_parsing(format!("{:#}", e)))?;
        let report = generator.generate_into(category, &mut bom)?;
        Ok::<_, DiamondError>((bom, report))
    })
    .await
    .map_err(|e| DiamondError::internal(format!("Generation task failed: {}", e)))?;

    match result {
        Ok((bom, report)) => {
            state.metrics.record_report(&report);
            Ok((bom, report))
        }
        Err(err) => {
            if let DiamondError::MissingColumns { columns } = &err {
                warn!(category = %category, missing = ?columns, "Upload rejected");
                state.metrics.record_missing_columns(category);
            }
            Err(err.into())
        }
    }
}

async fn read_upload(mut multipart: Multipart) -> ApiResult<Upload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DiamondError::bom_parsing(format!("Failed to read upload: {}", e)))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| DiamondError::bom_parsing(format!("Failed to read file data: {}", e)))?;

        return Ok(Upload {
            filename,
            content_type,
            data: data.to_vec(),
        });
    }

    Err(DiamondError::validation("file", "No file provided").into())
}
