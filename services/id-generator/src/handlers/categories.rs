//! Category selector options.

use axum::{
    extract::{Query, State},
    response::Json,
};
use diamond_models::{Category, RuleSet};
use serde::{Deserialize, Serialize};

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub rule_set: Option<RuleSet>,
}

#[derive(Debug, Serialize)]
pub struct CategoryInfo {
    pub prefix: u8,
    pub name: &'static str,
    pub label: String,
    pub required_columns: Vec<&'static str>,
    pub output_column: &'static str,
    pub download_filename: String,
}

/// GET /api/v1/categories
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Json<Vec<CategoryInfo>> {
    let generator = state.generator(query.rule_set);

    let categories = Category::ALL
        .iter()
        .map(|&category| CategoryInfo {
            prefix: category.prefix(),
            name: category.name(),
            label: category.label(),
            required_columns: generator.required_columns(category).to_vec(),
            output_column: category.output_column(),
            download_filename: category.download_filename(),
        })
        .collect();

    Json(categories)
}
