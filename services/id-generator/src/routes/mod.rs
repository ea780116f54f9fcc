use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers::*, AppState};

pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .nest("/diamond-ids", diamond_id_routes())
}

fn diamond_id_routes() -> Router<AppState> {
    Router::new()
        .route("/preview", post(preview_diamond_ids))
        .route("/download", post(download_diamond_ids))
}
