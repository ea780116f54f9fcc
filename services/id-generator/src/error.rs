use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use diamond_utils::{DiamondError, ErrorResponse};
use tracing::error;

/// Handler error rendered as a JSON `ErrorResponse`
#[derive(Debug)]
pub struct ApiError(pub DiamondError);

impl<E> From<E> for ApiError
where
    E: Into<DiamondError>,
{
    fn from(error: E) -> Self {
        Self(error.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(code = self.0.error_code(), error = %self.0, "Request failed");
        }

        (status, Json(ErrorResponse::from(self.0))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
