//! Error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::error::{ErrorKind, PkgError};

/// Status code for an orchestrator error
pub(super) fn status_for(err: &PkgError) -> StatusCode {
    match err.kind() {
        ErrorKind::Parse | ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Upstream | ErrorKind::Sync | ErrorKind::Config | ErrorKind::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Plain text `"<context>: <error>"` response, logged at error level
pub(super) fn error_response(context: &str, err: &PkgError) -> Response {
    let status = status_for(err);
    error!(status = status.as_u16(), error = %err, "{context}");
    (status, format!("{context}: {err}")).into_response()
}
