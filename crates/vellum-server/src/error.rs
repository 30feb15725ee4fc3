use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use vellum_collate::CollateError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Collate(#[from] CollateError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// Map an error to the status code returned to the caller.
pub fn status_for(err: &ServerError) -> StatusCode {
    match err {
        ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        ServerError::Collate(e) if e.is_not_found() => StatusCode::NOT_FOUND,
        ServerError::Collate(e) if e.is_invalid_key() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Detail of a failed request, attached to 5xx responses for server-side
/// logging. Never rendered into the response body.
#[derive(Clone, Debug)]
pub struct ErrorDetail(pub String);

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        match status {
            StatusCode::NOT_FOUND => (status, "artifact not found").into_response(),
            StatusCode::BAD_REQUEST => {
                let body = match &self {
                    ServerError::InvalidRequest(reason) => reason.clone(),
                    _ => "invalid artifact key".to_string(),
                };
                (status, body).into_response()
            }
            _ => {
                let mut response = status.into_response();
                response.extensions_mut().insert(ErrorDetail(self.to_string()));
                response
            }
        }
    }
}
