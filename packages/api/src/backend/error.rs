//! Errors raised while talking to the hosted backend.

use store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0} is not set")]
    MissingEnv(&'static str),

    #[error("request to backend failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("unexpected response from backend: {0}")]
    Response(String),

    #[error("Not authenticated")]
    Unauthenticated,
}

impl From<BackendError> for StoreError {
    fn from(err: BackendError) -> Self {
        let status = match &err {
            BackendError::Status { status, .. } => *status,
            BackendError::Http(e) => e.status().map(|s| s.as_u16()).unwrap_or(0),
            BackendError::Unauthenticated => 401,
            _ => 0,
        };
        let message = match err {
            BackendError::Status { message, .. } => message,
            other => other.to_string(),
        };
        StoreError::Backend { status, message }
    }
}
