use addrmatch_core::LoadError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

pub type LookupResult<T> = Result<T, LookupError>;

/// Failures a lookup request can end in.
///
/// A query that simply finds nothing is not an error; see
/// [`LookupOutcome::NoMatch`](crate::service::LookupOutcome::NoMatch).
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Corpus unavailable: {0}")]
    Load(#[from] LoadError),
}

impl LookupError {
    pub fn query_too_short() -> Self {
        LookupError::Validation("Query must be at least 3 characters".to_string())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            LookupError::Validation(_) | LookupError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            LookupError::Load(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the caller; load failures stay in the log
    fn public_message(&self) -> String {
        match self {
            LookupError::Validation(message) => message.clone(),
            LookupError::InvalidBody(_) => "Invalid request body".to_string(),
            LookupError::Load(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        if let LookupError::Load(err) = &self {
            error!(error = %err, "Address lookup error");
        }

        let body = Json(json!({
            "success": false,
            "error": self.public_message(),
        }));

        (self.status_code(), body).into_response()
    }
}
