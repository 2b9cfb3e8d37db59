// Error taxonomy shared by every layer of the service.
//
// Every failure surfaced to a caller maps onto one of these kinds; the
// HTTP layer renders them as a status code plus an {"error": ...} JSON
// body. Infrastructure failures (database, disk) are masked as 500s and
// logged server-side.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required request field was absent or empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The uploaded filename does not carry an allowed extension.
    #[error("Invalid file type")]
    InvalidFileType,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Category already exists")]
    AlreadyExists,

    /// The login credential could not be verified. Deliberately carries
    /// no detail: the cause is logged, never returned to the caller.
    #[error("Invalid token")]
    InvalidCredential,

    /// The credential verified fine but the email is not the admin's.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingField(_)
            | ApiError::InvalidFileType
            | ApiError::AlreadyExists
            | ApiError::InvalidCredential
            | ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Io(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Infrastructure details stay in the logs.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub type AppResult<T> = std::result::Result<T, ApiError>;
