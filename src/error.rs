use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
///
/// Every variant maps to a stable error code and an HTTP status, so callers
/// can branch on the code rather than the message.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired, please sign in again")]
    TokenExpired,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Email already registered: {0}")]
    EmailExists(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Menu not found: {0}")]
    MenuNotFound(i64),

    #[error("Menu {0} cannot be its own parent")]
    SelfParent(i64),

    #[error("Moving menu {id} under {parent_id} would create a cycle")]
    CycleDetected { id: i64, parent_id: i64 },

    #[error("Menu {0} still has child menus")]
    HasChildren(i64),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl AppError {
    /// Stable machine-readable code
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Internal(_) | AppError::Database(_) => "ERROR-COMM-E001",
            AppError::NotFound(_) => "ERROR-COMM-E003",
            AppError::Validation(_) => "ERROR-COMM-E004",
            AppError::BadRequest(_) => "ERROR-COMM-E005",
            AppError::MenuNotFound(_) => "ERROR-MENU-E001",
            AppError::SelfParent(_) => "ERROR-MENU-E002",
            AppError::CycleDetected { .. } => "ERROR-MENU-E003",
            AppError::HasChildren(_) => "ERROR-MENU-E004",
            AppError::UserNotFound => "ERROR-USER-E001",
            AppError::InvalidCredentials => "ERROR-USER-E004",
            AppError::EmailExists(_) => "ERROR-USER-E010",
            AppError::InvalidToken => "ERROR-JWT-E001",
            AppError::TokenExpired => "ERROR-JWT-E004",
            AppError::Unauthorized => "ERROR-JWT-E005",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized
            | AppError::InvalidToken
            | AppError::TokenExpired
            | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::UserNotFound | AppError::NotFound(_) | AppError::MenuNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::EmailExists(_) | AppError::HasChildren(_) => StatusCode::CONFLICT,
            AppError::SelfParent(_)
            | AppError::CycleDetected { .. }
            | AppError::Validation(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    success: bool,
    code: u16,
    error_code: &'static str,
    message: String,
    timestamp: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal Server Error".to_string()
            }
            AppError::Database(err) => {
                tracing::error!("Database error: {}", err);
                "Database Error".to_string()
            }
            other => {
                tracing::debug!("Request failed: {}", other);
                other.to_string()
            }
        };

        let body = ErrorResponse {
            success: false,
            code: status.as_u16(),
            error_code: self.error_code(),
            message,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for application
pub type AppResult<T> = Result<T, AppError>;

/// Helper trait for converting Option to AppError::NotFound
pub trait OptionExt<T> {
    fn ok_or_not_found(self, msg: impl Into<String>) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, msg: impl Into<String>) -> AppResult<T> {
        self.ok_or_else(|| AppError::NotFound(msg.into()))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::Internal(format!("password hashing failed: {}", err))
    }
}
