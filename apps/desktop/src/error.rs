//! # Shell Error Types
//!
//! [`ShellError`] for misuse of the window machinery and [`AppError`], the
//! one error type the shell hands to a message box.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Coinbox                                │
//! │                                                                         │
//! │  ValidationError ─┐                                                     │
//! │  FormError ───────┤                                                     │
//! │  PrintingError ───┼──► AppError { code, message } ──► message box      │
//! │  DbError ─────────┤         │                                           │
//! │  ShellError ──────┘         └── internal causes: tracing::error!,       │
//! │                                 message replaced by a generic one       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

use coinbox_core::{FormError, PrintingError, ValidationError};
use coinbox_db::DbError;

// =============================================================================
// Shell Error
// =============================================================================

/// Misuse of the UI handler or the main window.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShellError {
    /// A window was chained after `start()`.
    #[error("Application already started, cannot chain window")]
    AlreadyStarted,

    /// A window was replaced before `start()`.
    #[error("Application not started, cannot replace window")]
    NotStarted,

    /// An extension was registered after the main window was built.
    #[error("Main window already composed, cannot add extension '{0}'")]
    ExtensionsComposed(String),

    /// A tab index outside the window's tabs.
    #[error("No tab at index {0}")]
    UnknownTab(usize),
}

// =============================================================================
// App Error
// =============================================================================

/// User-facing error.
///
/// ## Serialization
/// ```json
/// { "code": "VALIDATION_ERROR", "message": "name is required" }
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for [`AppError`].
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Database operation failed
    DatabaseError,

    /// Printer configuration or output failed
    PrintingError,

    /// Window machinery misuse
    ShellError,

    /// Module set is inconsistent (missing dependency)
    ModuleError,

    /// Internal error
    Internal,
}

impl AppError {
    /// Creates a new app error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        AppError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }
}

/// Result type for shell operations.
pub type AppResult<T> = Result<T, AppError>;

/// Converts database errors to app errors.
impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => AppError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => AppError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::Validation(e) => AppError::validation(e.to_string()),
            DbError::UnreadableSource(message) => AppError::validation(message),
            DbError::InvalidImageFormat(format) => AppError::validation(format!(
                "Invalid output image type: {}",
                format
            )),
            DbError::ConnectionFailed(_) => {
                AppError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                AppError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                AppError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::PoolExhausted => {
                AppError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Io(e) => {
                tracing::error!("Asset cache I/O failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Could not write file")
            }
            DbError::Serialization(e) => {
                tracing::error!("Config serialization failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts form errors to app errors.
impl From<FormError> for AppError {
    fn from(err: FormError) -> Self {
        match &err {
            FormError::Validation(_) => AppError::validation(err.user_message()),
            FormError::Persistence(cause) => {
                tracing::error!("Form persistence failed: {}", cause);
                AppError::new(ErrorCode::DatabaseError, err.user_message())
            }
            FormError::UnknownField(_)
            | FormError::InvalidFields(_)
            | FormError::InvalidState { .. } => AppError::internal(err.to_string()),
        }
    }
}

/// Converts printing errors to app errors.
impl From<PrintingError> for AppError {
    fn from(err: PrintingError) -> Self {
        match err {
            PrintingError::NotFound(name) => AppError::not_found("Printer", &name),
            PrintingError::InvalidName(e) => AppError::validation(e.to_string()),
            other => AppError::new(ErrorCode::PrintingError, other.to_string()),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

impl From<ShellError> for AppError {
    fn from(err: ShellError) -> Self {
        AppError::new(ErrorCode::ShellError, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_message_is_generic() {
        let err: AppError = FormError::persistence("UNIQUE constraint failed: x").into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("UNIQUE"));
    }

    #[test]
    fn test_validation_message_is_kept() {
        let err: AppError = FormError::Validation(ValidationError::Required {
            field: "name".to_string(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "name is required");
    }

    #[test]
    fn test_unreadable_source_is_user_facing() {
        let err: AppError = DbError::UnreadableSource("Invalid image file".into()).into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Invalid image file");
    }

    #[test]
    fn test_serialized_code() {
        let err: AppError = ShellError::UnknownTab(4).into();
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "SHELL_ERROR");
        assert_eq!(json["message"], "No tab at index 4");
    }
}
