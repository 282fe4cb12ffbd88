//! # Error Types
//!
//! Domain-specific error types for coinbox-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  coinbox-core errors (this file)                                       │
//! │  ├── PrintingError    - Printer registry / print dispatch failures     │
//! │  ├── FormError        - Form save/delete failures                      │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  coinbox-db errors (separate crate)                                    │
//! │  └── DbError          - Database / asset cache failures                │
//! │                                                                         │
//! │  Desktop shell errors (in app)                                         │
//! │  ├── ShellError       - Window chain / composition misuse              │
//! │  └── AppError         - What the user sees (code + message)            │
//! │                                                                         │
//! │  Flow: ValidationError → FormError → AppError → message box            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (printer name, function, field)
//! 3. User-correctable input errors are kept apart from persistence failures

use thiserror::Error;

// =============================================================================
// Printing Error
// =============================================================================

/// Errors raised by the printer registry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PrintingError {
    /// The user dismissed a printer dialog without choosing.
    ///
    /// ## When This Occurs
    /// - "Select Printer" dialog cancelled
    /// - Recoverable: the caller decides the fallback
    #[error("No printer was selected")]
    UserCancelled,

    /// A named printer profile does not exist.
    #[error("Printer not found: {0}")]
    NotFound(String),

    /// A print function was never registered.
    ///
    /// ## When This Occurs
    /// - `get_function_printer` for a function no module announced through
    ///   `printing-register-function`
    #[error("Printer function not configured: {0}")]
    NotConfigured(String),

    /// A stored printer record cannot be turned back into settings.
    #[error("Invalid printer record for {name}: {reason}")]
    InvalidRecord { name: String, reason: String },

    /// A printer or function name is not acceptable.
    #[error("Invalid name: {0}")]
    InvalidName(#[from] ValidationError),

    /// The output backend failed to produce the document.
    #[error("Print output failed: {0}")]
    Output(String),
}

impl PrintingError {
    /// Creates an InvalidRecord error.
    pub fn invalid_record(name: impl Into<String>, reason: impl Into<String>) -> Self {
        PrintingError::InvalidRecord {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether this is a configuration problem (as opposed to a user choice
    /// or an output failure).
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            PrintingError::NotFound(_)
                | PrintingError::NotConfigured(_)
                | PrintingError::InvalidRecord { .. }
        )
    }
}

// =============================================================================
// Form Error
// =============================================================================

/// Errors raised while saving or deleting through a form controller.
///
/// ## Why Two Kinds?
/// ```text
/// Validation   → "Name is required"          → shown as-is, form stays open
/// Persistence  → "UNIQUE constraint failed"  → logged, user sees a generic
///                                               "could not save" message
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormError {
    /// User-correctable input problem.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Lower-level storage failure (commit/rollback, config store).
    #[error("Persistence failed: {0}")]
    Persistence(String),

    /// A control was addressed by a name the controller does not declare.
    #[error("Unknown form field: {0}")]
    UnknownField(String),

    /// The controller's field declarations are unusable.
    #[error("Invalid field declarations: {0}")]
    InvalidFields(String),

    /// The requested transition is not allowed in the current form state.
    #[error("Cannot {action} while {state}")]
    InvalidState { action: String, state: String },
}

impl FormError {
    /// Creates a Persistence error.
    pub fn persistence(message: impl Into<String>) -> Self {
        FormError::Persistence(message.into())
    }

    /// Creates an InvalidState error.
    pub fn invalid_state(action: impl Into<String>, state: impl Into<String>) -> Self {
        FormError::InvalidState {
            action: action.into(),
            state: state.into(),
        }
    }

    /// The message to show in the form's message box.
    ///
    /// Persistence details never reach the user.
    pub fn user_message(&self) -> String {
        match self {
            FormError::Validation(e) => e.to_string(),
            FormError::Persistence(_) => "Could not save the changes".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<PrintingError> for FormError {
    fn from(err: PrintingError) -> Self {
        match err {
            PrintingError::InvalidName(e) => FormError::Validation(e),
            other => FormError::Persistence(other.to_string()),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before anything is persisted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., a dot in a printer name).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate printer name).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with PrintingError.
pub type PrintingResult<T> = Result<T, PrintingError>;

/// Convenience type alias for Results with FormError.
pub type FormResult<T> = Result<T, FormError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PrintingError::NotFound("kitchen".to_string());
        assert_eq!(err.to_string(), "Printer not found: kitchen");

        let err = PrintingError::NotConfigured("receipt".to_string());
        assert_eq!(err.to_string(), "Printer function not configured: receipt");
    }

    #[test]
    fn test_configuration_errors() {
        assert!(PrintingError::NotFound("x".into()).is_configuration_error());
        assert!(PrintingError::NotConfigured("x".into()).is_configuration_error());
        assert!(!PrintingError::UserCancelled.is_configuration_error());
    }

    #[test]
    fn test_persistence_message_is_generic() {
        let err = FormError::persistence("UNIQUE constraint failed: storedfiles.id");
        assert_eq!(err.user_message(), "Could not save the changes");

        let err: FormError = ValidationError::Required {
            field: "name".to_string(),
        }
        .into();
        assert_eq!(err.user_message(), "name is required");
    }

    #[test]
    fn test_printing_name_error_becomes_validation() {
        let err: FormError = PrintingError::InvalidName(ValidationError::Required {
            field: "name".to_string(),
        })
        .into();
        assert!(matches!(err, FormError::Validation(_)));

        let err: FormError = PrintingError::NotFound("x".into()).into();
        assert!(matches!(err, FormError::Persistence(_)));
    }
}
