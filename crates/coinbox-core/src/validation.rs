//! # Validation Module
//!
//! Input validation utilities for Coinbox.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form page                                                    │
//! │  ├── Field declarations checked when the page is built                 │
//! │  └── Controller validates collected data on Save                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Names, lengths, formats                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── PRIMARY KEY constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use coinbox_core::validation::{validate_printer_name, validate_function_name};
//!
//! assert!(validate_printer_name("Kitchen").is_ok());
//! assert!(validate_function_name("receipt").is_ok());
//! assert!(validate_printer_name("   ").is_err());
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted printer or function name.
pub const MAX_NAME_LEN: usize = 64;

/// Longest accepted stored file name (matches the `storedfiles` column).
pub const MAX_FILENAME_LEN: usize = 255;

/// Longest accepted stored file type, dot included (".jpeg").
pub const MAX_FILETYPE_LEN: usize = 5;

// =============================================================================
// Name Validators
// =============================================================================

fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    if name.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must not contain control characters".to_string(),
        });
    }

    Ok(name.to_string())
}

/// Validates a printer profile name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most 64 characters
/// - No control characters
///
/// ## Returns
/// The trimmed name.
pub fn validate_printer_name(name: &str) -> ValidationResult<String> {
    validate_name("name", name)
}

/// Validates a print function name ("receipt", "kitchen-ticket", ...).
///
/// Same rules as printer names, and no whitespace: function names are
/// identifiers chosen by modules, not by users.
pub fn validate_function_name(name: &str) -> ValidationResult<String> {
    let name = validate_name("function", name)?;

    if name.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "function".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(name)
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns all/default results)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Stored File Validators
// =============================================================================

/// Validates a stored file name (without extension).
pub fn validate_filename(filename: &str) -> ValidationResult<()> {
    if filename.chars().count() > MAX_FILENAME_LEN {
        return Err(ValidationError::TooLong {
            field: "filename".to_string(),
            max: MAX_FILENAME_LEN,
        });
    }

    Ok(())
}

/// Validates a stored file type.
///
/// ## Rules
/// - Empty is allowed (file without extension)
/// - Otherwise starts with a dot and is at most 5 characters (".jpeg")
pub fn validate_filetype(filetype: &str) -> ValidationResult<()> {
    if filetype.is_empty() {
        return Ok(());
    }

    if !filetype.starts_with('.') {
        return Err(ValidationError::InvalidFormat {
            field: "filetype".to_string(),
            reason: "must start with a dot".to_string(),
        });
    }

    if filetype.chars().count() > MAX_FILETYPE_LEN {
        return Err(ValidationError::TooLong {
            field: "filetype".to_string(),
            max: MAX_FILETYPE_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a printer copy count.
pub fn validate_copy_count(count: i32) -> ValidationResult<()> {
    if !(1..=999).contains(&count) {
        return Err(ValidationError::OutOfRange {
            field: "copy_count".to_string(),
            min: 1,
            max: 999,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
