//! Common error infrastructure for appraiser-core.
//!
//! This module provides the shared severity classification and the trait
//! implemented by every error type in the crate. Domain-specific errors
//! (e.g., [`TableError`](crate::env::TableError),
//! [`ArtifactError`](crate::artifact::ArtifactError)) live next to the code
//! that raises them.
//!
//! # Design Principles
//!
//! - **Type Safety**: Each concern has its own error enum with specific variants
//! - **Severity Classification**: Errors are categorized so callers can tell a
//!   broken data table apart from a malformed input record
//! - **No Sentinels**: Failures propagate as `Err`, never as a zero score

/// Severity level of an error, used for categorization and handling strategies.
///
/// - **Recoverable**: The same request may succeed later (e.g., a busy worker)
/// - **Validation**: Invalid input that should be rejected without retry
/// - **Internal**: Unexpected inconsistency that indicates a bug
/// - **Fatal**: Broken configuration; the calling operation must abort
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry with same or alternative request.
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: main stat not legal for the slot, duplicate sub-stat keys
    Validation,

    /// Internal error - unexpected state inconsistency.
    Internal,

    /// Fatal error - configuration is corrupted, cannot continue.
    ///
    /// Examples: missing odds-table entry, weighted draw that never reaches
    /// the drawn value
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates a bug or a broken data table.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all appraiser-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait AppraisalError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Useful for error categorization, metrics, and testing.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_and_internal_are_internal() {
        assert!(ErrorSeverity::Fatal.is_internal());
        assert!(ErrorSeverity::Internal.is_internal());
        assert!(!ErrorSeverity::Validation.is_internal());
        assert!(ErrorSeverity::Recoverable.is_recoverable());
        assert_eq!(ErrorSeverity::Fatal.as_str(), "fatal");
    }
}
