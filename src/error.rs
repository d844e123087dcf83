//! Error types for Shelf
//!
//! This module defines error types using thiserror for ergonomic error handling.
//! Errors are categorized by domain (rule trees, storage, configuration) so the
//! catalog service can decide what to surface to the user.
//!
//! ## What can fail
//!
//! The rule compiler itself degrades instead of failing: unknown fields,
//! unknown operators, unparseable literals and empty groups all compile to a
//! defined vacuous predicate. The only rule-level failures are structural and
//! are reported before compilation starts:
//! - Malformed JSON or an unknown node type → `InvalidRuleTree`
//! - A group join that is neither AND nor OR → `InvalidJoin`
//! - A rule without a field identifier → `MissingRuleField`
//!
//! Everything else here belongs to the persistence collaborator (SQLite via
//! sqlx) or to configuration loading.

use thiserror::Error;

/// Result type alias using our ShelfError type
pub type Result<T> = std::result::Result<T, ShelfError>;

/// Main error type for Shelf
#[derive(Error, Debug)]
pub enum ShelfError {
    // ===== Rule Tree Errors =====

    /// Rule tree could not be parsed (bad JSON, unknown node type, wrong value types)
    #[error("Invalid rule tree: {0}")]
    InvalidRuleTree(String),

    /// Group join type is neither AND nor OR
    #[error("Invalid group join '{join}': expected AND or OR")]
    InvalidJoin {
        join: String,
    },

    /// Rule without a field identifier
    #[error("Rule at {path} is missing a field identifier")]
    MissingRuleField {
        /// Position of the rule in the tree, e.g. `rules[1].rules[0]`
        path: String,
    },

    // ===== Storage Errors =====

    /// Database schema migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database record not found
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    // ===== Configuration/State Errors =====

    /// Generic input validation error
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// File I/O error with context
    #[error("File I/O error: {0}")]
    FileIoError(String),

    // ===== External Library Errors =====

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// Database driver error from sqlx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ShelfError {
    /// Create a RecordNotFound error with a resource name
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        ShelfError::RecordNotFound(resource.into())
    }

    /// Create an InvalidInput error with a message
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        ShelfError::InvalidInput(message.into())
    }

    /// Create an InvalidRuleTree error with a message
    pub fn invalid_rule_tree<S: Into<String>>(message: S) -> Self {
        ShelfError::InvalidRuleTree(message.into())
    }

    /// Check if the error is a structural problem with a rule tree
    ///
    /// These are configuration errors of the shelf itself; retrying will not help,
    /// the rule tree has to be fixed by whoever authored it.
    pub fn is_rule_error(&self) -> bool {
        matches!(
            self,
            ShelfError::InvalidRuleTree(_)
                | ShelfError::InvalidJoin { .. }
                | ShelfError::MissingRuleField { .. }
        )
    }

    /// Check if error originates in the persistence layer
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            ShelfError::MigrationFailed(_)
                | ShelfError::RecordNotFound(_)
                | ShelfError::SqlxError(_)
        )
    }

    /// Get user-friendly error message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            ShelfError::InvalidJoin { join } => {
                format!("A rule group uses '{}' to combine its rules. Only AND and OR are supported.", join)
            }
            ShelfError::MissingRuleField { path } => {
                format!("The rule at {} does not say which field to filter on. Pick a field and save the shelf again.", path)
            }
            ShelfError::InvalidRuleTree(message) => {
                format!("This shelf's rules could not be read: {}", message)
            }
            ShelfError::MigrationFailed(_) => {
                "The library database could not be upgraded. Please restore a backup or contact support.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_error_categories() {
        assert!(ShelfError::InvalidJoin { join: "XOR".to_string() }.is_rule_error());
        assert!(ShelfError::MissingRuleField { path: "rules[0]".to_string() }.is_rule_error());
        assert!(!ShelfError::not_found("book 1").is_rule_error());
        assert!(ShelfError::not_found("book 1").is_storage_error());
    }

    #[test]
    fn test_user_message_mentions_join() {
        let err = ShelfError::InvalidJoin { join: "XOR".to_string() };
        assert!(err.user_message().contains("XOR"));
        assert!(err.to_string().contains("expected AND or OR"));
    }
}
