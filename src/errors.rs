//! Unified error types and result handling for the ledger engine.
//!
//! Validation and not-found errors stop the single operation they occur in;
//! bulk-import row errors are collected into the import report instead and
//! never surface through this type (see `core::import`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or missing required input. Names the offending field.
    #[error("validation failed on `{field}`: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Uniqueness violation within a tenant that the lookup-before-create
    /// logic did not resolve (e.g. a duplicate tax id on a direct create).
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// The referenced record does not exist within the caller's tenant.
    ///
    /// Cross-tenant access intentionally produces this same error, so a
    /// caller can never distinguish "absent" from "owned by another tenant".
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("configuration error: {message}")]
    Config { message: String },
}

impl Error {
    /// Shorthand for a validation error on a named field.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub const fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
