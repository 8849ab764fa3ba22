//! # Error Types
//!
//! Validation errors raised when parsing the primitive types of this
//! crate, and canonicalization errors raised when producing digest bytes.
//! Both carry the offending input so that a misconfigured rulebook can be
//! diagnosed from the message alone.

use thiserror::Error;

/// Validation errors for domain primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Rule identifier is empty or contains forbidden characters.
    #[error("invalid rule ID: \"{0}\" (expected non-empty ASCII alphanumerics, '-', '_', '.', '/')")]
    InvalidRuleId(String),

    /// Jurisdiction code is not one of the supported regimes.
    #[error("unknown jurisdiction: \"{0}\" (expected one of uk, eu, us)")]
    UnknownJurisdiction(String),

    /// Severity string is not recognized.
    #[error("unknown severity: \"{0}\" (expected mandatory or guidance)")]
    UnknownSeverity(String),

    /// Financial field name is not recognized.
    #[error("unknown financial field: \"{0}\"")]
    UnknownFinancialField(String),

    /// Comparison operator is not recognized.
    #[error("unknown comparison operator: \"{0}\" (expected gt, gte, lt, lte, eq or ne)")]
    UnknownComparison(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations; use integer minor units: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
