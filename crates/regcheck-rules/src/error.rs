//! Rule-loading error types.
//!
//! Every way a rulebook or regulation document can be malformed maps to a
//! [`ConfigurationError`] variant carrying enough context (file path, rule
//! id, offending value) to fix the input without a debugger.

use std::path::PathBuf;

use regcheck_core::{Jurisdiction, ValidationError};
use thiserror::Error;

/// Errors raised while loading rulebooks and regulation documents.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// YAML parsing failed.
    #[error("failed to parse YAML at {path}: {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// JSON parsing failed.
    #[error("failed to parse JSON at {path}: {source}")]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A required file was not found.
    #[error("required file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// File extension is neither YAML nor JSON.
    #[error("unsupported file format at {path} (expected .yaml, .yml or .json)")]
    UnsupportedFormat { path: PathBuf },

    /// The rulebook declares no jurisdictions.
    #[error("rulebook {name:?} declares no jurisdictions")]
    NoJurisdictions { name: String },

    /// A jurisdiction code is not one of the supported regimes.
    #[error("{context}: {source}")]
    UnknownJurisdiction {
        context: String,
        source: ValidationError,
    },

    /// A rule belongs to a jurisdiction its rulebook does not declare.
    #[error("rule {rule_id}: jurisdiction {jurisdiction} is not declared by the rulebook")]
    UndeclaredJurisdiction {
        rule_id: String,
        jurisdiction: Jurisdiction,
    },

    /// A rule identifier failed validation.
    #[error("rule #{index}: {source}")]
    InvalidRuleId {
        index: usize,
        source: ValidationError,
    },

    /// Two rules share the same identifier.
    #[error("duplicate rule ID: {rule_id}")]
    DuplicateRuleId { rule_id: String },

    /// A required rule attribute is missing or blank.
    #[error("rule {rule_id}: missing required field {field:?}")]
    MissingField {
        rule_id: String,
        field: &'static str,
    },

    /// Severity was neither given nor inferable from a clause identifier.
    #[error("rule {rule_id}: severity not given and cannot be inferred from clause {clause_id:?}")]
    MissingSeverity {
        rule_id: String,
        clause_id: Option<String>,
    },

    /// A term-based condition has no trigger terms.
    #[error("rule {rule_id}: condition {kind} requires at least one trigger term")]
    EmptyTriggerTerms {
        rule_id: String,
        kind: &'static str,
    },

    /// A trigger term is empty after normalization.
    #[error("rule {rule_id}: trigger term #{index} is blank")]
    BlankTriggerTerm { rule_id: String, index: usize },

    /// A rule cites a clause that is not in the regulation library.
    #[error("rule {rule_id}: clause {clause_id:?} not found in {document}")]
    UnknownClause {
        rule_id: String,
        document: String,
        clause_id: String,
    },

    /// A regulation document parsed but is not usable.
    #[error("invalid regulation document at {path}: {reason}")]
    InvalidDocument { path: PathBuf, reason: String },

    /// A configuration setting or environment override has an invalid value.
    #[error("invalid value {value:?} for {key} (expected {expected})")]
    InvalidSetting {
        key: String,
        value: String,
        expected: &'static str,
    },

    /// Canonicalization of the registry snapshot failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] regcheck_core::CanonicalizationError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for rule-loading operations.
pub type ConfigResult<T> = Result<T, ConfigurationError>;
