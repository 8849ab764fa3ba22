//! # Rule Identifier
//!
//! [`RuleId`] is a validated newtype: rulebooks cannot introduce ids that
//! would be ambiguous in findings output or on the command line.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// -- Validating Deserialize for RuleId -----------------------------------------

impl<'de> Deserialize<'de> for RuleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Identifier of a rule in the registry, e.g. `uk-conc-5.3-affordability`.
///
/// # Validation
///
/// Non-empty after trimming; ASCII alphanumerics plus `-`, `_`, `.`, `/`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RuleId(String);

impl RuleId {
    /// Create a rule identifier, validating its format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRuleId`] if the trimmed value is
    /// empty or contains a character outside the permitted set.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        let valid = !trimmed.is_empty()
            && trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'));
        if !valid {
            return Err(ValidationError::InvalidRuleId(raw));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
