//! # Severity
//!
//! Regulation texts distinguish binding rules from guidance. The FCA
//! handbook marks each provision with a suffix letter: `5.2A.1 R` is a
//! rule, `5.2A.4 G` is guidance. [`Severity::from_clause_id`] reads that
//! marker so rulebooks can omit an explicit severity for handbook clauses.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// How binding a rule is. `Mandatory` sorts above `Guidance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Guidance: expected practice, breach is a supervisory concern.
    Guidance,
    /// Mandatory: a binding rule or statutory requirement.
    Mandatory,
}

impl Severity {
    /// Returns the snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guidance => "guidance",
            Self::Mandatory => "mandatory",
        }
    }

    /// Infer severity from a handbook clause identifier.
    ///
    /// `"… R"` → `Mandatory`, `"… G"` → `Guidance`; anything else yields
    /// `None`.
    pub fn from_clause_id(clause_id: &str) -> Option<Self> {
        let trimmed = clause_id.trim_end();
        if trimmed.ends_with(" R") {
            Some(Self::Mandatory)
        } else if trimmed.ends_with(" G") {
            Some(Self::Guidance)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mandatory" => Ok(Self::Mandatory),
            "guidance" => Ok(Self::Guidance),
            _ => Err(ValidationError::UnknownSeverity(s.to_string())),
        }
    }
}
