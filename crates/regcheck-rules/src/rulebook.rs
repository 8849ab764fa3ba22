//! # Rulebook Documents
//!
//! The unvalidated, on-disk shape of a rulebook. Jurisdictions and rule
//! identifiers are kept as raw strings here so that the registry can
//! report them with the rule they belong to.
//!
//! ```yaml
//! name: standard
//! version: "2024.1"
//! jurisdictions: [uk, eu, us]
//! rules:
//!   - id: uk-fg21-1-vulnerability
//!     jurisdiction: uk
//!     citation: FG21/1 Chapter 2
//!     description: Vulnerability drivers require adapted treatment.
//!     severity: guidance
//!     requires_human_review: true
//!     trigger_terms: [bereavement, terminal illness]
//!     condition: { kind: flag_on_terms }
//! ```

use std::path::Path;

use regcheck_core::Severity;
use serde::{Deserialize, Serialize};

use crate::condition::RuleCondition;
use crate::error::ConfigResult;
use crate::parser;

/// A rulebook as written by its authors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RulebookDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Jurisdiction codes this rulebook covers.
    #[serde(default)]
    pub jurisdictions: Vec<String>,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

/// One rule as written in a rulebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDefinition {
    pub id: String,
    pub jurisdiction: String,
    #[serde(default)]
    pub citation: String,
    /// Regulation document the clause lives in (e.g. `UK_FCA_CONC`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    /// Handbook clause identifier. A trailing ` R` or ` G` sets the
    /// severity when `severity` is omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clause_id: Option<String>,
    /// Falls back to the clause text when a regulation library is loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub requires_human_review: bool,
    #[serde(default)]
    pub trigger_terms: Vec<String>,
    pub condition: RuleCondition,
}

impl RulebookDocument {
    /// Load a rulebook from a `.yaml`, `.yml` or `.json` file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        parser::load_typed(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
name: minimal
jurisdictions: [uk]
rules:
  - id: uk-conc-7.3
    jurisdiction: uk
    citation: CONC 7.3
    clause_id: "7.3.4 R"
    description: Forbearance for customers in arrears.
    trigger_terms: [arrears]
    condition: { kind: flag_on_terms }
"#;

    #[test]
    fn parses_minimal_rulebook() {
        let doc: RulebookDocument = serde_yaml::from_str(MINIMAL).unwrap();
        assert_eq!(doc.name, "minimal");
        assert_eq!(doc.version, None);
        assert_eq!(doc.jurisdictions, vec!["uk"]);
        assert_eq!(doc.rules.len(), 1);
        let rule = &doc.rules[0];
        assert_eq!(rule.severity, None);
        assert!(!rule.requires_human_review);
        assert_eq!(rule.clause_id.as_deref(), Some("7.3.4 R"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let yaml = "name: x\njurisdictions: [uk]\nrulez: []\n";
        assert!(serde_yaml::from_str::<RulebookDocument>(yaml).is_err());
    }

    #[test]
    fn missing_condition_is_rejected() {
        let yaml = "name: x\njurisdictions: [uk]\nrules:\n  - id: a\n    jurisdiction: uk\n";
        assert!(serde_yaml::from_str::<RulebookDocument>(yaml).is_err());
    }

    #[test]
    fn load_from_json_file() {
        let doc: RulebookDocument = serde_yaml::from_str(MINIMAL).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
        assert_eq!(RulebookDocument::load(&path).unwrap(), doc);
    }
}
