//! # Rule
//!
//! A validated, immutable rule. Rules are only constructed by the
//! [`RuleRegistry`](crate::registry::RuleRegistry) from a rulebook, which
//! guarantees every invariant below:
//!
//! - `id` is unique within the registry.
//! - `citation` and `description` are non-blank.
//! - `trigger_terms` are normalized (see [`normalize_term`]) and non-empty
//!   for term-based conditions.

use std::collections::BTreeSet;

use regcheck_core::{Jurisdiction, RuleId, Severity};
use serde::{Deserialize, Serialize};

use crate::condition::RuleCondition;

/// Pointer to the regulation clause a rule was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClauseRef {
    /// Document type, e.g. `UK_FCA_CONC`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    /// Clause identifier, e.g. `5.2A.4 R`.
    pub clause_id: String,
}

/// A single regulatory requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub jurisdiction: Jurisdiction,
    /// Regulatory citation shown to reviewers, e.g. `CONC 5.2A`.
    pub citation: String,
    pub description: String,
    /// Normalized trigger terms.
    pub trigger_terms: BTreeSet<String>,
    pub severity: Severity,
    /// Findings on this rule must be routed to a human reviewer.
    pub requires_human_review: bool,
    pub condition: RuleCondition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ClauseRef>,
}

/// Normalize a trigger term: trim, lowercase each character, collapse
/// internal whitespace runs (Unicode whitespace included) to a single space.
///
/// Returns an empty string for blank input.
pub fn normalize_term(term: &str) -> String {
    term.split_whitespace()
        .map(|w| w.chars().flat_map(char::to_lowercase).collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}
