//! # Rule Conditions
//!
//! A condition is the deterministic predicate a rule applies to an
//! application. There are two families:
//!
//! - **Term conditions** read free text. `flag_on_terms` treats a trigger
//!   term as a risk marker (present → violated). `require_terms` treats
//!   it as a required disclosure (present → satisfied).
//! - **Numeric conditions** read structured fields. They describe the
//!   breach: when the comparison holds the rule is violated, otherwise it
//!   is satisfied.
//!
//! In YAML a condition is tagged by `kind`:
//!
//! ```yaml
//! condition:
//!   kind: field_comparison
//!   left: monthly_expenditure
//!   op: gt
//!   right: monthly_income
//! ```

use std::str::FromStr;

use regcheck_core::{FinancialField, ValidationError};
use serde::{Deserialize, Serialize};

/// Integer comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Ne,
}

impl Comparison {
    /// Apply the operator to `left <op> right`.
    pub fn holds(self, left: i64, right: i64) -> bool {
        match self {
            Self::Gt => left > right,
            Self::Gte => left >= right,
            Self::Lt => left < right,
            Self::Lte => left <= right,
            Self::Eq => left == right,
            Self::Ne => left != right,
        }
    }

    /// Mathematical symbol, for rendering explanations.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }
}

impl FromStr for Comparison {
    type Err = ValidationError;

    /// Accepts the rulebook names (`gt`, `gte`, ...) and the symbols.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gt" | ">" => Ok(Self::Gt),
            "gte" | ">=" => Ok(Self::Gte),
            "lt" | "<" => Ok(Self::Lt),
            "lte" | "<=" => Ok(Self::Lte),
            "eq" | "==" => Ok(Self::Eq),
            "ne" | "!=" => Ok(Self::Ne),
            _ => Err(ValidationError::UnknownComparison(s.to_string())),
        }
    }
}

/// The predicate a rule evaluates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleCondition {
    /// Trigger terms are risk markers.
    FlagOnTerms,
    /// Trigger terms are required disclosures.
    RequireTerms,
    /// Violated when `left <op> right` holds.
    FieldComparison {
        left: FinancialField,
        op: Comparison,
        right: FinancialField,
    },
    /// Violated when `field <op> limit` holds.
    Threshold {
        field: FinancialField,
        op: Comparison,
        limit: i64,
    },
}

impl RuleCondition {
    /// The `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FlagOnTerms => "flag_on_terms",
            Self::RequireTerms => "require_terms",
            Self::FieldComparison { .. } => "field_comparison",
            Self::Threshold { .. } => "threshold",
        }
    }

    /// Whether the condition is decided by trigger terms.
    pub fn is_term_based(&self) -> bool {
        matches!(self, Self::FlagOnTerms | Self::RequireTerms)
    }

    /// Structured fields the condition reads, in order.
    pub fn fields(&self) -> Vec<FinancialField> {
        match self {
            Self::FlagOnTerms | Self::RequireTerms => Vec::new(),
            Self::FieldComparison { left, right, .. } => vec![*left, *right],
            Self::Threshold { field, .. } => vec![*field],
        }
    }

    /// One-line rendering such as `monthly_expenditure > monthly_income`.
    pub fn describe(&self) -> String {
        match self {
            Self::FlagOnTerms => "any trigger term present".to_string(),
            Self::RequireTerms => "trigger terms required".to_string(),
            Self::FieldComparison { left, op, right } => {
                format!("{left} {} {right}", op.symbol())
            }
            Self::Threshold { field, op, limit } => format!("{field} {} {limit}", op.symbol()),
        }
    }
}
