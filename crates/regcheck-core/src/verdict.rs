//! # Verdict
//!
//! The outcome of evaluating one rule against one application.
//!
//! Verdicts form a small lattice used when near-duplicate findings from
//! different jurisdictions are merged:
//!
//! ```text
//! Ordering (worst → best): Violated < Indeterminate < Satisfied
//!
//! worst(a, b) = min(a, b)  — pessimistic merge
//! best(a, b)  = max(a, b)
//! ```
//!
//! `Violated` is absorbing under `worst`: merging a violation with
//! anything stays a violation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Evaluation outcome for one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The application meets the rule, with supporting evidence.
    Satisfied,
    /// The application breaches the rule or trips a risk marker.
    Violated,
    /// Not enough data to decide. A valid outcome, not an error.
    Indeterminate,
}

impl Verdict {
    /// Lattice ordering value. Lower is riskier.
    fn ordering(self) -> u8 {
        match self {
            Self::Violated => 0,
            Self::Indeterminate => 1,
            Self::Satisfied => 2,
        }
    }

    /// Pessimistic merge: the riskier of the two verdicts.
    pub fn worst(self, other: Self) -> Self {
        if self.ordering() <= other.ordering() {
            self
        } else {
            other
        }
    }

    /// Optimistic merge: the less risky of the two verdicts.
    pub fn best(self, other: Self) -> Self {
        if self.ordering() >= other.ordering() {
            self
        } else {
            other
        }
    }

    /// Returns the snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Satisfied => "satisfied",
            Self::Violated => "violated",
            Self::Indeterminate => "indeterminate",
        }
    }

    /// Whether the verdict is decisive (backed by evidence).
    pub fn is_decisive(self) -> bool {
        !matches!(self, Self::Indeterminate)
    }
}

impl PartialOrd for Verdict {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Verdict {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ordering().cmp(&other.ordering())
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
