//! # Jurisdiction
//!
//! The closed set of regulatory regimes a rule can belong to. Every
//! `match` on [`Jurisdiction`] is exhaustive, so adding a regime forces
//! every consumer (ordering, display names, rulebooks) to handle it.
//!
//! ## Ordering
//!
//! [`Jurisdiction::all()`] returns the canonical order UK, EU, US. The
//! derived `Ord` follows declaration order and is the secondary sort key
//! of the findings aggregator.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A regulatory regime whose rules apply to a given applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Jurisdiction {
    /// United Kingdom (FCA CONC, FG21/1, PRA).
    #[serde(alias = "UK")]
    Uk,
    /// European Union (EBA guidelines, GDPR).
    #[serde(alias = "EU")]
    Eu,
    /// United States (TILA, ECOA, FCRA).
    #[serde(alias = "US")]
    Us,
}

impl Jurisdiction {
    /// Returns every jurisdiction in canonical order.
    pub fn all() -> &'static [Jurisdiction] {
        &[Self::Uk, Self::Eu, Self::Us]
    }

    /// Returns the lowercase code used in rulebooks and serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uk => "uk",
            Self::Eu => "eu",
            Self::Us => "us",
        }
    }

    /// Human-readable regime name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Uk => "United Kingdom",
            Self::Eu => "European Union",
            Self::Us => "United States",
        }
    }
}

impl std::fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Jurisdiction {
    type Err = ValidationError;

    /// Parse a jurisdiction code. Case-insensitive, surrounding whitespace
    /// is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uk" => Ok(Self::Uk),
            "eu" => Ok(Self::Eu),
            "us" => Ok(Self::Us),
            _ => Err(ValidationError::UnknownJurisdiction(s.to_string())),
        }
    }
}
