//! # regcheck-rules — Rule Registry
//!
//! Loads, validates and indexes the regulatory rules the engine evaluates.
//!
//! - [`rulebook`]: the on-disk rulebook document (YAML or JSON).
//! - [`rule`] / [`condition`]: validated, immutable rule definitions.
//! - [`library`]: parsed regulation documents whose clauses rules may cite.
//! - [`registry`]: the [`RuleRegistry`] built from a rulebook, with
//!   stable ordering, jurisdiction indexes and a content digest.
//! - [`standard`]: the built-in rulebook covering UK, EU and US consumer
//!   credit rules.
//!
//! Every malformed input is reported as a [`ConfigurationError`] at load
//! time. A registry that loads successfully never fails at evaluation time.

pub mod condition;
pub mod error;
pub mod library;
pub mod parser;
pub mod registry;
pub mod rule;
pub mod rulebook;
pub mod standard;

pub use condition::{Comparison, RuleCondition};
pub use error::{ConfigResult, ConfigurationError};
pub use library::{ClauseType, DocumentMetadata, RegulationClause, RegulationDocument, RegulationLibrary};
pub use registry::{RegistrySummary, RuleRegistry};
pub use rule::{normalize_term, ClauseRef, Rule};
pub use rulebook::{RuleDefinition, RulebookDocument};
