//! # regcheck-engine — Compliance Evaluation
//!
//! Evaluates a loan application against a [`RuleRegistry`](regcheck_rules::RuleRegistry):
//!
//! - [`evidence`]: finds trigger terms in application text.
//! - [`evaluator`]: applies each rule's condition, producing a [`Finding`].
//! - [`aggregator`]: orders findings and merges cross-jurisdiction
//!   near-duplicates.
//! - [`engine`]: the [`ComplianceEngine`] façade and [`EvaluationReport`].
//! - [`config`]: [`EngineConfig`] with file and environment loading.
//!
//! Evaluation is a pure function of the application and the registry
//! snapshot: no I/O, no shared mutable state, and no failure mode. Missing
//! data degrades to an indeterminate verdict.

pub mod aggregator;
pub mod config;
pub mod engine;
pub mod evaluator;
pub mod evidence;

pub use aggregator::{similarity, summarize, FindingsAggregator, FindingsSummary};
pub use config::{DedupConfig, EngineConfig, MatchMode};
pub use engine::{ComplianceEngine, EvaluationReport};
pub use evaluator::{Finding, RelatedCitation, RuleEvaluator};
pub use evidence::{Evidence, EvidenceExtractor, EvidenceSource, TermMatch};
