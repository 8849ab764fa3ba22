//! # Compliance Engine
//!
//! Ties the pipeline together for one application:
//!
//! ```text
//! ApplicationRecord ─► select rules (jurisdictions) ─► RuleEvaluator ─► FindingsAggregator ─► findings
//! ```
//!
//! The engine holds the registry behind an `Arc` and no mutable state, so
//! one instance can serve concurrent evaluations.

use std::collections::BTreeSet;
use std::sync::Arc;

use regcheck_core::{ApplicationRecord, Jurisdiction};
use regcheck_rules::RuleRegistry;
use serde::{Deserialize, Serialize};

use crate::aggregator::{summarize, FindingsAggregator, FindingsSummary};
use crate::config::EngineConfig;
use crate::evaluator::{Finding, RuleEvaluator};
use crate::evidence::EvidenceExtractor;

/// Findings for one application with the context needed to audit them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    pub rulebook: String,
    /// Digest of the registry snapshot, `sha256:<hex>`.
    pub registry_digest: String,
    /// Jurisdictions whose rules were evaluated, in canonical order.
    pub jurisdictions: Vec<Jurisdiction>,
    pub findings: Vec<Finding>,
    pub summary: FindingsSummary,
}

/// Evaluates applications against a rule registry.
#[derive(Debug, Clone)]
pub struct ComplianceEngine {
    registry: Arc<RuleRegistry>,
    config: EngineConfig,
    evaluator: RuleEvaluator,
    aggregator: FindingsAggregator,
}

impl ComplianceEngine {
    pub fn new(registry: Arc<RuleRegistry>, config: EngineConfig) -> Self {
        let config = config.normalized();
        Self {
            registry,
            evaluator: RuleEvaluator::new(EvidenceExtractor::new(config.match_mode)),
            aggregator: FindingsAggregator::new(config.dedup),
            config,
        }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Jurisdictions evaluated for `record`: the record's own, or every
    /// declared jurisdiction when it names none. Undeclared ones are
    /// skipped with a warning.
    pub fn applicable_jurisdictions(&self, record: &ApplicationRecord) -> Vec<Jurisdiction> {
        if record.jurisdictions.is_empty() {
            return self.registry.jurisdictions();
        }
        let requested: BTreeSet<Jurisdiction> = record.jurisdictions.iter().copied().collect();
        requested
            .into_iter()
            .filter(|&j| {
                let declared = self.registry.declares(j);
                if !declared {
                    tracing::warn!(
                        jurisdiction = %j,
                        rulebook = %self.registry.name(),
                        "skipping jurisdiction not declared by the rulebook"
                    );
                }
                declared
            })
            .collect()
    }

    /// Ordered, merged findings for one application.
    pub fn evaluate(&self, record: &ApplicationRecord) -> Vec<Finding> {
        let jurisdictions = self.applicable_jurisdictions(record);
        self.evaluate_for(record, &jurisdictions)
    }

    fn evaluate_for(&self, record: &ApplicationRecord, jurisdictions: &[Jurisdiction]) -> Vec<Finding> {
        let raw: Vec<Finding> = self
            .registry
            .rules()
            .iter()
            .filter(|rule| jurisdictions.contains(&rule.jurisdiction))
            .map(|rule| self.evaluator.evaluate_rule(record, rule))
            .collect();
        let evaluated = raw.len();
        let findings = self.aggregator.aggregate(raw, &self.registry);

        tracing::info!(
            application_id = record.application_id.as_deref().unwrap_or("-"),
            rules = evaluated,
            findings = findings.len(),
            "evaluated application"
        );
        findings
    }

    /// Findings plus summary, rulebook identity and digest.
    pub fn evaluate_report(&self, record: &ApplicationRecord) -> EvaluationReport {
        let jurisdictions = self.applicable_jurisdictions(record);
        let findings = self.evaluate_for(record, &jurisdictions);
        EvaluationReport {
            application_id: record.application_id.clone(),
            rulebook: self.registry.name().to_string(),
            registry_digest: self.registry.digest().to_string(),
            jurisdictions,
            summary: summarize(&findings),
            findings,
        }
    }
}
