//! # Findings Aggregation
//!
//! Orders findings and merges near-duplicates across jurisdictions.
//!
//! ## Ordering
//!
//! Severity descending, then jurisdiction in canonical order (UK, EU, US),
//! then registry position. The key is total over findings of one
//! registry, so the output order is fully determined by the input set.
//!
//! ## Merging
//!
//! Two findings are near-duplicates when their rules share a condition
//! kind and their descriptions score at least the configured similarity
//! (see [`similarity`]). By default only findings from different
//! jurisdictions are merged. The survivor of a group is the riskiest
//! verdict, ties broken by the ordering above; the others are listed in
//! its `related` citations.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};

use regcheck_core::{Jurisdiction, Severity, Verdict};
use regcheck_rules::{Rule, RuleRegistry};
use serde::{Deserialize, Serialize};

use crate::config::DedupConfig;
use crate::evaluator::Finding;

/// Verdict and review counts over a list of findings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingsSummary {
    pub total: usize,
    pub violated: usize,
    pub indeterminate: usize,
    pub satisfied: usize,
    /// Violations of mandatory rules.
    pub mandatory_violations: usize,
    pub requires_human_review: usize,
    /// Findings folded into another as related citations.
    pub merged: usize,
}

impl FindingsSummary {
    pub fn has_violations(&self) -> bool {
        self.violated > 0
    }
}

/// Sorts and deduplicates findings against a registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct FindingsAggregator {
    dedup: DedupConfig,
}

impl FindingsAggregator {
    pub fn new(dedup: DedupConfig) -> Self {
        Self { dedup }
    }

    /// Order and merge findings.
    ///
    /// Findings whose rule is not in `registry` are dropped with a warning.
    pub fn aggregate(&self, findings: Vec<Finding>, registry: &RuleRegistry) -> Vec<Finding> {
        let mut entries: Vec<(usize, Finding)> = Vec::with_capacity(findings.len());
        for finding in findings {
            match registry.position(&finding.rule_id) {
                Some(position) => entries.push((position, finding)),
                None => tracing::warn!(
                    rule_id = %finding.rule_id,
                    "dropping finding for rule not in registry"
                ),
            }
        }
        entries.sort_by_key(|(position, f)| sort_key(f, *position));

        if !self.dedup.enabled {
            return entries.into_iter().map(|(_, f)| f).collect();
        }

        let groups = self.group(entries, registry);
        let mut merged: Vec<(usize, Finding)> = groups.into_iter().map(merge_group).collect();
        merged.sort_by_key(|(position, f)| sort_key(f, *position));
        merged.into_iter().map(|(_, f)| f).collect()
    }

    /// Greedy clustering in sorted order: each finding joins the first
    /// group whose leading rule it duplicates.
    fn group(
        &self,
        entries: Vec<(usize, Finding)>,
        registry: &RuleRegistry,
    ) -> Vec<Vec<(usize, Finding)>> {
        let rules = registry.rules();
        let mut groups: Vec<Vec<(usize, Finding)>> = Vec::new();
        for (position, finding) in entries {
            let rule = &rules[position];
            let slot = groups.iter().position(|group| {
                let (lead_pos, _) = &group[0];
                self.is_duplicate(&rules[*lead_pos], rule)
                    && (!self.dedup.across_jurisdictions_only
                        || group.iter().all(|(_, f)| f.jurisdiction != finding.jurisdiction))
            });
            match slot {
                Some(i) => groups[i].push((position, finding)),
                None => groups.push(vec![(position, finding)]),
            }
        }
        groups
    }

    fn is_duplicate(&self, a: &Rule, b: &Rule) -> bool {
        a.condition.kind() == b.condition.kind()
            && similarity(&a.description, &b.description) >= self.dedup.similarity_threshold
    }
}

fn sort_key(finding: &Finding, position: usize) -> (Reverse<Severity>, Jurisdiction, usize) {
    (Reverse(finding.severity), finding.jurisdiction, position)
}

fn merge_group(mut group: Vec<(usize, Finding)>) -> (usize, Finding) {
    let survivor_idx = group
        .iter()
        .enumerate()
        .min_by_key(|(_, (position, f))| (f.verdict, sort_key(f, *position)))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let (position, mut survivor) = group.swap_remove(survivor_idx);
    group.sort_by_key(|(p, _)| *p);

    let mut seen: HashSet<_> = survivor.related.iter().map(|r| r.rule_id.clone()).collect();
    for (_, other) in group {
        survivor.requires_human_review |= other.requires_human_review;
        for related in std::iter::once(other.as_related()).chain(other.related) {
            if related.rule_id != survivor.rule_id && seen.insert(related.rule_id.clone()) {
                survivor.related.push(related);
            }
        }
    }
    if !survivor.related.is_empty() {
        tracing::debug!(
            rule_id = %survivor.rule_id,
            related = survivor.related.len(),
            "merged near-duplicate findings"
        );
    }
    (position, survivor)
}

/// Count verdicts and review flags.
pub fn summarize(findings: &[Finding]) -> FindingsSummary {
    let mut summary = FindingsSummary {
        total: findings.len(),
        ..Default::default()
    };
    for f in findings {
        match f.verdict {
            Verdict::Violated => {
                summary.violated += 1;
                if f.severity == Severity::Mandatory {
                    summary.mandatory_violations += 1;
                }
            }
            Verdict::Indeterminate => summary.indeterminate += 1,
            Verdict::Satisfied => summary.satisfied += 1,
        }
        if f.requires_human_review {
            summary.requires_human_review += 1;
        }
        summary.merged += f.related.len();
    }
    summary
}

/// Findings per verdict, for reporting.
pub fn by_verdict(findings: &[Finding]) -> BTreeMap<Verdict, Vec<&Finding>> {
    let mut out: BTreeMap<Verdict, Vec<&Finding>> = BTreeMap::new();
    for f in findings {
        out.entry(f.verdict).or_default().push(f);
    }
    out
}

/// Normalize a description for comparison: lowercase, punctuation to
/// spaces, whitespace collapsed.
fn normalize(s: &str) -> String {
    let cleaned: String = s
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Description similarity in `[0.0, 1.0]`.
///
/// Exact match after normalization scores 1.0; containment of one in the
/// other (at least 3 characters) scores 0.9; otherwise the Jaccard index
/// of the word sets.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    let (shorter, longer) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    if shorter.len() >= 3 && longer.contains(shorter.as_str()) {
        return 0.9;
    }
    let a_tokens: HashSet<&str> = a.split_whitespace().collect();
    let b_tokens: HashSet<&str> = b.split_whitespace().collect();
    let overlap = a_tokens.intersection(&b_tokens).count();
    let total = a_tokens.union(&b_tokens).count();
    if total > 0 {
        overlap as f64 / total as f64
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::RuleEvaluator;
    use regcheck_core::{ApplicationRecord, Financials, RuleId};

    const RULES: &str = r#"
name: aggregator-test
jurisdictions: [uk, eu, us]
rules:
  - id: us-afford
    jurisdiction: us
    citation: TILA §1026.51
    description: Ability to repay - committed expenditure must not exceed the borrower's income
    severity: mandatory
    condition: { kind: field_comparison, left: monthly_expenditure, op: gt, right: monthly_income }
  - id: uk-vuln
    jurisdiction: uk
    citation: FG21/1 Chapter 2
    description: Customer shows signs of vulnerability
    severity: guidance
    requires_human_review: true
    trigger_terms: [bereavement]
    condition: { kind: flag_on_terms }
  - id: uk-afford
    jurisdiction: uk
    citation: CONC 5.3
    description: Ability to repay - committed expenditure must not exceed the customer's income
    severity: mandatory
    condition: { kind: field_comparison, left: monthly_expenditure, op: gt, right: monthly_income }
  - id: eu-afford
    jurisdiction: eu
    citation: EBA/GL/2020/06 8.1
    description: Ability to repay - committed expenditure must not exceed the consumer's income
    severity: mandatory
    requires_human_review: true
    condition: { kind: field_comparison, left: monthly_expenditure, op: gt, right: monthly_income }
  - id: uk-afford-2
    jurisdiction: uk
    citation: CONC 5.3.1
    description: Ability to repay - committed expenditure must not exceed the customer's income
    severity: mandatory
    condition: { kind: field_comparison, left: monthly_expenditure, op: gt, right: monthly_income }
"#;

    fn registry() -> RuleRegistry {
        RuleRegistry::from_yaml_str(RULES).unwrap()
    }

    fn findings(reg: &RuleRegistry) -> Vec<Finding> {
        let record = ApplicationRecord {
            financials: Financials {
                monthly_income: Some(100_000),
                monthly_expenditure: Some(150_000),
                existing_debt_repayments: None,
            },
            notes: Some("recent bereavement".to_string()),
            ..Default::default()
        };
        let evaluator = RuleEvaluator::default();
        reg.rules().iter().map(|r| evaluator.evaluate_rule(&record, r)).collect()
    }

    fn ids(findings: &[Finding]) -> Vec<&str> {
        findings.iter().map(|f| f.rule_id.as_str()).collect()
    }

    #[test]
    fn similarity_scores() {
        assert_eq!(similarity("Ability to repay", "ability  to REPAY."), 1.0);
        assert_eq!(similarity("ability to repay", "ability to repay checks"), 0.9);
        assert_eq!(similarity("", "anything"), 0.0);
        let s = similarity("a b c d", "a b c e");
        assert!((s - 0.6).abs() < 1e-9);
    }

    #[test]
    fn orders_by_severity_jurisdiction_position_without_dedup() {
        let reg = registry();
        let agg = FindingsAggregator::new(DedupConfig {
            enabled: false,
            ..Default::default()
        });
        let out = agg.aggregate(findings(&reg), &reg);
        assert_eq!(ids(&out), vec!["uk-afford", "uk-afford-2", "eu-afford", "us-afford", "uk-vuln"]);
    }

    #[test]
    fn merges_across_jurisdictions_only() {
        let reg = registry();
        let out = FindingsAggregator::default().aggregate(findings(&reg), &reg);
        // uk-afford absorbs eu-afford and us-afford; uk-afford-2 shares its
        // jurisdiction and stays separate.
        assert_eq!(ids(&out), vec!["uk-afford", "uk-afford-2", "uk-vuln"]);
        let lead = &out[0];
        assert_eq!(lead.verdict, Verdict::Violated);
        let related: Vec<&str> = lead.related.iter().map(|r| r.rule_id.as_str()).collect();
        assert_eq!(related, vec!["us-afford", "eu-afford"]);
        assert!(lead.related.iter().all(|r| r.verdict == Verdict::Violated));
        assert_eq!(lead.related[1].jurisdiction, Jurisdiction::Eu);
        // OR-ed from eu-afford.
        assert!(lead.requires_human_review);
    }

    #[test]
    fn merges_within_jurisdiction_when_configured() {
        let reg = registry();
        let agg = FindingsAggregator::new(DedupConfig {
            across_jurisdictions_only: false,
            ..Default::default()
        });
        let out = agg.aggregate(findings(&reg), &reg);
        assert_eq!(ids(&out), vec!["uk-afford", "uk-vuln"]);
        assert_eq!(out[0].related.len(), 3);
    }

    #[test]
    fn survivor_is_riskiest_verdict() {
        let reg = registry();
        let mut input = findings(&reg);
        for f in &mut input {
            if f.rule_id.as_str() == "uk-afford" {
                f.verdict = Verdict::Satisfied;
            }
        }
        let out = FindingsAggregator::default().aggregate(input, &reg);
        // eu-afford is the first violated member in jurisdiction order.
        assert!(out.iter().all(|f| f.rule_id.as_str() != "uk-afford"));
        let lead = out.iter().find(|f| f.rule_id.as_str() == "eu-afford").unwrap();
        assert_eq!(lead.verdict, Verdict::Violated);
        assert!(lead
            .related
            .iter()
            .any(|r| r.rule_id.as_str() == "uk-afford" && r.verdict == Verdict::Satisfied));
    }

    #[test]
    fn unknown_rules_are_dropped() {
        let reg = registry();
        let mut input = findings(&reg);
        let mut stray = input[0].clone();
        stray.rule_id = RuleId::new("not-in-registry").unwrap();
        input.push(stray);
        let out = FindingsAggregator::default().aggregate(input, &reg);
        assert!(out.iter().all(|f| reg.contains(&f.rule_id)));
    }

    #[test]
    fn aggregation_is_order_independent() {
        let reg = registry();
        let forward = FindingsAggregator::default().aggregate(findings(&reg), &reg);
        let mut reversed_input = findings(&reg);
        reversed_input.reverse();
        let reversed = FindingsAggregator::default().aggregate(reversed_input, &reg);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn summary_counts() {
        let reg = registry();
        let out = FindingsAggregator::default().aggregate(findings(&reg), &reg);
        let summary = summarize(&out);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.violated, 3);
        assert_eq!(summary.mandatory_violations, 2);
        assert_eq!(summary.requires_human_review, 2);
        assert_eq!(summary.merged, 2);
        assert!(summary.has_violations());
        assert_eq!(by_verdict(&out)[&Verdict::Violated].len(), 3);
    }
}
