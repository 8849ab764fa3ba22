//! # Rule Evaluation
//!
//! Applies one rule's condition to one application and produces a
//! [`Finding`]. Evaluation never fails: missing data yields
//! [`Verdict::Indeterminate`] with a `missing_field:<name>` reason.
//!
//! ## Reason codes
//!
//! | Condition | Outcome | Verdict | Reason |
//! |---|---|---|---|
//! | `flag_on_terms` | term found | Violated | `terms_matched` |
//! | `flag_on_terms` | none found | Indeterminate | `no_matching_terms` |
//! | `require_terms` | term found | Satisfied | `required_terms_present` |
//! | `require_terms` | none found | Indeterminate | `no_matching_terms` |
//! | numeric | comparison holds | Violated | `condition_met` |
//! | numeric | comparison fails | Satisfied | `condition_not_met` |
//! | numeric | field absent | Indeterminate | `missing_field:<name>` |

use regcheck_core::{ApplicationRecord, FinancialField, Jurisdiction, RuleId, Severity, Verdict};
use regcheck_rules::{Comparison, Rule, RuleCondition};
use serde::{Deserialize, Serialize};

use crate::evidence::{Evidence, EvidenceExtractor};

pub const REASON_TERMS_MATCHED: &str = "terms_matched";
pub const REASON_NO_MATCHING_TERMS: &str = "no_matching_terms";
pub const REASON_REQUIRED_TERMS_PRESENT: &str = "required_terms_present";
pub const REASON_CONDITION_MET: &str = "condition_met";
pub const REASON_CONDITION_NOT_MET: &str = "condition_not_met";

/// A rule merged into another finding by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedCitation {
    pub rule_id: RuleId,
    pub citation: String,
    pub jurisdiction: Jurisdiction,
    pub verdict: Verdict,
}

/// The outcome of evaluating one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: RuleId,
    pub citation: String,
    pub jurisdiction: Jurisdiction,
    pub severity: Severity,
    pub verdict: Verdict,
    pub reason: String,
    /// Empty only when the verdict is indeterminate.
    pub evidence: Vec<Evidence>,
    pub requires_human_review: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<RelatedCitation>,
}

impl Finding {
    fn new(rule: &Rule, verdict: Verdict, reason: impl Into<String>, evidence: Vec<Evidence>) -> Self {
        Self {
            rule_id: rule.id.clone(),
            citation: rule.citation.clone(),
            jurisdiction: rule.jurisdiction,
            severity: rule.severity,
            verdict,
            reason: reason.into(),
            evidence,
            requires_human_review: rule.requires_human_review,
            related: Vec::new(),
        }
    }

    /// This finding as a related citation of another.
    pub fn as_related(&self) -> RelatedCitation {
        RelatedCitation {
            rule_id: self.rule_id.clone(),
            citation: self.citation.clone(),
            jurisdiction: self.jurisdiction,
            verdict: self.verdict,
        }
    }
}

/// Evaluates rules against an application.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEvaluator {
    extractor: EvidenceExtractor,
}

impl RuleEvaluator {
    pub fn new(extractor: EvidenceExtractor) -> Self {
        Self { extractor }
    }

    /// Evaluate a single rule.
    pub fn evaluate_rule(&self, record: &ApplicationRecord, rule: &Rule) -> Finding {
        let term_evidence = self.extractor.extract_for_rule(record, rule);

        let finding = match &rule.condition {
            RuleCondition::FlagOnTerms => {
                if term_evidence.is_empty() {
                    Finding::new(rule, Verdict::Indeterminate, REASON_NO_MATCHING_TERMS, Vec::new())
                } else {
                    Finding::new(rule, Verdict::Violated, REASON_TERMS_MATCHED, term_evidence)
                }
            }
            RuleCondition::RequireTerms => {
                if term_evidence.is_empty() {
                    Finding::new(rule, Verdict::Indeterminate, REASON_NO_MATCHING_TERMS, Vec::new())
                } else {
                    Finding::new(
                        rule,
                        Verdict::Satisfied,
                        REASON_REQUIRED_TERMS_PRESENT,
                        term_evidence,
                    )
                }
            }
            RuleCondition::FieldComparison { left, op, right } => {
                let operands = read_field(record, *left).and_then(|l| {
                    read_field(record, *right).map(|r| (l, r))
                });
                match operands {
                    Ok(((lf, lv), (rf, rv))) => {
                        let mut evidence = vec![self.extractor.field_evidence(rule, lf, lv)];
                        if rf != lf {
                            evidence.push(self.extractor.field_evidence(rule, rf, rv));
                        }
                        self.numeric(rule, *op, lv, rv, evidence, term_evidence)
                    }
                    Err(missing) => missing_field(rule, missing),
                }
            }
            RuleCondition::Threshold { field, op, limit } => match read_field(record, *field) {
                Ok((f, value)) => {
                    let evidence = vec![self.extractor.field_evidence(rule, f, value)];
                    self.numeric(rule, *op, value, *limit, evidence, term_evidence)
                }
                Err(missing) => missing_field(rule, missing),
            },
        };

        tracing::debug!(
            rule_id = %rule.id,
            jurisdiction = %rule.jurisdiction,
            verdict = %finding.verdict,
            reason = %finding.reason,
            evidence = finding.evidence.len(),
            "evaluated rule"
        );
        finding
    }

    fn numeric(
        &self,
        rule: &Rule,
        op: Comparison,
        left: i64,
        right: i64,
        mut evidence: Vec<Evidence>,
        term_evidence: Vec<Evidence>,
    ) -> Finding {
        evidence.extend(term_evidence);
        if op.holds(left, right) {
            Finding::new(rule, Verdict::Violated, REASON_CONDITION_MET, evidence)
        } else {
            Finding::new(rule, Verdict::Satisfied, REASON_CONDITION_NOT_MET, evidence)
        }
    }
}

fn read_field(
    record: &ApplicationRecord,
    field: FinancialField,
) -> Result<(FinancialField, i64), FinancialField> {
    record.field_value(field).map(|v| (field, v)).ok_or(field)
}

fn missing_field(rule: &Rule, field: FinancialField) -> Finding {
    Finding::new(
        rule,
        Verdict::Indeterminate,
        format!("missing_field:{field}"),
        Vec::new(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::EvidenceSource;
    use regcheck_core::Financials;
    use regcheck_rules::RuleRegistry;

    const RULES: &str = r#"
name: evaluator-test
jurisdictions: [uk, us]
rules:
  - id: flag
    jurisdiction: uk
    citation: FG21/1 Chapter 2
    description: Vulnerability.
    severity: guidance
    requires_human_review: true
    trigger_terms: [bereavement, terminal illness]
    condition: { kind: flag_on_terms }
  - id: require
    jurisdiction: us
    citation: TILA §1026.18
    description: Disclosure.
    severity: mandatory
    trigger_terms: [annual percentage rate]
    condition: { kind: require_terms }
  - id: compare
    jurisdiction: uk
    citation: CONC 5.3
    description: Affordability.
    severity: mandatory
    condition: { kind: field_comparison, left: monthly_expenditure, op: gt, right: monthly_income }
  - id: threshold
    jurisdiction: uk
    citation: CONC 5.2A
    description: Repayment burden.
    severity: mandatory
    condition: { kind: threshold, field: repayment_to_income_bps, op: gt, limit: 4000 }
"#;

    fn registry() -> RuleRegistry {
        RuleRegistry::from_yaml_str(RULES).unwrap()
    }

    fn eval(record: &ApplicationRecord, id: &str) -> Finding {
        let reg = registry();
        let rule = reg.get(&RuleId::new(id).unwrap()).unwrap();
        RuleEvaluator::default().evaluate_rule(record, rule)
    }

    fn with_finances(income: i64, expenditure: i64) -> ApplicationRecord {
        ApplicationRecord {
            financials: Financials {
                monthly_income: Some(income),
                monthly_expenditure: Some(expenditure),
                existing_debt_repayments: None,
            },
            ..Default::default()
        }
    }

    #[test]
    fn flag_on_terms_violates_with_evidence() {
        let record = ApplicationRecord {
            notes: Some("Customer mentioned a bereavement".to_string()),
            ..Default::default()
        };
        let f = eval(&record, "flag");
        assert_eq!(f.verdict, Verdict::Violated);
        assert_eq!(f.reason, REASON_TERMS_MATCHED);
        assert_eq!(f.evidence.len(), 1);
        assert_eq!(f.evidence[0].term, "bereavement");
        assert!(f.requires_human_review);
    }

    #[test]
    fn term_conditions_without_evidence_are_indeterminate() {
        let record = ApplicationRecord::default();
        for id in ["flag", "require"] {
            let f = eval(&record, id);
            assert_eq!(f.verdict, Verdict::Indeterminate);
            assert_eq!(f.reason, REASON_NO_MATCHING_TERMS);
            assert!(f.evidence.is_empty());
        }
    }

    #[test]
    fn require_terms_satisfied_when_present() {
        let record = ApplicationRecord {
            notes: Some("Annual Percentage Rate disclosed at 19.9%".to_string()),
            ..Default::default()
        };
        let f = eval(&record, "require");
        assert_eq!(f.verdict, Verdict::Satisfied);
        assert_eq!(f.reason, REASON_REQUIRED_TERMS_PRESENT);
    }

    #[test]
    fn comparison_violated_when_expenditure_exceeds_income() {
        let f = eval(&with_finances(200_000, 250_000), "compare");
        assert_eq!(f.verdict, Verdict::Violated);
        assert_eq!(f.reason, REASON_CONDITION_MET);
        assert_eq!(f.evidence.len(), 2);
        assert_eq!(
            f.evidence[0].source,
            EvidenceSource::Field {
                field: FinancialField::MonthlyExpenditure,
                value: 250_000
            }
        );
    }

    #[test]
    fn comparison_satisfied_otherwise() {
        let f = eval(&with_finances(250_000, 250_000), "compare");
        assert_eq!(f.verdict, Verdict::Satisfied);
        assert_eq!(f.reason, REASON_CONDITION_NOT_MET);
        assert!(!f.evidence.is_empty());
    }

    #[test]
    fn missing_field_is_indeterminate() {
        let mut record = with_finances(250_000, 100_000);
        record.financials.monthly_income = None;
        let f = eval(&record, "compare");
        assert_eq!(f.verdict, Verdict::Indeterminate);
        assert_eq!(f.reason, "missing_field:monthly_income");
        assert!(f.evidence.is_empty());

        let f = eval(&record, "threshold");
        assert_eq!(f.reason, "missing_field:repayment_to_income_bps");
    }

    #[test]
    fn threshold_on_derived_field() {
        let mut record = with_finances(200_000, 50_000);
        record.loan.amount = Some(1_000_000);
        record.loan.term_months = Some(10);
        // 100_000 / 200_000 = 5000 bps > 4000
        let f = eval(&record, "threshold");
        assert_eq!(f.verdict, Verdict::Violated);
        assert_eq!(
            f.evidence[0].source,
            EvidenceSource::Field {
                field: FinancialField::RepaymentToIncomeBps,
                value: 5_000
            }
        );
    }
}
