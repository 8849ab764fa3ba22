//! # Built-in Rulebook
//!
//! A starter rulebook covering consumer-credit obligations in the three
//! supported regimes. It is what `regcheck` evaluates when no rulebook
//! file is given.
//!
//! | Jurisdiction | Sources |
//! |---|---|
//! | UK | FCA CONC 2.10, 5.2A, 5.3, 7.3; FG21/1 |
//! | EU | EBA/GL/2020/06; GDPR Art. 22 |
//! | US | TILA / Reg Z §1026.18, §1026.51; ECOA / Reg B §1002.4; FCRA §615 |
//!
//! Affordability and vulnerability rules share wording across regimes
//! where the obligations coincide. The aggregator merges their findings
//! into one, with the other regimes' citations listed as related.

use regcheck_core::{FinancialField, Severity};

use crate::condition::{Comparison, RuleCondition};
use crate::rulebook::{RuleDefinition, RulebookDocument};

/// Name of the built-in rulebook.
pub const STANDARD_RULEBOOK_NAME: &str = "regcheck-standard";

/// Version of the built-in rulebook.
pub const STANDARD_RULEBOOK_VERSION: &str = "2024.1";

const VULNERABILITY_DESCRIPTION: &str =
    "Customer shows characteristics of vulnerability (health, life events, resilience or capability) and must receive appropriate care";

const VULNERABILITY_TERMS: &[&str] = &[
    "bereavement",
    "bereaved",
    "terminal illness",
    "serious illness",
    "mental health",
    "carer",
    "redundancy",
    "divorce",
    "domestic abuse",
    "addiction",
    "low literacy",
];

/// Build the built-in rulebook document.
pub fn standard_rulebook() -> RulebookDocument {
    let mut rules = uk_rules();
    rules.extend(eu_rules());
    rules.extend(us_rules());
    RulebookDocument {
        name: STANDARD_RULEBOOK_NAME.to_string(),
        version: Some(STANDARD_RULEBOOK_VERSION.to_string()),
        jurisdictions: vec!["uk".to_string(), "eu".to_string(), "us".to_string()],
        rules,
    }
}

struct Draft {
    id: &'static str,
    jurisdiction: &'static str,
    citation: &'static str,
    document_type: Option<&'static str>,
    clause_id: Option<&'static str>,
    description: &'static str,
    severity: Option<Severity>,
    requires_human_review: bool,
    trigger_terms: &'static [&'static str],
    condition: RuleCondition,
}

impl From<Draft> for RuleDefinition {
    fn from(d: Draft) -> Self {
        RuleDefinition {
            id: d.id.to_string(),
            jurisdiction: d.jurisdiction.to_string(),
            citation: d.citation.to_string(),
            document_type: d.document_type.map(str::to_string),
            clause_id: d.clause_id.map(str::to_string),
            description: Some(d.description.to_string()),
            severity: d.severity,
            requires_human_review: d.requires_human_review,
            trigger_terms: d.trigger_terms.iter().map(|t| t.to_string()).collect(),
            condition: d.condition,
        }
    }
}

fn expenditure_exceeds_income() -> RuleCondition {
    RuleCondition::FieldComparison {
        left: FinancialField::MonthlyExpenditure,
        op: Comparison::Gt,
        right: FinancialField::MonthlyIncome,
    }
}

fn uk_rules() -> Vec<RuleDefinition> {
    vec![
        Draft {
            id: "uk-conc-5.2a-creditworthiness",
            jurisdiction: "uk",
            citation: "CONC 5.2A.12 R",
            document_type: Some("UK_FCA_CONC"),
            clause_id: Some("5.2A.12 R"),
            description: "Creditworthiness assessment: total credit repayments must be sustainable relative to the customer's income",
            severity: None,
            requires_human_review: false,
            trigger_terms: &[],
            condition: RuleCondition::Threshold {
                field: FinancialField::RepaymentToIncomeBps,
                op: Comparison::Gt,
                limit: 4_000,
            },
        }
        .into(),
        Draft {
            id: "uk-conc-5.3-ability-to-repay",
            jurisdiction: "uk",
            citation: "CONC 5.3",
            document_type: Some("UK_FCA_CONC"),
            clause_id: None,
            description: "Ability to repay: committed expenditure must not exceed the customer's income",
            severity: Some(Severity::Mandatory),
            requires_human_review: false,
            trigger_terms: &[],
            condition: expenditure_exceeds_income(),
        }
        .into(),
        Draft {
            id: "uk-fg21-1-vulnerability",
            jurisdiction: "uk",
            citation: "FG21/1 Chapter 2",
            document_type: Some("UK_FCA_FG21"),
            clause_id: None,
            description: VULNERABILITY_DESCRIPTION,
            severity: Some(Severity::Guidance),
            requires_human_review: true,
            trigger_terms: VULNERABILITY_TERMS,
            condition: RuleCondition::FlagOnTerms,
        }
        .into(),
        Draft {
            id: "uk-conc-2.10-mental-capacity",
            jurisdiction: "uk",
            citation: "CONC 2.10",
            document_type: Some("UK_FCA_CONC"),
            clause_id: Some("2.10.2 G"),
            description: "Customer may lack mental capacity to make the credit decision; the firm must consider whether to proceed",
            severity: None,
            requires_human_review: true,
            trigger_terms: &[
                "mental capacity",
                "lacks capacity",
                "dementia",
                "power of attorney",
                "cognitive impairment",
            ],
            condition: RuleCondition::FlagOnTerms,
        }
        .into(),
        Draft {
            id: "uk-conc-7.3-forbearance",
            jurisdiction: "uk",
            citation: "CONC 7.3.4 R",
            document_type: Some("UK_FCA_CONC"),
            clause_id: Some("7.3.4 R"),
            description: "Customers in arrears or default must be treated with forbearance and due consideration",
            severity: None,
            requires_human_review: false,
            trigger_terms: &[
                "arrears",
                "missed payment",
                "missed payments",
                "default notice",
                "debt collection",
                "payment difficulties",
            ],
            condition: RuleCondition::FlagOnTerms,
        }
        .into(),
    ]
}

fn eu_rules() -> Vec<RuleDefinition> {
    vec![
        Draft {
            id: "eu-eba-gl-2020-06-8.1-ability-to-repay",
            jurisdiction: "eu",
            citation: "EBA/GL/2020/06 Section 8.1",
            document_type: Some("EU_EBA_GL_2020_06"),
            clause_id: None,
            description: "Ability to repay: committed expenditure must not exceed the consumer's income",
            severity: Some(Severity::Mandatory),
            requires_human_review: false,
            trigger_terms: &[],
            condition: expenditure_exceeds_income(),
        }
        .into(),
        Draft {
            id: "eu-eba-gl-2020-06-5.2-vulnerability",
            jurisdiction: "eu",
            citation: "EBA/GL/2020/06 Section 5.2",
            document_type: Some("EU_EBA_GL_2020_06"),
            clause_id: None,
            description: VULNERABILITY_DESCRIPTION,
            severity: Some(Severity::Guidance),
            requires_human_review: true,
            trigger_terms: VULNERABILITY_TERMS,
            condition: RuleCondition::FlagOnTerms,
        }
        .into(),
        Draft {
            id: "eu-gdpr-art22-automated-decision",
            jurisdiction: "eu",
            citation: "GDPR Art. 22",
            document_type: None,
            clause_id: None,
            description: "Decisions based solely on automated processing give the data subject a right to human intervention",
            severity: Some(Severity::Mandatory),
            requires_human_review: true,
            trigger_terms: &[
                "automated decision",
                "automatically declined",
                "auto-declined",
                "credit scoring model",
            ],
            condition: RuleCondition::FlagOnTerms,
        }
        .into(),
    ]
}

fn us_rules() -> Vec<RuleDefinition> {
    vec![
        Draft {
            id: "us-tila-1026.51-ability-to-pay",
            jurisdiction: "us",
            citation: "TILA / Reg Z §1026.51",
            document_type: None,
            clause_id: None,
            description: "Creditor must consider the consumer's ability to make the required payments from income given current obligations",
            severity: Some(Severity::Mandatory),
            requires_human_review: false,
            trigger_terms: &[],
            condition: expenditure_exceeds_income(),
        }
        .into(),
        Draft {
            id: "us-tila-1026.18-disclosure",
            jurisdiction: "us",
            citation: "TILA / Reg Z §1026.18",
            document_type: None,
            clause_id: None,
            description: "Closed-end credit disclosures must state the annual percentage rate and finance charge",
            severity: Some(Severity::Mandatory),
            requires_human_review: false,
            trigger_terms: &["annual percentage rate", "finance charge", "total of payments"],
            condition: RuleCondition::RequireTerms,
        }
        .into(),
        Draft {
            id: "us-ecoa-1002.4-prohibited-basis",
            jurisdiction: "us",
            citation: "ECOA / Reg B §1002.4",
            document_type: None,
            clause_id: None,
            description: "Credit decisions must not consider a prohibited basis such as race, religion, national origin, sex, marital status or receipt of public assistance",
            severity: Some(Severity::Mandatory),
            requires_human_review: true,
            trigger_terms: &[
                "race",
                "religion",
                "national origin",
                "marital status",
                "pregnant",
                "public assistance",
            ],
            condition: RuleCondition::FlagOnTerms,
        }
        .into(),
        Draft {
            id: "us-fcra-615-adverse-action",
            jurisdiction: "us",
            citation: "FCRA §615(a)",
            document_type: None,
            clause_id: None,
            description: "Adverse action based on a consumer report requires an adverse action notice",
            severity: Some(Severity::Mandatory),
            requires_human_review: false,
            trigger_terms: &["adverse action", "consumer report", "credit report"],
            condition: RuleCondition::FlagOnTerms,
        }
        .into(),
    ]
}
