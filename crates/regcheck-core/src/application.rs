//! # Application Record
//!
//! The read-only loan-application input to an evaluation run: structured
//! financial fields, loan terms, and free text.
//!
//! ## Units
//!
//! All monetary amounts are `i64` minor currency units (pence, cents).
//! The annual percentage rate is expressed in basis points (`1999` =
//! 19.99%). Floats are not accepted on input so that records canonicalize
//! deterministically.
//!
//! ## Missing data
//!
//! Every structured field is optional. [`ApplicationRecord::field_value`]
//! returns `None` whenever a field, or any input of a derived field, is
//! absent or the arithmetic would overflow. Callers degrade to an
//! indeterminate verdict instead of failing.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::jurisdiction::Jurisdiction;

/// Field name under which [`ApplicationRecord::notes`] is scanned.
pub const NOTES_FIELD: &str = "notes";

/// Applicant income and outgoings, per month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Financials {
    /// Net monthly income.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<i64>,
    /// Committed monthly expenditure (housing, living costs).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_expenditure: Option<i64>,
    /// Repayments already owed on other credit, per month.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_debt_repayments: Option<i64>,
}

/// Terms of the credit applied for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanTerms {
    /// Principal requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    /// Repayment term in months.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_months: Option<u32>,
    /// Annual percentage rate in basis points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apr_bps: Option<u32>,
}

/// A loan application as submitted for compliance screening.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationRecord {
    /// Caller-supplied reference, echoed in reports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    /// Regimes that apply to the applicant. Empty means every regime the
    /// rulebook declares.
    pub jurisdictions: Vec<Jurisdiction>,
    /// Income and outgoings.
    pub financials: Financials,
    /// Requested credit.
    pub loan: LoanTerms,
    /// Free-text case notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Other named free-text fields (e.g. `employment_status`).
    pub text_fields: BTreeMap<String, String>,
}

impl ApplicationRecord {
    /// All scannable text, as `(field, text)` pairs sorted by field name.
    ///
    /// `notes` is exposed under [`NOTES_FIELD`] and shadows a
    /// `text_fields` entry of the same name.
    pub fn text_sources(&self) -> Vec<(&str, &str)> {
        let mut sources: BTreeMap<&str, &str> = self
            .text_fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        if let Some(ref notes) = self.notes {
            sources.insert(NOTES_FIELD, notes.as_str());
        }
        sources.into_iter().collect()
    }

    /// Read a structured or derived numeric field.
    pub fn field_value(&self, field: FinancialField) -> Option<i64> {
        let f = &self.financials;
        let l = &self.loan;
        match field {
            FinancialField::MonthlyIncome => f.monthly_income,
            FinancialField::MonthlyExpenditure => f.monthly_expenditure,
            FinancialField::ExistingDebtRepayments => f.existing_debt_repayments,
            FinancialField::LoanAmount => l.amount,
            FinancialField::TermMonths => l.term_months.map(i64::from),
            FinancialField::AprBps => l.apr_bps.map(i64::from),
            FinancialField::DisposableIncome => {
                let existing = f.existing_debt_repayments.unwrap_or(0);
                f.monthly_income?
                    .checked_sub(f.monthly_expenditure?)?
                    .checked_sub(existing)
            }
            FinancialField::MonthlyRepayment => monthly_repayment(l),
            FinancialField::RepaymentToIncomeBps => {
                let income = f.monthly_income?;
                if income <= 0 {
                    return None;
                }
                let outgoing = i128::from(monthly_repayment(l)?)
                    + i128::from(f.existing_debt_repayments.unwrap_or(0));
                i64::try_from(outgoing * 10_000 / i128::from(income)).ok()
            }
        }
    }
}

/// Amortised monthly instalment, rounded to the nearest minor unit.
///
/// A zero or missing APR gives a straight-line repayment.
fn monthly_repayment(loan: &LoanTerms) -> Option<i64> {
    let amount = loan.amount?;
    let term = loan.term_months?;
    if amount < 0 || term == 0 {
        return None;
    }
    let apr_bps = loan.apr_bps.unwrap_or(0);
    if apr_bps == 0 {
        let term = i64::from(term);
        return amount.checked_add(term / 2).map(|a| a / term);
    }
    let rate = f64::from(apr_bps) / 10_000.0 / 12.0;
    let principal = amount as f64;
    let factor = (1.0 + rate).powi(i32::try_from(term).ok()?);
    let payment = principal * rate * factor / (factor - 1.0);
    if !payment.is_finite() || payment >= i64::MAX as f64 {
        return None;
    }
    Some(payment.round() as i64)
}

/// Numeric fields a rule condition may test.
///
/// The first six are read directly from the record; the last three are
/// derived (see [`ApplicationRecord::field_value`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialField {
    /// Net monthly income.
    MonthlyIncome,
    /// Committed monthly expenditure.
    MonthlyExpenditure,
    /// Existing credit repayments per month.
    ExistingDebtRepayments,
    /// Principal requested.
    LoanAmount,
    /// Repayment term in months.
    TermMonths,
    /// APR in basis points.
    AprBps,
    /// Income minus expenditure minus existing repayments.
    DisposableIncome,
    /// Amortised instalment of the requested loan.
    MonthlyRepayment,
    /// Total monthly repayments as basis points of income.
    RepaymentToIncomeBps,
}

impl FinancialField {
    /// Returns every field in declaration order.
    pub fn all() -> &'static [FinancialField] {
        &[
            Self::MonthlyIncome,
            Self::MonthlyExpenditure,
            Self::ExistingDebtRepayments,
            Self::LoanAmount,
            Self::TermMonths,
            Self::AprBps,
            Self::DisposableIncome,
            Self::MonthlyRepayment,
            Self::RepaymentToIncomeBps,
        ]
    }

    /// Returns the snake_case identifier used in rulebooks and evidence.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MonthlyIncome => "monthly_income",
            Self::MonthlyExpenditure => "monthly_expenditure",
            Self::ExistingDebtRepayments => "existing_debt_repayments",
            Self::LoanAmount => "loan_amount",
            Self::TermMonths => "term_months",
            Self::AprBps => "apr_bps",
            Self::DisposableIncome => "disposable_income",
            Self::MonthlyRepayment => "monthly_repayment",
            Self::RepaymentToIncomeBps => "repayment_to_income_bps",
        }
    }
}

impl std::fmt::Display for FinancialField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FinancialField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|f| f.as_str() == s.trim())
            .ok_or_else(|| ValidationError::UnknownFinancialField(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(income: Option<i64>, expenditure: Option<i64>) -> ApplicationRecord {
        ApplicationRecord {
            financials: Financials {
                monthly_income: income,
                monthly_expenditure: expenditure,
                existing_debt_repayments: None,
            },
            ..Default::default()
        }
    }

    #[test]
    fn direct_fields_pass_through() {
        let r = record(Some(250_000), Some(180_000));
        assert_eq!(r.field_value(FinancialField::MonthlyIncome), Some(250_000));
        assert_eq!(r.field_value(FinancialField::MonthlyExpenditure), Some(180_000));
        assert_eq!(r.field_value(FinancialField::LoanAmount), None);
    }

    #[test]
    fn disposable_income_requires_both_inputs() {
        assert_eq!(
            record(Some(250_000), Some(180_000)).field_value(FinancialField::DisposableIncome),
            Some(70_000)
        );
        assert_eq!(
            record(Some(250_000), None).field_value(FinancialField::DisposableIncome),
            None
        );
    }

    #[test]
    fn disposable_income_subtracts_existing_repayments() {
        let mut r = record(Some(250_000), Some(180_000));
        r.financials.existing_debt_repayments = Some(20_000);
        assert_eq!(r.field_value(FinancialField::DisposableIncome), Some(50_000));
    }

    #[test]
    fn disposable_income_overflow_is_none() {
        let r = record(Some(i64::MIN), Some(1));
        assert_eq!(r.field_value(FinancialField::DisposableIncome), None);
    }

    #[test]
    fn repayment_overflow_is_none() {
        let mut r = record(Some(250_000), Some(100_000));
        r.loan.amount = Some(i64::MAX);
        r.loan.term_months = Some(12);
        assert_eq!(r.field_value(FinancialField::MonthlyRepayment), None);
        assert_eq!(r.field_value(FinancialField::RepaymentToIncomeBps), None);

        r.loan.term_months = Some(1);
        r.loan.amount = Some(i64::MAX - 1);
        assert_eq!(r.field_value(FinancialField::MonthlyRepayment), Some(i64::MAX - 1));
    }

    #[test]
    fn straight_line_repayment_without_apr() {
        let r = ApplicationRecord {
            loan: LoanTerms {
                amount: Some(1_200_000),
                term_months: Some(12),
                apr_bps: None,
            },
            ..Default::default()
        };
        assert_eq!(r.field_value(FinancialField::MonthlyRepayment), Some(100_000));
    }

    #[test]
    fn amortised_repayment_with_apr() {
        // 10,000.00 over 12 months at 12% APR: 888.49 per month.
        let r = ApplicationRecord {
            loan: LoanTerms {
                amount: Some(1_000_000),
                term_months: Some(12),
                apr_bps: Some(1_200),
            },
            ..Default::default()
        };
        assert_eq!(r.field_value(FinancialField::MonthlyRepayment), Some(88_849));
    }

    #[test]
    fn zero_term_is_none() {
        let r = ApplicationRecord {
            loan: LoanTerms {
                amount: Some(1_000),
                term_months: Some(0),
                apr_bps: None,
            },
            ..Default::default()
        };
        assert_eq!(r.field_value(FinancialField::MonthlyRepayment), None);
    }

    #[test]
    fn repayment_to_income_in_basis_points() {
        let mut r = record(Some(200_000), Some(100_000));
        r.loan = LoanTerms {
            amount: Some(1_200_000),
            term_months: Some(12),
            apr_bps: Some(0),
        };
        r.financials.existing_debt_repayments = Some(20_000);
        // (100_000 + 20_000) / 200_000 = 60%.
        assert_eq!(r.field_value(FinancialField::RepaymentToIncomeBps), Some(6_000));
    }

    #[test]
    fn repayment_to_income_needs_positive_income() {
        let mut r = record(Some(0), None);
        r.loan.amount = Some(1_000);
        r.loan.term_months = Some(10);
        assert_eq!(r.field_value(FinancialField::RepaymentToIncomeBps), None);
    }

    #[test]
    fn text_sources_sorted_with_notes() {
        let mut r = ApplicationRecord {
            notes: Some("customer recently bereaved".into()),
            ..Default::default()
        };
        r.text_fields.insert("purpose".into(), "car".into());
        r.text_fields.insert("employment_status".into(), "redundant".into());
        let names: Vec<&str> = r.text_sources().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["employment_status", "notes", "purpose"]);
    }

    #[test]
    fn field_names_roundtrip() {
        for &f in FinancialField::all() {
            assert_eq!(f.as_str().parse::<FinancialField>().unwrap(), f);
        }
        assert!("salary".parse::<FinancialField>().is_err());
    }

    #[test]
    fn record_deserializes_with_defaults() {
        let r: ApplicationRecord = serde_json::from_str(
            r#"{"financials": {"monthly_income": 300000}, "jurisdictions": ["uk"]}"#,
        )
        .unwrap();
        assert_eq!(r.financials.monthly_income, Some(300_000));
        assert_eq!(r.jurisdictions, vec![Jurisdiction::Uk]);
        assert!(r.notes.is_none());
        assert!(r.text_fields.is_empty());
    }
}
