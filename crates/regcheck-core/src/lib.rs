//! # regcheck-core — Foundational Types
//!
//! The leaf crate of the regcheck workspace. It defines the vocabulary
//! shared by the rule registry, the evaluation engine and the CLI:
//!
//! - [`Jurisdiction`]: the closed set of regulatory regimes (UK, EU, US).
//! - [`RuleId`]: validated rule identifier newtype.
//! - [`Severity`] and [`Verdict`]: rule classification and evaluation outcome.
//! - [`ApplicationRecord`]: the read-only loan-application input, with
//!   [`FinancialField`] naming every numeric field a rule may test.
//! - [`CanonicalBytes`] / [`ContentDigest`]: deterministic serialization
//!   and SHA-256 content addressing for registry snapshots.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `regcheck-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Monetary amounts are integer minor units; floats never enter a digest.

pub mod application;
pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod jurisdiction;
pub mod severity;
pub mod verdict;

// Re-export primary types for ergonomic imports.
pub use application::{ApplicationRecord, FinancialField, Financials, LoanTerms};
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, ContentDigest};
pub use error::{CanonicalizationError, ValidationError};
pub use identity::RuleId;
pub use jurisdiction::Jurisdiction;
pub use severity::Severity;
pub use verdict::Verdict;
