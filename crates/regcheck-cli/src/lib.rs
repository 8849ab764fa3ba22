//! # regcheck-cli — Command-Line Interface
//!
//! ## Subcommands
//!
//! - `evaluate` — evaluate an application record and print its findings
//! - `rules list` — list the rules of a rulebook
//! - `rules validate` — validate a rulebook (optionally against parsed
//!   regulation documents) and print its digest
//!
//! ## Exit codes
//!
//! | Code | Meaning |
//! |---|---|
//! | 0 | success, no violations |
//! | 1 | evaluation found violations |
//! | 2 | operational error (bad input, invalid rulebook) |
//!
//! Argument parsing lives in `main.rs`; the handlers here only load
//! inputs, call the engine and render output.

pub mod evaluate;
pub mod output;
pub mod rules;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regcheck_rules::{standard, RegulationLibrary, RuleRegistry};

/// Exit code: success, no violations.
pub const EXIT_OK: u8 = 0;
/// Exit code: evaluation found violations.
pub const EXIT_VIOLATIONS: u8 = 1;
/// Exit code: operational error.
pub const EXIT_ERROR: u8 = 2;

/// Load the rule registry for a command.
///
/// Uses the built-in rulebook when `rules` is `None`. When `documents`
/// are given, they are loaded as a regulation library and every clause
/// the rulebook cites must resolve in it.
pub fn load_registry(rules: Option<&Path>, documents: &[PathBuf]) -> Result<RuleRegistry> {
    let library = if documents.is_empty() {
        None
    } else {
        let library = RegulationLibrary::load_paths(documents)
            .context("failed to load regulation documents")?;
        tracing::info!(documents = library.len(), "loaded regulation library");
        Some(library)
    };

    match (rules, library.as_ref()) {
        (Some(path), Some(library)) => RuleRegistry::load_path_with_library(path, library)
            .with_context(|| format!("failed to load rulebook: {}", path.display())),
        (Some(path), None) => RuleRegistry::load_path(path)
            .with_context(|| format!("failed to load rulebook: {}", path.display())),
        (None, library) => RuleRegistry::from_rulebook_with_library(standard::standard_rulebook(), library)
            .context("invalid built-in rulebook"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_is_standard() {
        let reg = load_registry(None, &[]).unwrap();
        assert_eq!(reg.name(), standard::STANDARD_RULEBOOK_NAME);
    }

    #[test]
    fn rulebook_file_errors_carry_path() {
        let err = load_registry(Some(Path::new("/nonexistent/rules.yaml")), &[]).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/rules.yaml"));
    }

    #[test]
    fn documents_must_resolve_cited_clauses() {
        let dir = tempfile::tempdir().unwrap();
        let doc = serde_json::json!({
            "document_type": "UK_FCA_CONC",
            "country": "UK",
            "clauses": [],
            "metadata": { "source_file": "conc.pdf", "total_pages": 1, "country": "UK" }
        });
        let path = dir.path().join("conc.json");
        std::fs::write(&path, doc.to_string()).unwrap();
        // The built-in rulebook cites CONC clauses the empty document lacks.
        let err = load_registry(None, &[path]).unwrap_err();
        assert!(format!("{err:#}").contains("not found"));
    }
}
