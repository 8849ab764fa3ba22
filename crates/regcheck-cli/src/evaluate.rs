//! # `regcheck evaluate`
//!
//! ```bash
//! regcheck evaluate application.json
//! regcheck evaluate application.json --rules rulebook.yaml --jurisdiction uk --format text
//! regcheck evaluate application.json --documents parsed/ --config engine.yaml
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use regcheck_core::{ApplicationRecord, Jurisdiction};
use regcheck_engine::{ComplianceEngine, EngineConfig};
use regcheck_rules::parser;

use crate::output::{render_json, render_text, OutputFormat};
use crate::{load_registry, EXIT_OK, EXIT_VIOLATIONS};

/// Arguments of the `evaluate` subcommand.
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Application record (JSON).
    pub application: PathBuf,

    /// Rulebook file (YAML or JSON). Defaults to the built-in rulebook.
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Parsed regulation document (JSON) or directory of documents.
    /// Repeatable.
    #[arg(long = "documents")]
    pub documents: Vec<PathBuf>,

    /// Engine configuration file (YAML or JSON).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Evaluate only these jurisdictions, overriding the record. Repeatable.
    #[arg(long = "jurisdiction")]
    pub jurisdictions: Vec<Jurisdiction>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Timestamp recorded in JSON output (RFC 3339). Defaults to now.
    #[arg(long)]
    pub generated_at: Option<DateTime<Utc>>,
}

/// Execute the evaluate subcommand.
pub fn run_evaluate(args: &EvaluateArgs) -> Result<u8> {
    let registry = load_registry(args.rules.as_deref(), &args.documents)?;
    let config = load_config(args.config.as_deref())?;

    let mut record: ApplicationRecord = parser::load_json_typed(&args.application)
        .with_context(|| format!("failed to load application: {}", args.application.display()))?;
    if !args.jurisdictions.is_empty() {
        record.jurisdictions = args.jurisdictions.clone();
    }

    let engine = ComplianceEngine::new(Arc::new(registry), config);
    let report = engine.evaluate_report(&record);

    match args.format {
        OutputFormat::Json => {
            let generated_at = args.generated_at.unwrap_or_else(Utc::now);
            println!("{}", render_json(&report, generated_at)?);
        }
        OutputFormat::Text => print!("{}", render_text(&report)),
    }

    Ok(if report.summary.has_violations() {
        EXIT_VIOLATIONS
    } else {
        EXIT_OK
    })
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config = match path {
        Some(p) => EngineConfig::load(p)
            .with_context(|| format!("failed to load engine config: {}", p.display()))?
            .with_env_overrides(),
        None => EngineConfig::from_env(),
    };
    config.context("invalid REGCHECK_* environment override")
}
