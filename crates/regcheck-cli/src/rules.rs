//! # `regcheck rules`
//!
//! ```bash
//! # List the built-in rules for one jurisdiction:
//! regcheck rules list --jurisdiction uk
//!
//! # Validate a rulebook against parsed regulation documents:
//! regcheck rules validate --rules rulebook.yaml --documents parsed/
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use regcheck_core::Jurisdiction;
use regcheck_rules::RuleRegistry;

use crate::{load_registry, EXIT_OK};

/// Rules subcommand arguments.
#[derive(Args, Debug)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub command: RulesCommand,
}

/// Available rules subcommands.
#[derive(Subcommand, Debug)]
pub enum RulesCommand {
    /// List the rules of a rulebook in evaluation order.
    List {
        /// Rulebook file (YAML or JSON). Defaults to the built-in rulebook.
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Only list rules for this jurisdiction.
        #[arg(long)]
        jurisdiction: Option<Jurisdiction>,
    },

    /// Load and validate a rulebook, then print its summary and digest.
    Validate {
        /// Rulebook file (YAML or JSON). Defaults to the built-in rulebook.
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Parsed regulation document (JSON) or directory of documents.
        /// Cited clauses must resolve in them. Repeatable.
        #[arg(long = "documents")]
        documents: Vec<PathBuf>,
    },
}

/// Execute the rules subcommand.
pub fn run_rules(args: &RulesArgs) -> Result<u8> {
    match &args.command {
        RulesCommand::List {
            rules,
            jurisdiction,
        } => {
            let registry = load_registry(rules.as_deref(), &[])?;
            print!("{}", render_list(&registry, *jurisdiction));
            Ok(EXIT_OK)
        }
        RulesCommand::Validate { rules, documents } => {
            let registry = load_registry(rules.as_deref(), documents)?;
            print!("{}", render_summary(&registry));
            Ok(EXIT_OK)
        }
    }
}

fn render_list(registry: &RuleRegistry, jurisdiction: Option<Jurisdiction>) -> String {
    let rules: Vec<_> = match jurisdiction {
        Some(j) => registry.by_jurisdiction(j),
        None => registry.rules().iter().collect(),
    };
    let mut out = String::new();
    for rule in &rules {
        out.push_str(&format!(
            "  {:<4} {:<9} {:<16} {:<40} {}\n",
            rule.jurisdiction.as_str(),
            rule.severity.as_str(),
            rule.condition.kind(),
            rule.id.as_str(),
            rule.citation
        ));
    }
    out.push_str(&format!("\nTotal: {} rules\n", rules.len()));
    out
}

fn render_summary(registry: &RuleRegistry) -> String {
    let s = registry.summary();
    let mut out = String::new();
    out.push_str(&format!("  rulebook:     {}\n", s.name));
    if let Some(v) = &s.version {
        out.push_str(&format!("  version:      {v}\n"));
    }
    out.push_str(&format!("  rules:        {}\n", s.rule_count));
    for (j, count) in &s.by_jurisdiction {
        out.push_str(&format!("    {:<10} {count}\n", j.as_str()));
    }
    out.push_str(&format!("  mandatory:    {}\n", s.mandatory));
    out.push_str(&format!("  guidance:     {}\n", s.guidance));
    out.push_str(&format!("  human review: {}\n", s.human_review));
    out.push_str(&format!("  digest:       {}\n", s.digest));
    out
}
