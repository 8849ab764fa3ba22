//! Report rendering for the `evaluate` command.

use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use clap::ValueEnum;
use regcheck_engine::{EvaluationReport, EvidenceSource, Finding};
use serde::Serialize;

/// Output format of the `evaluate` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON report.
    #[default]
    Json,
    /// Human-readable summary.
    Text,
}

/// A report stamped with its generation time.
#[derive(Debug, Serialize)]
pub struct StampedReport<'a> {
    pub generated_at: String,
    #[serde(flatten)]
    pub report: &'a EvaluationReport,
}

impl<'a> StampedReport<'a> {
    pub fn new(report: &'a EvaluationReport, generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            report,
        }
    }
}

/// Render a report as pretty JSON.
pub fn render_json(report: &EvaluationReport, generated_at: DateTime<Utc>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&StampedReport::new(report, generated_at))
}

/// Render a report for a terminal.
pub fn render_text(report: &EvaluationReport) -> String {
    let mut out = String::new();
    let jurisdictions: Vec<&str> = report.jurisdictions.iter().map(|j| j.as_str()).collect();
    let _ = writeln!(
        out,
        "Application:   {}",
        report.application_id.as_deref().unwrap_or("(unnamed)")
    );
    let _ = writeln!(out, "Rulebook:      {} ({})", report.rulebook, report.registry_digest);
    let _ = writeln!(out, "Jurisdictions: {}", jurisdictions.join(", "));
    let _ = writeln!(out);

    for finding in &report.findings {
        write_finding(&mut out, finding);
    }

    let s = &report.summary;
    let _ = writeln!(
        out,
        "Summary: {} violated ({} mandatory), {} satisfied, {} indeterminate; {} need human review, {} merged",
        s.violated, s.mandatory_violations, s.satisfied, s.indeterminate, s.requires_human_review, s.merged
    );
    out
}

fn write_finding(out: &mut String, f: &Finding) {
    let _ = writeln!(
        out,
        "{:<13} {:<9} {}  {}  [{}] {}",
        f.verdict.as_str().to_uppercase(),
        f.severity.as_str(),
        f.jurisdiction,
        f.citation,
        f.reason,
        f.rule_id
    );
    for ev in &f.evidence {
        match &ev.source {
            EvidenceSource::Text {
                field,
                start,
                end,
                matched,
            } => {
                let _ = writeln!(out, "    evidence: {field}[{start}..{end}] {matched:?}");
            }
            EvidenceSource::Field { field, value } => {
                let _ = writeln!(out, "    evidence: {field} = {value}");
            }
        }
    }
    for r in &f.related {
        let _ = writeln!(
            out,
            "    related:  {}  {} ({}, {})",
            r.jurisdiction, r.citation, r.rule_id, r.verdict
        );
    }
    if f.requires_human_review {
        let _ = writeln!(out, "    human review required");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use regcheck_core::{ApplicationRecord, Jurisdiction};
    use regcheck_engine::{ComplianceEngine, EngineConfig};
    use regcheck_rules::RuleRegistry;
    use std::sync::Arc;

    fn report() -> EvaluationReport {
        let engine = ComplianceEngine::new(
            Arc::new(RuleRegistry::standard().unwrap()),
            EngineConfig::default(),
        );
        let record = ApplicationRecord {
            application_id: Some("APP-7".to_string()),
            jurisdictions: vec![Jurisdiction::Uk],
            notes: Some("Applicant reports a recent bereavement.".to_string()),
            ..Default::default()
        };
        engine.evaluate_report(&record)
    }

    #[test]
    fn text_lists_findings_and_evidence() {
        let text = render_text(&report());
        assert!(text.contains("Application:   APP-7"));
        assert!(text.contains("VIOLATED"));
        assert!(text.contains("FG21/1 Chapter 2"));
        assert!(text.contains("\"bereavement\""));
        assert!(text.contains("human review required"));
        assert!(text.contains("Summary: 1 violated"));
    }

    #[test]
    fn json_is_stamped_and_flattened() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let json: serde_json::Value = serde_json::from_str(&render_json(&report(), at).unwrap()).unwrap();
        assert_eq!(json["generated_at"], "2024-05-01T12:00:00Z");
        assert_eq!(json["application_id"], "APP-7");
        assert!(json["registry_digest"].as_str().unwrap().starts_with("sha256:"));
        assert!(json["findings"].is_array());
    }
}
