//! # Evidence Extraction
//!
//! Scans the free text of an application for trigger terms and records
//! every match as a byte span into the original text.
//!
//! ## Matching
//!
//! - Case-insensitive per character (`char::to_lowercase`), so `"décès"`
//!   matches `"DÉCÈS"`. The text is walked by `char_indices`, so spans
//!   always fall on UTF-8 character boundaries of the original.
//! - A multi-word term matches across any run of Unicode whitespace
//!   (`"terminal illness"` matches `"Terminal\n  illness"`).
//! - In [`MatchMode::Keyword`] the characters either side of a match must
//!   not be alphanumeric; in [`MatchMode::Substring`] any occurrence counts.
//!
//! ## Determinism
//!
//! Output is sorted by `(field, start, end, term)` with duplicates
//! removed, so extraction is a pure function of `(record, terms, mode)`.

use std::collections::BTreeSet;

use regcheck_core::{ApplicationRecord, FinancialField, RuleId};
use regcheck_rules::{normalize_term, Rule};
use serde::{Deserialize, Serialize};

use crate::config::MatchMode;

/// One occurrence of a trigger term in a text field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TermMatch {
    pub field: String,
    /// Byte offset of the first matched byte.
    pub start: usize,
    /// Byte offset one past the last matched byte.
    pub end: usize,
    /// Normalized trigger term.
    pub term: String,
    /// The matched text as it appears in the record.
    pub matched: String,
}

/// Where a piece of evidence was found.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvidenceSource {
    /// A span of a free-text field.
    Text {
        field: String,
        start: usize,
        end: usize,
        matched: String,
    },
    /// A structured field value read by a numeric condition.
    Field { field: FinancialField, value: i64 },
}

/// Supporting evidence for a finding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Evidence {
    pub rule_id: RuleId,
    /// The trigger term, or the field name for structured evidence.
    pub term: String,
    pub source: EvidenceSource,
}

impl Evidence {
    /// Evidence built from a term match.
    pub fn from_match(rule_id: &RuleId, m: TermMatch) -> Self {
        Self {
            rule_id: rule_id.clone(),
            term: m.term,
            source: EvidenceSource::Text {
                field: m.field,
                start: m.start,
                end: m.end,
                matched: m.matched,
            },
        }
    }
}

/// Finds trigger terms in application text.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvidenceExtractor {
    mode: MatchMode,
}

impl EvidenceExtractor {
    pub fn new(mode: MatchMode) -> Self {
        Self { mode }
    }

    /// Every match of every term in every text field of `record`.
    ///
    /// Terms are normalized first; blank terms are ignored.
    pub fn extract_terms<I, S>(&self, record: &ApplicationRecord, terms: I) -> Vec<TermMatch>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms: BTreeSet<String> = terms
            .into_iter()
            .map(|t| normalize_term(t.as_ref()))
            .filter(|t| !t.is_empty())
            .collect();

        let mut matches = BTreeSet::new();
        for (field, text) in record.text_sources() {
            for term in &terms {
                let words: Vec<&str> = term.split(' ').collect();
                for (start, end) in find_term(text, &words, self.mode) {
                    matches.insert(TermMatch {
                        field: field.to_string(),
                        start,
                        end,
                        term: term.clone(),
                        matched: text.get(start..end).unwrap_or_default().to_string(),
                    });
                }
            }
        }
        matches.into_iter().collect()
    }

    /// Text evidence for a rule's trigger terms.
    pub fn extract_for_rule(&self, record: &ApplicationRecord, rule: &Rule) -> Vec<Evidence> {
        self.extract_terms(record, &rule.trigger_terms)
            .into_iter()
            .map(|m| Evidence::from_match(&rule.id, m))
            .collect()
    }

    /// Evidence recording a structured field value.
    pub fn field_evidence(&self, rule: &Rule, field: FinancialField, value: i64) -> Evidence {
        Evidence {
            rule_id: rule.id.clone(),
            term: field.as_str().to_string(),
            source: EvidenceSource::Field { field, value },
        }
    }
}

/// Byte spans of every occurrence of `words` (a normalized term split on
/// single spaces) in `text`.
fn find_term(text: &str, words: &[&str], mode: MatchMode) -> Vec<(usize, usize)> {
    if words.first().map_or(true, |w| w.is_empty()) {
        return Vec::new();
    }
    text.char_indices()
        .filter_map(|(start, _)| match_at(text, start, words).map(|end| (start, end)))
        .filter(|&(start, end)| mode == MatchMode::Substring || is_word_boundary(text, start, end))
        .collect()
}

/// If `words` match at `start` (separated by whitespace runs), the end of
/// the match. Each text character is lowercased before comparison; a
/// character whose lowercase form spans several chars must match all of
/// them.
fn match_at(text: &str, start: usize, words: &[&str]) -> Option<usize> {
    let mut rest = text.get(start..)?.char_indices().peekable();
    let mut end = start;
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            let mut skipped = false;
            while rest.next_if(|&(_, c)| c.is_whitespace()).is_some() {
                skipped = true;
            }
            if !skipped {
                return None;
            }
        }
        let mut expected = word.chars().peekable();
        while expected.peek().is_some() {
            let (offset, c) = rest.next()?;
            for lower in c.to_lowercase() {
                if expected.next() != Some(lower) {
                    return None;
                }
            }
            end = start + offset + c.len_utf8();
        }
    }
    Some(end)
}

fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text
        .get(..start)
        .and_then(|s| s.chars().next_back())
        .map_or(false, char::is_alphanumeric);
    let after = text
        .get(end..)
        .and_then(|s| s.chars().next())
        .map_or(false, char::is_alphanumeric);
    !before && !after
}
