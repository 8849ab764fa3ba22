//! # Rule Registry
//!
//! The validated, immutable set of rules an engine evaluates.
//!
//! ## Ordering
//!
//! Rules keep the order they appear in the rulebook. That order is the
//! registry *position* of a rule, and the final tiebreak of the findings
//! aggregator, so two runs over the same rulebook always list findings
//! identically.
//!
//! ## Digest
//!
//! Every registry carries a SHA-256 digest over the canonical form of its
//! validated rules. Reports record it so a reviewer can tell exactly which
//! rulebook snapshot produced a finding.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use regcheck_core::{sha256_digest, CanonicalBytes, ContentDigest, Jurisdiction, RuleId, Severity};
use serde::Serialize;

use crate::error::{ConfigResult, ConfigurationError};
use crate::library::RegulationLibrary;
use crate::rule::{normalize_term, ClauseRef, Rule};
use crate::rulebook::{RuleDefinition, RulebookDocument};
use crate::{parser, standard};

/// Aggregate view of a registry, for listings and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrySummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub digest: String,
    pub rule_count: usize,
    pub by_jurisdiction: BTreeMap<Jurisdiction, usize>,
    pub mandatory: usize,
    pub guidance: usize,
    pub human_review: usize,
}

/// Validated rules, indexed by id and jurisdiction.
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    name: String,
    version: Option<String>,
    jurisdictions: BTreeSet<Jurisdiction>,
    rules: Vec<Rule>,
    index: HashMap<RuleId, usize>,
    digest: ContentDigest,
}

#[derive(Serialize)]
struct Snapshot<'a> {
    name: &'a str,
    version: Option<&'a str>,
    jurisdictions: &'a BTreeSet<Jurisdiction>,
    rules: &'a [Rule],
}

impl RuleRegistry {
    /// Validate a rulebook without a regulation library.
    pub fn from_rulebook(doc: RulebookDocument) -> ConfigResult<Self> {
        Self::from_rulebook_with_library(doc, None)
    }

    /// Validate a rulebook. When `library` is given, every `clause_id` a
    /// rule cites must resolve in it, and the clause supplies a missing
    /// description or severity.
    pub fn from_rulebook_with_library(
        doc: RulebookDocument,
        library: Option<&RegulationLibrary>,
    ) -> ConfigResult<Self> {
        let jurisdictions = declared_jurisdictions(&doc)?;

        let mut rules = Vec::with_capacity(doc.rules.len());
        let mut index = HashMap::with_capacity(doc.rules.len());
        for (i, def) in doc.rules.into_iter().enumerate() {
            let rule = validate_rule(i, def, &jurisdictions, library)?;
            if index.contains_key(&rule.id) {
                return Err(ConfigurationError::DuplicateRuleId {
                    rule_id: rule.id.to_string(),
                });
            }
            index.insert(rule.id.clone(), rules.len());
            rules.push(rule);
        }

        let digest = sha256_digest(&CanonicalBytes::new(&Snapshot {
            name: &doc.name,
            version: doc.version.as_deref(),
            jurisdictions: &jurisdictions,
            rules: &rules,
        })?);

        tracing::info!(
            rulebook = %doc.name,
            rules = rules.len(),
            digest = %digest,
            "loaded rule registry"
        );

        Ok(Self {
            name: doc.name,
            version: doc.version,
            jurisdictions,
            rules,
            index,
            digest,
        })
    }

    /// Parse and validate a YAML rulebook held in memory.
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let doc: RulebookDocument =
            serde_yaml::from_str(yaml).map_err(|e| ConfigurationError::YamlParse {
                path: PathBuf::from("<inline>"),
                source: e,
            })?;
        Self::from_rulebook(doc)
    }

    /// Load a YAML rulebook file.
    pub fn load_yaml(path: &Path) -> ConfigResult<Self> {
        Self::from_rulebook(parser::load_yaml_typed(path)?)
    }

    /// Load a JSON rulebook file.
    pub fn load_json(path: &Path) -> ConfigResult<Self> {
        Self::from_rulebook(parser::load_json_typed(path)?)
    }

    /// Load a rulebook file, choosing the format from its extension.
    pub fn load_path(path: &Path) -> ConfigResult<Self> {
        Self::from_rulebook(RulebookDocument::load(path)?)
    }

    /// Load a rulebook file and resolve its citations against `library`.
    pub fn load_path_with_library(path: &Path, library: &RegulationLibrary) -> ConfigResult<Self> {
        Self::from_rulebook_with_library(RulebookDocument::load(path)?, Some(library))
    }

    /// The built-in UK/EU/US rulebook.
    pub fn standard() -> ConfigResult<Self> {
        Self::from_rulebook(standard::standard_rulebook())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn get(&self, id: &RuleId) -> Option<&Rule> {
        self.index.get(id).map(|&i| &self.rules[i])
    }

    pub fn contains(&self, id: &RuleId) -> bool {
        self.index.contains_key(id)
    }

    /// Position of a rule in rulebook order.
    pub fn position(&self, id: &RuleId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All rules in rulebook order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rules of one jurisdiction, in rulebook order.
    pub fn by_jurisdiction(&self, jurisdiction: Jurisdiction) -> Vec<&Rule> {
        self.rules
            .iter()
            .filter(|r| r.jurisdiction == jurisdiction)
            .collect()
    }

    /// Declared jurisdictions in canonical order.
    pub fn jurisdictions(&self) -> Vec<Jurisdiction> {
        self.jurisdictions.iter().copied().collect()
    }

    pub fn declares(&self, jurisdiction: Jurisdiction) -> bool {
        self.jurisdictions.contains(&jurisdiction)
    }

    pub fn digest(&self) -> ContentDigest {
        self.digest
    }

    pub fn summary(&self) -> RegistrySummary {
        let mut by_jurisdiction: BTreeMap<Jurisdiction, usize> =
            self.jurisdictions.iter().map(|&j| (j, 0)).collect();
        for rule in &self.rules {
            *by_jurisdiction.entry(rule.jurisdiction).or_default() += 1;
        }
        let mandatory = self
            .rules
            .iter()
            .filter(|r| r.severity == Severity::Mandatory)
            .count();
        RegistrySummary {
            name: self.name.clone(),
            version: self.version.clone(),
            digest: self.digest.to_string(),
            rule_count: self.rules.len(),
            by_jurisdiction,
            mandatory,
            guidance: self.rules.len() - mandatory,
            human_review: self.rules.iter().filter(|r| r.requires_human_review).count(),
        }
    }
}

fn declared_jurisdictions(doc: &RulebookDocument) -> ConfigResult<BTreeSet<Jurisdiction>> {
    if doc.jurisdictions.is_empty() {
        return Err(ConfigurationError::NoJurisdictions {
            name: doc.name.clone(),
        });
    }
    doc.jurisdictions
        .iter()
        .map(|code| {
            code.parse::<Jurisdiction>()
                .map_err(|source| ConfigurationError::UnknownJurisdiction {
                    context: format!("rulebook {:?}", doc.name),
                    source,
                })
        })
        .collect()
}

fn validate_rule(
    index: usize,
    def: RuleDefinition,
    declared: &BTreeSet<Jurisdiction>,
    library: Option<&RegulationLibrary>,
) -> ConfigResult<Rule> {
    let id = RuleId::new(def.id).map_err(|source| ConfigurationError::InvalidRuleId { index, source })?;
    let rule_id = id.to_string();

    let jurisdiction = def.jurisdiction.parse::<Jurisdiction>().map_err(|source| {
        ConfigurationError::UnknownJurisdiction {
            context: format!("rule {rule_id}"),
            source,
        }
    })?;
    if !declared.contains(&jurisdiction) {
        return Err(ConfigurationError::UndeclaredJurisdiction {
            rule_id,
            jurisdiction,
        });
    }

    let citation = def.citation.trim().to_string();
    if citation.is_empty() {
        return Err(ConfigurationError::MissingField {
            rule_id,
            field: "citation",
        });
    }

    let clause = match (library, def.clause_id.as_deref()) {
        (Some(library), Some(clause_id)) => {
            let found = library.find_clause(def.document_type.as_deref(), clause_id);
            match found {
                Some((_, clause)) => Some(clause),
                None => {
                    return Err(ConfigurationError::UnknownClause {
                        rule_id,
                        document: def
                            .document_type
                            .clone()
                            .unwrap_or_else(|| "regulation library".to_string()),
                        clause_id: clause_id.to_string(),
                    })
                }
            }
        }
        _ => None,
    };

    let description = def
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .or_else(|| clause.map(|c| c.content.trim().to_string()))
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ConfigurationError::MissingField {
            rule_id: rule_id.clone(),
            field: "description",
        })?;

    let severity = def
        .severity
        .or_else(|| clause.and_then(|c| c.clause_type.severity()))
        .or_else(|| def.clause_id.as_deref().and_then(Severity::from_clause_id))
        .ok_or_else(|| ConfigurationError::MissingSeverity {
            rule_id: rule_id.clone(),
            clause_id: def.clause_id.clone(),
        })?;

    let mut trigger_terms = BTreeSet::new();
    for (i, raw) in def.trigger_terms.iter().enumerate() {
        let term = normalize_term(raw);
        if term.is_empty() {
            return Err(ConfigurationError::BlankTriggerTerm {
                rule_id,
                index: i,
            });
        }
        trigger_terms.insert(term);
    }
    if def.condition.is_term_based() && trigger_terms.is_empty() {
        return Err(ConfigurationError::EmptyTriggerTerms {
            rule_id,
            kind: def.condition.kind(),
        });
    }

    let source = def.clause_id.map(|clause_id| ClauseRef {
        document_type: def.document_type,
        clause_id: clause_id.trim().to_string(),
    });

    Ok(Rule {
        id,
        jurisdiction,
        citation,
        description,
        trigger_terms,
        severity,
        requires_human_review: def.requires_human_review,
        condition: def.condition,
        source,
    })
}
