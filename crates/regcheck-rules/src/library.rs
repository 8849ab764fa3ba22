//! # Regulation Library
//!
//! Parsed regulation documents (FCA CONC, FG21/1, EBA GL/2020/06, ...) in
//! the JSON form produced by the document extraction pipeline. A rulebook
//! may cite clauses by `document_type` and `clause_id`. When a library is
//! loaded, the registry checks every citation resolves and fills in
//! missing descriptions and severities from the clause.
//!
//! ## Clause types
//!
//! Handbook clause identifiers end in ` R` (rule) or ` G` (guidance).
//! A clause whose `clause_type` is absent or `UNKNOWN` has its type
//! detected from that suffix when the document is loaded.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::NaiveDateTime;
use regcheck_core::{Jurisdiction, Severity};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigResult, ConfigurationError};
use crate::parser;

/// Whether a clause is a binding rule or guidance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClauseType {
    #[serde(rename = "R")]
    Regulation,
    #[serde(rename = "G")]
    Guidance,
    #[default]
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl ClauseType {
    /// Detect the type from a clause identifier suffix.
    pub fn from_clause_id(clause_id: &str) -> Self {
        match Severity::from_clause_id(clause_id) {
            Some(Severity::Mandatory) => Self::Regulation,
            Some(Severity::Guidance) => Self::Guidance,
            None => Self::Unknown,
        }
    }

    /// The rule severity implied by this clause type.
    pub fn severity(self) -> Option<Severity> {
        match self {
            Self::Regulation => Some(Severity::Mandatory),
            Self::Guidance => Some(Severity::Guidance),
            Self::Unknown => None,
        }
    }
}

/// A single clause of a regulation document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegulationClause {
    /// Main section number, e.g. `5.2A`.
    pub section: String,
    /// Full clause identifier, e.g. `5.2A.1 R`.
    pub clause_id: String,
    #[serde(default)]
    pub main_section_name: Option<String>,
    #[serde(default)]
    pub subsection_name: Option<String>,
    pub content: String,
    pub page_number: u32,
    #[serde(default)]
    pub clause_type: ClauseType,
}

impl RegulationClause {
    /// Replace an `UNKNOWN` clause type with the one implied by the
    /// clause identifier. An explicit type is left untouched.
    pub fn detect_type(&mut self) {
        if self.clause_type == ClauseType::Unknown {
            self.clause_type = ClauseType::from_clause_id(&self.clause_id);
        }
    }
}

/// Provenance of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub source_file: String,
    pub total_pages: u32,
    #[serde(default)]
    pub sections_extracted: Vec<String>,
    #[serde(default)]
    pub parser_version: Option<String>,
    #[serde(default)]
    pub extraction_date: Option<NaiveDateTime>,
    pub country: Jurisdiction,
    #[serde(default)]
    pub additional_info: BTreeMap<String, serde_json::Value>,
}

/// A fully parsed regulation document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegulationDocument {
    /// Document type key, e.g. `UK_FCA_CONC`.
    pub document_type: String,
    #[serde(default)]
    pub version: Option<String>,
    pub country: Jurisdiction,
    #[serde(default)]
    pub clauses: Vec<RegulationClause>,
    pub metadata: DocumentMetadata,
}

impl RegulationDocument {
    /// Load a document from a JSON file, detecting clause types.
    ///
    /// A document must report at least one source page.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let mut doc: Self = parser::load_json_typed(path)?;
        if doc.metadata.total_pages == 0 {
            return Err(ConfigurationError::InvalidDocument {
                path: path.to_path_buf(),
                reason: "metadata.total_pages must be at least 1".to_string(),
            });
        }
        for clause in &mut doc.clauses {
            clause.detect_type();
        }
        Ok(doc)
    }

    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    /// Clauses belonging to `section`, in document order.
    pub fn clauses_by_section(&self, section: &str) -> Vec<&RegulationClause> {
        self.clauses.iter().filter(|c| c.section == section).collect()
    }

    /// Distinct section numbers, sorted.
    pub fn sections(&self) -> Vec<&str> {
        self.clauses
            .iter()
            .map(|c| c.section.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Look up a clause by identifier. Trailing whitespace is ignored.
    pub fn find_clause(&self, clause_id: &str) -> Option<&RegulationClause> {
        let wanted = clause_id.trim();
        self.clauses.iter().find(|c| c.clause_id.trim() == wanted)
    }
}

/// Regulation documents keyed by document type.
#[derive(Debug, Clone, Default)]
pub struct RegulationLibrary {
    documents: BTreeMap<String, RegulationDocument>,
}

impl RegulationLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document. A document of the same type is replaced.
    pub fn insert(&mut self, doc: RegulationDocument) {
        let document_type = doc.document_type.clone();
        if self.documents.insert(document_type.clone(), doc).is_some() {
            tracing::warn!(document_type = %document_type, "replacing previously loaded regulation document");
        }
    }

    /// Load one JSON document file, or every `*.json` file in a directory
    /// (sorted by file name).
    pub fn load_path(&mut self, path: &Path) -> ConfigResult<usize> {
        if path.is_dir() {
            let mut files = Vec::new();
            for entry in std::fs::read_dir(path)? {
                let file = entry?.path();
                if file.is_file() && parser::extension(&file).as_deref() == Some("json") {
                    files.push(file);
                }
            }
            files.sort();
            for file in &files {
                self.insert(RegulationDocument::load(file)?);
            }
            Ok(files.len())
        } else if path.exists() {
            self.insert(RegulationDocument::load(path)?);
            Ok(1)
        } else {
            Err(ConfigurationError::FileNotFound {
                path: path.to_path_buf(),
            })
        }
    }

    /// Build a library from several files or directories.
    pub fn load_paths<P: AsRef<Path>>(paths: &[P]) -> ConfigResult<Self> {
        let mut library = Self::new();
        for path in paths {
            let loaded = library.load_path(path.as_ref())?;
            tracing::debug!(path = %path.as_ref().display(), documents = loaded, "loaded regulation documents");
        }
        Ok(library)
    }

    pub fn get(&self, document_type: &str) -> Option<&RegulationDocument> {
        self.documents.get(document_type)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Loaded document types, sorted.
    pub fn document_types(&self) -> Vec<&str> {
        self.documents.keys().map(String::as_str).collect()
    }

    /// Document types grouped by jurisdiction.
    pub fn supported_combinations(&self) -> BTreeMap<Jurisdiction, Vec<&str>> {
        let mut out: BTreeMap<Jurisdiction, Vec<&str>> = BTreeMap::new();
        for doc in self.documents.values() {
            out.entry(doc.country)
                .or_default()
                .push(doc.document_type.as_str());
        }
        out
    }

    /// Resolve a clause. With a `document_type` only that document is
    /// searched; without one the first match in document-type order wins.
    pub fn find_clause(
        &self,
        document_type: Option<&str>,
        clause_id: &str,
    ) -> Option<(&RegulationDocument, &RegulationClause)> {
        match document_type {
            Some(dt) => {
                let doc = self.documents.get(dt)?;
                doc.find_clause(clause_id).map(|c| (doc, c))
            }
            None => self
                .documents
                .values()
                .find_map(|doc| doc.find_clause(clause_id).map(|c| (doc, c))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conc_json() -> serde_json::Value {
        serde_json::json!({
            "document_type": "UK_FCA_CONC",
            "version": "2024-01",
            "country": "UK",
            "clauses": [
                {
                    "section": "5.2A",
                    "clause_id": "5.2A.4 R",
                    "main_section_name": "Creditworthiness assessment",
                    "content": "A firm must undertake a reasonable assessment of creditworthiness.",
                    "page_number": 41
                },
                {
                    "section": "5.2A",
                    "clause_id": "5.2A.5 G",
                    "content": "The extent of the assessment depends on the circumstances.",
                    "page_number": 42
                },
                {
                    "section": "7.3",
                    "clause_id": "7.3.4 R",
                    "content": "A firm must treat customers in default or arrears with forbearance.",
                    "page_number": 88,
                    "clause_type": "G"
                }
            ],
            "metadata": {
                "source_file": "data/uk/conc.pdf",
                "total_pages": 120,
                "sections_extracted": ["5.2A", "7.3"],
                "parser_version": "1.0.0",
                "extraction_date": "2024-05-01T12:30:00.123456",
                "country": "UK"
            }
        })
    }

    fn write_doc(dir: &Path, name: &str, value: &serde_json::Value) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
        path
    }

    #[test]
    fn load_detects_clause_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(dir.path(), "conc.json", &conc_json());
        let doc = RegulationDocument::load(&path).unwrap();
        assert_eq!(doc.country, Jurisdiction::Uk);
        assert_eq!(doc.clause_count(), 3);
        assert_eq!(doc.clauses[0].clause_type, ClauseType::Regulation);
        assert_eq!(doc.clauses[1].clause_type, ClauseType::Guidance);
        // Explicit type wins over the suffix.
        assert_eq!(doc.clauses[2].clause_type, ClauseType::Guidance);
        assert!(doc.metadata.extraction_date.is_some());
    }

    #[test]
    fn sections_and_section_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let doc = RegulationDocument::load(&write_doc(dir.path(), "c.json", &conc_json())).unwrap();
        assert_eq!(doc.sections(), vec!["5.2A", "7.3"]);
        assert_eq!(doc.clauses_by_section("5.2A").len(), 2);
        assert!(doc.clauses_by_section("9.9").is_empty());
        assert!(doc.find_clause("7.3.4 R ").is_some());
    }

    #[test]
    fn unknown_suffix_stays_unknown() {
        assert_eq!(ClauseType::from_clause_id("Article 22"), ClauseType::Unknown);
        assert_eq!(ClauseType::Unknown.severity(), None);
        assert_eq!(ClauseType::Regulation.severity(), Some(Severity::Mandatory));
    }

    #[test]
    fn library_loads_directory_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write_doc(dir.path(), "b_conc.json", &conc_json());
        let mut eba = conc_json();
        eba["document_type"] = "EU_EBA_GL_2020_06".into();
        eba["country"] = "EU".into();
        eba["metadata"]["country"] = "EU".into();
        write_doc(dir.path(), "a_eba.json", &eba);
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let library = RegulationLibrary::load_paths(&[dir.path()]).unwrap();
        assert_eq!(library.len(), 2);
        assert_eq!(library.document_types(), vec!["EU_EBA_GL_2020_06", "UK_FCA_CONC"]);
        let combos = library.supported_combinations();
        assert_eq!(combos[&Jurisdiction::Uk], vec!["UK_FCA_CONC"]);
        assert_eq!(combos[&Jurisdiction::Eu], vec!["EU_EBA_GL_2020_06"]);
    }

    #[test]
    fn find_clause_with_and_without_document_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(dir.path(), "conc.json", &conc_json());
        let library = RegulationLibrary::load_paths(&[path]).unwrap();
        let (doc, clause) = library.find_clause(Some("UK_FCA_CONC"), "5.2A.4 R").unwrap();
        assert_eq!(doc.document_type, "UK_FCA_CONC");
        assert_eq!(clause.page_number, 41);
        assert!(library.find_clause(None, "5.2A.5 G").is_some());
        assert!(library.find_clause(Some("EU_EBA_GL_2020_06"), "5.2A.4 R").is_none());
    }

    #[test]
    fn zero_page_document_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut value = conc_json();
        value["metadata"]["total_pages"] = 0.into();
        let path = write_doc(dir.path(), "conc.json", &value);
        let err = RegulationDocument::load(&path).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidDocument { .. }));
        assert!(format!("{err}").contains("total_pages"));
    }

    #[test]
    fn metadata_country_is_required() {
        let dir = tempfile::tempdir().unwrap();
        let mut value = conc_json();
        value["metadata"]
            .as_object_mut()
            .unwrap()
            .remove("country");
        let path = write_doc(dir.path(), "conc.json", &value);
        assert!(matches!(
            RegulationDocument::load(&path).unwrap_err(),
            ConfigurationError::JsonParse { .. }
        ));
    }

    #[test]
    fn missing_path_is_file_not_found() {
        let err = RegulationLibrary::load_paths(&["/nonexistent/docs.json"]).unwrap_err();
        assert!(matches!(err, ConfigurationError::FileNotFound { .. }));
    }
}
