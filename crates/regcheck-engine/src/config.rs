//! Engine configuration.
//!
//! Loaded from a YAML or JSON file, with environment overrides:
//!
//! - `REGCHECK_MATCH_MODE` (`keyword` | `substring`)
//! - `REGCHECK_DEDUP_ENABLED` (`true` | `false`)
//! - `REGCHECK_DEDUP_THRESHOLD` (similarity in `(0.0, 1.0]`)
//!
//! The similarity threshold is clamped into range on every construction
//! path, with a warning when a value had to be adjusted.

use std::path::Path;

use regcheck_rules::{parser, ConfigResult, ConfigurationError};
use serde::{Deserialize, Serialize};

/// Default description similarity at which findings are merged.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

/// How trigger terms are matched against text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Whole-word matches only: the characters around a match must not
    /// be alphanumeric.
    #[default]
    Keyword,
    /// Any case-insensitive occurrence.
    Substring,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Substring => "substring",
        }
    }
}

impl std::str::FromStr for MatchMode {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyword" => Ok(Self::Keyword),
            "substring" => Ok(Self::Substring),
            _ => Err(ConfigurationError::InvalidSetting {
                key: "match_mode".to_string(),
                value: s.to_string(),
                expected: "keyword or substring",
            }),
        }
    }
}

/// Near-duplicate merging of findings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DedupConfig {
    pub enabled: bool,
    pub similarity_threshold: f64,
    /// Only merge findings from different jurisdictions.
    pub across_jurisdictions_only: bool,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            across_jurisdictions_only: true,
        }
    }
}

/// Top-level engine settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub match_mode: MatchMode,
    pub dedup: DedupConfig,
}

impl EngineConfig {
    /// Load from a `.yaml`, `.yml` or `.json` file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let config: Self = parser::load_typed(path)?;
        Ok(config.normalized())
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> ConfigResult<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply `REGCHECK_*` environment overrides.
    pub fn with_env_overrides(self) -> ConfigResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("REGCHECK_MATCH_MODE") {
            self.match_mode = value
                .parse()
                .map_err(|_| invalid("REGCHECK_MATCH_MODE", &value, "keyword or substring"))?;
        }
        if let Some(value) = lookup("REGCHECK_DEDUP_ENABLED") {
            self.dedup.enabled = parse_bool(&value)
                .ok_or_else(|| invalid("REGCHECK_DEDUP_ENABLED", &value, "true or false"))?;
        }
        if let Some(value) = lookup("REGCHECK_DEDUP_THRESHOLD") {
            self.dedup.similarity_threshold = value
                .trim()
                .parse::<f64>()
                .map_err(|_| invalid("REGCHECK_DEDUP_THRESHOLD", &value, "a number in (0, 1]"))?;
        }
        Ok(self.normalized())
    }

    /// Clamp out-of-range values.
    pub fn normalized(mut self) -> Self {
        self.dedup.similarity_threshold = clamp_threshold(self.dedup.similarity_threshold);
        self
    }
}

fn invalid(key: &str, value: &str, expected: &'static str) -> ConfigurationError {
    ConfigurationError::InvalidSetting {
        key: key.to_string(),
        value: value.to_string(),
        expected,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Clamp a similarity threshold into `(0.0, 1.0]`.
pub fn clamp_threshold(threshold: f64) -> f64 {
    if threshold.is_nan() {
        tracing::warn!("dedup: NaN similarity threshold, using default {DEFAULT_SIMILARITY_THRESHOLD}");
        DEFAULT_SIMILARITY_THRESHOLD
    } else if threshold <= 0.0 {
        tracing::warn!(threshold, "dedup: similarity threshold <= 0.0, clamping to 0.01");
        0.01
    } else if threshold > 1.0 {
        tracing::warn!(threshold, "dedup: similarity threshold > 1.0, clamping to 1.0");
        1.0
    } else {
        threshold
    }
}
