//! Import configuration.

use crate::{ImportError, Result, UNIFIED_SOURCE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

pub const DEFAULT_BASE_IRI: &str = "http://UMLS/";
pub const DEFAULT_BATCH_SIZE: usize = 300_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Terminology allow-list. `None` keeps every terminology.
    pub terminologies: Option<BTreeSet<String>>,
    /// Two-letter language allow-list. `None` keeps every language.
    pub languages: Option<BTreeSet<String>>,
    /// Prefix of every IRI the importer mints.
    pub base_iri: String,
    /// Buffered facts before a flush to the store.
    pub batch_size: usize,
    /// Read the semantic-type tables (only when unified concepts are extracted).
    pub semantic_types: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            terminologies: None,
            languages: None,
            base_iri: DEFAULT_BASE_IRI.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            semantic_types: true,
        }
    }
}

impl ImportConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: ImportConfig = serde_json::from_str(&text)
            .map_err(|e| ImportError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ImportError::Config("batch_size must be positive".to_string()));
        }
        if self.base_iri.is_empty() {
            return Err(ImportError::Config("base_iri must not be empty".to_string()));
        }
        Ok(())
    }

    /// Unified concepts are extracted unless an allow-list omits `CUI`.
    pub fn extract_unified(&self) -> bool {
        self.terminologies
            .as_ref()
            .map_or(true, |set| set.is_empty() || set.contains(UNIFIED_SOURCE))
    }

    pub fn with_terminologies<I, T>(mut self, terminologies: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.terminologies = Some(terminologies.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_languages<I, T>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.languages = Some(languages.into_iter().map(Into::into).collect());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unified_extraction_follows_allow_list() {
        assert!(ImportConfig::default().extract_unified());
        assert!(!ImportConfig::default()
            .with_terminologies(["ICD10"])
            .extract_unified());
        assert!(ImportConfig::default()
            .with_terminologies(["ICD10", "CUI"])
            .extract_unified());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("import.json");
        std::fs::write(&path, r#"{ "languages": ["fr", "en"], "batch_size": 10 }"#)?;
        let config = ImportConfig::from_json_file(&path)?;
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.base_iri, DEFAULT_BASE_IRI);
        assert!(config.languages.as_ref().is_some_and(|l| l.contains("fr")));
        Ok(())
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let config = ImportConfig {
            batch_size: 0,
            ..ImportConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
