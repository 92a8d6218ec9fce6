//! Registry of document types keyed by code.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::builtin::{law_config, rules_config};
use super::spec::{DocumentTypeConfig, DocumentTypeSpec};
use crate::error::{Result, StructurerError};

/// Top-level shape of a document type YAML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentTypeFile {
    #[serde(default)]
    pub document_types: Vec<DocumentTypeConfig>,
}

/// Registry of compiled document type specifications.
pub struct DocumentTypeRegistry {
    specs: BTreeMap<String, DocumentTypeSpec>,
}

impl DocumentTypeRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            specs: BTreeMap::new(),
        }
    }

    /// Register a compiled specification, replacing any with the same code.
    pub fn register(&mut self, spec: DocumentTypeSpec) {
        if self.specs.contains_key(&spec.code) {
            tracing::debug!(code = %spec.code, "Overriding registered document type");
        }
        self.specs.insert(spec.code.clone(), spec);
    }

    /// Compile and register a configuration.
    pub fn register_config(&mut self, config: &DocumentTypeConfig) -> Result<()> {
        self.register(DocumentTypeSpec::compile(config)?);
        Ok(())
    }

    /// Register every document type from a YAML string.
    pub fn load_yaml_str(&mut self, yaml: &str) -> Result<usize> {
        let file: DocumentTypeFile = serde_yaml_ng::from_str(yaml)?;
        for config in &file.document_types {
            self.register_config(config)?;
        }
        Ok(file.document_types.len())
    }

    /// Register every document type from a YAML file.
    pub fn load_yaml_file(&mut self, path: &Path) -> Result<usize> {
        let yaml = std::fs::read_to_string(path)?;
        let count = self.load_yaml_str(&yaml)?;
        tracing::info!(path = %path.display(), count, "Loaded document types");
        Ok(count)
    }

    /// Get the specification for a code.
    pub fn get(&self, code: &str) -> Result<&DocumentTypeSpec> {
        self.specs
            .get(code)
            .ok_or_else(|| StructurerError::UnknownDocumentType(code.to_string()))
    }

    /// Registered codes in sorted order.
    #[must_use]
    pub fn codes(&self) -> Vec<&str> {
        self.specs.keys().map(String::as_str).collect()
    }

    /// Registered specifications in code order.
    pub fn specs(&self) -> impl Iterator<Item = &DocumentTypeSpec> {
        self.specs.values()
    }
}

impl Default for DocumentTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a registry holding the built-in document types.
pub fn create_default_registry() -> Result<DocumentTypeRegistry> {
    let mut registry = DocumentTypeRegistry::new();
    registry.register_config(&law_config())?;
    registry.register_config(&rules_config())?;
    Ok(registry)
}
