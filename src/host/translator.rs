// Translation catalog
//
// Flat key -> string table, loaded from TOML. A key with no catalog entry
// translates to itself, so an empty catalog is a valid English deployment.

use std::collections::HashMap;

use anyhow::Context;
use serde::Deserialize;

use crate::host::Translator;

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(transparent)]
pub struct CatalogTranslator {
    catalog: HashMap<String, String>,
}

impl CatalogTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        toml::from_str(raw).context("failed to parse translation catalog")
    }

    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read translation catalog '{}'", path.display()))?;
        Self::from_toml_str(&raw)
    }
}

impl Translator for CatalogTranslator {
    fn tr(&self, key: &str) -> String {
        self.catalog
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}
