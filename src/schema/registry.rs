//! Embedded JSON schemas

use rust_embed::Embed;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

#[derive(Embed)]
#[folder = "schemas/"]
struct EmbeddedSchemas;

/// Name of the search config schema
pub const CONFIG_SCHEMA: &str = "ouija";

/// Holds schema documents by short name (`ouija` for `ouija.schema.json`)
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, String>,
}

impl SchemaRegistry {
    /// Empty registry, for callers that bring their own schemas
    pub fn empty() -> Self {
        Self {
            schemas: BTreeMap::new(),
        }
    }

    /// Register (or replace) a schema document
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.schemas.insert(name.into(), content.into());
    }

    /// Raw schema text by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.schemas.get(name).map(String::as_str)
    }

    /// Raw text of the search config schema
    pub fn config_schema(&self) -> Option<&str> {
        self.get(CONFIG_SCHEMA)
    }

    /// Registered schema names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Parsed schema document by name
    pub fn parsed(&self, name: &str) -> Option<JsonValue> {
        self.get(name)
            .and_then(|content| serde_json::from_str(content).ok())
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();

        for file in EmbeddedSchemas::iter() {
            let Some(name) = file.strip_suffix(".schema.json") else {
                continue;
            };
            if let Some(embedded) = EmbeddedSchemas::get(&file) {
                let content = String::from_utf8_lossy(&embedded.data).into_owned();
                registry.insert(name, content);
            }
        }

        registry
    }
}
