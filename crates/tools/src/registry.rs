//! Tool Registry
//!
//! Ordered set of tool definitions offered to the assistant. The built-in
//! registry holds the three kiosk tools; a replacement set can be loaded
//! from a definitions file at hydration time.

use railsynth_core::{Error, Result};
use serde_json::Value as JsonValue;

use crate::arguments::ToolName;
use crate::schema::{builtin_schemas, ToolSchema};

/// Tool registry
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    /// (name, rendered definition) in declaration order
    tools: Vec<(String, JsonValue)>,
}

impl ToolRegistry {
    /// Registry of the fixed kiosk tools
    pub fn builtin() -> Self {
        let mut registry = Self { tools: Vec::new() };
        for schema in builtin_schemas() {
            registry.register(&schema);
        }
        registry
    }

    /// Register a schema, replacing any definition with the same name
    pub fn register(&mut self, schema: &ToolSchema) {
        self.insert(schema.name.clone(), schema.to_definition());
    }

    /// Build a registry from a JSON array of function definitions.
    ///
    /// Every entry must name one of the known kiosk tools.
    pub fn from_definitions(definitions: &JsonValue) -> Result<Self> {
        let entries = definitions
            .as_array()
            .ok_or_else(|| Error::Structure("tool definitions must be a JSON array".into()))?;

        let mut registry = Self { tools: Vec::new() };
        for (index, entry) in entries.iter().enumerate() {
            let name = entry
                .pointer("/function/name")
                .and_then(JsonValue::as_str)
                .ok_or_else(|| {
                    Error::Structure(format!("tool definition {} has no function.name", index))
                })?;
            name.parse::<ToolName>()?;
            registry.insert(name.to_string(), entry.clone());
        }

        tracing::debug!(tools = registry.len(), "Loaded tool definitions");
        Ok(registry)
    }

    fn insert(&mut self, name: String, definition: JsonValue) {
        match self.tools.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = definition,
            None => self.tools.push((name, definition)),
        }
    }

    /// Get a definition by name
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.tools
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, definition)| definition)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|(name, _)| name.clone()).collect()
    }

    /// The `tools` array of a record
    pub fn definitions(&self) -> JsonValue {
        JsonValue::Array(self.tools.iter().map(|(_, d)| d.clone()).collect())
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
