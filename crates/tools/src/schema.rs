//! Tool schemas
//!
//! The three kiosk tools offered to the assistant. The schemas are fixed and
//! identical across all samples.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::arguments::{ToolName, UiAction};

/// Schema definition for a single tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<ToolParameter>,
}

/// Parameter definition for a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    /// Parameter type (string, integer)
    #[serde(rename = "type")]
    pub param_type: String,
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(rename = "enum", default)]
    pub enum_values: Option<Vec<String>>,
    #[serde(default)]
    pub default: Option<JsonValue>,
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub max: Option<i64>,
}

impl ToolParameter {
    fn new(name: &str, param_type: &str, description: &str, required: bool) -> Self {
        Self {
            name: name.to_string(),
            param_type: param_type.to_string(),
            description: description.to_string(),
            required,
            enum_values: None,
            default: None,
            min: None,
            max: None,
        }
    }

    fn with_default(mut self, default: JsonValue) -> Self {
        self.default = Some(default);
        self
    }

    fn with_enum(mut self, values: &[&str]) -> Self {
        self.enum_values = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }

    fn with_range(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }
}

impl ToolSchema {
    /// Function-calling definition: `{type, function: {name, description, parameters}}`
    pub fn to_definition(&self) -> JsonValue {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in &self.parameters {
            let mut prop = serde_json::Map::new();
            prop.insert("type".to_string(), JsonValue::String(param.param_type.clone()));
            prop.insert(
                "description".to_string(),
                JsonValue::String(param.description.clone()),
            );

            if let Some(enum_values) = &param.enum_values {
                let values: Vec<JsonValue> = enum_values
                    .iter()
                    .map(|v| JsonValue::String(v.clone()))
                    .collect();
                prop.insert("enum".to_string(), JsonValue::Array(values));
            }
            if let Some(default) = &param.default {
                prop.insert("default".to_string(), default.clone());
            }
            if let Some(min) = param.min {
                prop.insert("minimum".to_string(), serde_json::json!(min));
            }
            if let Some(max) = param.max {
                prop.insert("maximum".to_string(), serde_json::json!(max));
            }

            properties.insert(param.name.clone(), JsonValue::Object(prop));

            if param.required {
                required.push(JsonValue::String(param.name.clone()));
            }
        }

        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                }
            }
        })
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
    }
}

/// The fixed kiosk tool set, in declaration order
pub fn builtin_schemas() -> Vec<ToolSchema> {
    vec![
        ToolSchema {
            name: ToolName::SearchTrains.as_str().to_string(),
            description: "Cerca i treni disponibili tra due stazioni".to_string(),
            parameters: vec![
                ToolParameter::new("origin", "string", "Stazione di partenza", true),
                ToolParameter::new("destination", "string", "Stazione di arrivo", true),
                ToolParameter::new("date", "string", "Data del viaggio (today, tomorrow o YYYY-MM-DD)", false)
                    .with_default(JsonValue::from("today")),
                ToolParameter::new("time", "string", "Orario di partenza (now, morning, afternoon, evening o HH:MM)", false)
                    .with_default(JsonValue::from("now")),
                ToolParameter::new("passengers", "integer", "Numero di passeggeri", false)
                    .with_default(JsonValue::from(1))
                    .with_range(1, 9),
            ],
        },
        ToolSchema {
            name: ToolName::PurchaseTicket.as_str().to_string(),
            description: "Acquista il biglietto per un treno mostrato a schermo".to_string(),
            parameters: vec![
                ToolParameter::new("train_id", "string", "Identificativo del treno", true),
                ToolParameter::new("class", "string", "Classe di viaggio", true)
                    .with_enum(&["Prima Classe", "Seconda Classe"]),
                ToolParameter::new("seat", "string", "Posto scelto, es. 12A", false),
                ToolParameter::new("carriage", "integer", "Numero della carrozza", false)
                    .with_range(1, 12),
            ],
        },
        ToolSchema {
            name: ToolName::UiControl.as_str().to_string(),
            description: "Controlla l'interfaccia del totem".to_string(),
            parameters: vec![
                ToolParameter::new("action", "string", "Azione da eseguire", true)
                    .with_enum(&UiAction::ALL.iter().map(|a| a.as_str()).collect::<Vec<_>>()),
                ToolParameter::new("train_position", "integer", "Posizione del treno nella lista", false)
                    .with_range(1, 99),
            ],
        },
    ]
}

/// JSON array of the fixed tool definitions
pub fn tool_definitions() -> JsonValue {
    JsonValue::Array(builtin_schemas().iter().map(ToolSchema::to_definition).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_tools_in_order() {
        let names: Vec<String> = builtin_schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["search_trains", "purchase_ticket", "ui_control"]);
    }

    #[test]
    fn test_required_parameters() {
        let schemas = builtin_schemas();
        let search: Vec<&str> = schemas[0].required_parameters().collect();
        assert_eq!(search, vec!["origin", "destination"]);
        let purchase: Vec<&str> = schemas[1].required_parameters().collect();
        assert_eq!(purchase, vec!["train_id", "class"]);
        let ui: Vec<&str> = schemas[2].required_parameters().collect();
        assert_eq!(ui, vec!["action"]);
    }

    #[test]
    fn test_definition_shape() {
        let definitions = tool_definitions();
        let ui = &definitions[2];
        assert_eq!(ui["type"], "function");
        assert_eq!(ui["function"]["name"], "ui_control");
        let actions = ui["function"]["parameters"]["properties"]["action"]["enum"]
            .as_array()
            .unwrap();
        assert_eq!(actions.len(), 5);
        assert_eq!(
            definitions[0]["function"]["parameters"]["properties"]["date"]["default"],
            "today"
        );
    }

    #[test]
    fn test_definitions_are_stable() {
        assert_eq!(
            serde_json::to_string(&tool_definitions()).unwrap(),
            serde_json::to_string(&tool_definitions()).unwrap()
        );
    }
}
