//! Per-section suggestion shapes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::validation::{Rules, Validate, ValidationError};

/// What the user already wrote for the section being improved.
///
/// Tagged on the wire as `{"kind": "text" | "structured", "value": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ExistingContent {
    Text(String),
    Structured(Map<String, Value>),
}

impl Default for ExistingContent {
    fn default() -> Self {
        ExistingContent::Text(String::new())
    }
}

impl ExistingContent {
    /// Wrap a field value: strings stay text, objects become structured,
    /// anything else is nested under `"value"`.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(text) => ExistingContent::Text(text),
            Value::Null => ExistingContent::Text(String::new()),
            Value::Object(map) => ExistingContent::Structured(map),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                ExistingContent::Structured(map)
            }
        }
    }

    /// Deterministic text used inside the prompt.
    ///
    /// Structured content is pretty-printed with object keys sorted, so the
    /// same content always yields the same prompt.
    pub fn render(&self) -> String {
        match self {
            ExistingContent::Text(text) => text.trim().to_string(),
            ExistingContent::Structured(map) => {
                let sorted = canonicalize(&Value::Object(map.clone()));
                serde_json::to_string_pretty(&sorted).unwrap_or_default()
            }
        }
    }

    /// True when nothing was written: blank strings, empty lists and objects
    /// whose values are all blank count as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            ExistingContent::Text(text) => text.trim().is_empty(),
            ExistingContent::Structured(map) => map.values().all(is_blank),
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.iter().all(is_blank),
        Value::Object(map) => map.values().all(is_blank),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSuggestionRequest {
    pub section_title: String,
    #[serde(default)]
    pub existing_content: ExistingContent,
}

impl Validate for SectionSuggestionRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        Rules::new("section suggestion request")
            .required("sectionTitle", &self.section_title)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSuggestionResponse {
    pub suggestions: String,
}
