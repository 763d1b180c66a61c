//! Closed-set structured responses.
//!
//! A [`ChoiceSchema`] describes a JSON object with exactly one string field whose value must
//! be drawn from a fixed list of labels. Routers use it to force a model to pick a route (or
//! an agent name) instead of answering free-form.
//!
//! ```rust
//! use agentnet::schema::ChoiceSchema;
//!
//! let schema = ChoiceSchema::new("route", "next", ["Researcher", "Writer", "FINISH"]);
//! assert_eq!(schema.parse(r#"{"next": "Writer"}"#).unwrap(), "Writer");
//! assert!(schema.parse(r#"{"next": "Editor"}"#).is_err());
//! ```

use serde_json::{json, Value};
use std::error::Error;
use std::fmt;

/// Errors raised when a model reply does not satisfy a [`ChoiceSchema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The reply is not a JSON object.
    NotAnObject(String),
    /// The object lacks the schema's field, or the field is not a string.
    MissingField(String),
    /// The value is a string but not one of the allowed labels.
    OutOfSet { field: String, value: String },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::NotAnObject(raw) => write!(f, "Response is not a JSON object: {}", raw),
            SchemaError::MissingField(field) => {
                write!(f, "Response is missing string field '{}'", field)
            }
            SchemaError::OutOfSet { field, value } => {
                write!(f, "Value '{}' for field '{}' is not an allowed choice", value, field)
            }
        }
    }
}

impl Error for SchemaError {}

/// One-field structured response constrained to a closed label set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceSchema {
    /// Schema name sent to providers that require one (e.g. OpenAI `json_schema.name`).
    pub name: String,
    /// The single field carrying the choice.
    pub field: String,
    choices: Vec<String>,
}

impl ChoiceSchema {
    /// Build a schema. Duplicate labels are collapsed, first occurrence wins the position.
    pub fn new<I, S>(name: impl Into<String>, field: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for choice in choices {
            let choice = choice.into();
            if !unique.contains(&choice) {
                unique.push(choice);
            }
        }
        Self {
            name: name.into(),
            field: field.into(),
            choices: unique,
        }
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn contains(&self, label: &str) -> bool {
        self.choices.iter().any(|c| c == label)
    }

    /// Strict JSON schema for the response object.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = serde_json::Map::new();
        properties.insert(
            self.field.clone(),
            json!({ "type": "string", "enum": self.choices }),
        );
        json!({
            "type": "object",
            "properties": properties,
            "required": [self.field],
            "additionalProperties": false,
        })
    }

    /// Extract and validate the chosen label from a raw model reply.
    pub fn parse(&self, raw: &str) -> Result<String, SchemaError> {
        let body = strip_code_fence(raw);
        let value: Value = serde_json::from_str(body)
            .map_err(|_| SchemaError::NotAnObject(raw.to_string()))?;
        let object = value
            .as_object()
            .ok_or_else(|| SchemaError::NotAnObject(raw.to_string()))?;
        let chosen = object
            .get(&self.field)
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::MissingField(self.field.clone()))?;
        if !self.contains(chosen) {
            return Err(SchemaError::OutOfSet {
                field: self.field.clone(),
                value: chosen.to_string(),
            });
        }
        Ok(chosen.to_string())
    }
}

/// Models sometimes wrap JSON in a ```json fence even in structured mode.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
