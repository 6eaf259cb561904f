//! Control schemas and control-value filtering.
//!
//! A step's control schema is a JSON Schema document. Control values are a
//! free-form JSON object; only keys the schema declares are persisted when
//! the schema declares any.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wrapper holding a step's JSON Schema, as sent and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlsSchema {
    #[serde(default = "empty_object")]
    pub schema: Value,
}

impl Default for ControlsSchema {
    fn default() -> Self {
        Self {
            schema: empty_object(),
        }
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Keys declared under `properties` in a JSON Schema, if any.
fn declared_properties(schema: &Value) -> Option<&Map<String, Value>> {
    schema
        .get("properties")
        .and_then(Value::as_object)
        .filter(|props| !props.is_empty())
}

/// Compute the control values to store for a step.
///
/// When the schema declares `properties`, keys it does not declare are
/// dropped. A schema without properties accepts every value.
pub fn diff_control_values(new_values: &Map<String, Value>, schema: &Value) -> Map<String, Value> {
    match declared_properties(schema) {
        Some(props) => new_values
            .iter()
            .filter(|(key, _)| props.contains_key(key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
        None => new_values.clone(),
    }
}

/// Coerce an arbitrary JSON value into an object map; non-objects become empty.
pub fn as_object_or_empty(value: &Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}
