//! The mirrored server store
//!
//! The store is a schema-less JSON object pushed by the server and mirrored
//! verbatim. Two fields are known to the renderer (`name`, `is_recording`);
//! everything else is preserved in received order for display but not
//! individually modeled. Each push replaces the snapshot wholesale.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A snapshot of the server-authoritative store
///
/// Key order is preserved as received, so the serialized form reproduces the
/// exact JSON text the server sent (modulo whitespace).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerStore {
    fields: Map<String, Value>,
}

impl ServerStore {
    /// Parse a snapshot from the JSON text of a transport message
    ///
    /// The payload must be a JSON object; anything else is a decode error.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The `name` field, if present and a string
    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }

    /// The `is_recording` field, if present and a boolean
    pub fn is_recording(&self) -> Option<bool> {
        self.fields.get("is_recording").and_then(Value::as_bool)
    }

    /// Raw access to any field, known or not
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Serialize back to JSON text, key order as received
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.fields).expect("JSON encoding failed")
    }
}
