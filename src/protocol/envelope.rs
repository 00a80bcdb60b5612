//! Request and response envelopes.
//!
//! Schema-free key-value payloads exchanged over a secure channel. A
//! request names an operation under `"op"`; a response reports `"status"`
//! (`"success"` or `"failure"`) with an optional `"message"`. Everything
//! else in the map belongs to the application.
//!
//! The envelopes serialize transparently as plain maps, so the same value
//! encodes as `{"op":"ping"}` in JSON or as the equivalent MessagePack map.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_FAILURE: &str = "failure";

/// One decoded application request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestEnvelope {
    fields: Map<String, Value>,
}

impl RequestEnvelope {
    /// Creates a request for the named operation.
    pub fn new(op: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("op".to_string(), Value::String(op.into()));
        Self { fields }
    }

    /// The operation name, if the peer supplied one.
    pub fn op(&self) -> Option<&str> {
        self.fields.get("op").and_then(Value::as_str)
    }

    /// Builder-style parameter insertion.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// One application response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseEnvelope {
    fields: Map<String, Value>,
}

impl ResponseEnvelope {
    /// A bare success response: `{"status":"success"}`.
    pub fn success() -> Self {
        let mut fields = Map::new();
        fields.insert(
            "status".to_string(),
            Value::String(STATUS_SUCCESS.to_string()),
        );
        Self { fields }
    }

    /// A failure response carrying a human-readable message.
    pub fn failure(message: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(
            "status".to_string(),
            Value::String(STATUS_FAILURE.to_string()),
        );
        fields.insert("message".to_string(), Value::String(message.into()));
        Self { fields }
    }

    pub fn status(&self) -> Option<&str> {
        self.fields.get("status").and_then(Value::as_str)
    }

    pub fn message(&self) -> Option<&str> {
        self.fields.get("message").and_then(Value::as_str)
    }

    pub fn is_success(&self) -> bool {
        self.status() == Some(STATUS_SUCCESS)
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}
