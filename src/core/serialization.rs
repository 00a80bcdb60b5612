//! # Payload Serialization
//!
//! Pluggable encoding for the structured payloads that ride inside sealed
//! frames. The transport itself is payload-agnostic; a channel fixes one
//! format at construction and both peers must agree on it out of band.
//!
//! Supported formats:
//! - **JSON**: human-readable text (debugging, interop)
//! - **MessagePack**: compact binary map encoding of the same data

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ChannelError, Result};

/// Payload encoding used on one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// Human-readable JSON text (default).
    #[default]
    Json,
    /// Compact binary map format.
    MessagePack,
}

impl WireFormat {
    /// Human-readable name for logs and diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            WireFormat::Json => "JSON",
            WireFormat::MessagePack => "MessagePack",
        }
    }

    /// Serializes a value to payload bytes.
    pub fn encode<T: Serialize>(self, value: &T) -> Result<Vec<u8>> {
        match self {
            WireFormat::Json => serde_json::to_vec(value)
                .map_err(|e| ChannelError::Serialization(e.to_string())),
            WireFormat::MessagePack => rmp_serde::to_vec(value)
                .map_err(|e| ChannelError::Serialization(e.to_string())),
        }
    }

    /// Deserializes payload bytes back into a value.
    pub fn decode<T: DeserializeOwned>(self, data: &[u8]) -> Result<T> {
        match self {
            WireFormat::Json => serde_json::from_slice(data)
                .map_err(|e| ChannelError::Serialization(e.to_string())),
            WireFormat::MessagePack => rmp_serde::from_slice(data)
                .map_err(|e| ChannelError::Serialization(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn format_names() {
        assert_eq!(WireFormat::Json.name(), "JSON");
        assert_eq!(WireFormat::MessagePack.name(), "MessagePack");
    }

    #[test]
    fn default_format() {
        assert_eq!(WireFormat::default(), WireFormat::Json);
    }

    #[test]
    fn json_roundtrip() {
        let value = json!({"op": "ping", "attempt": 3});
        let bytes = WireFormat::Json.encode(&value).unwrap();
        let recovered: serde_json::Value = WireFormat::Json.decode(&bytes).unwrap();
        assert_eq!(recovered, value);
    }

    #[test]
    fn messagepack_roundtrip() {
        let value = json!({"op": "ping", "attempt": 3});
        let bytes = WireFormat::MessagePack.encode(&value).unwrap();
        let recovered: serde_json::Value = WireFormat::MessagePack.decode(&bytes).unwrap();
        assert_eq!(recovered, value);
    }

    #[test]
    fn messagepack_is_more_compact() {
        let value = json!({"status": "success", "entries": ["a", "b", "c"]});
        let json_len = WireFormat::Json.encode(&value).unwrap().len();
        let msgpack_len = WireFormat::MessagePack.encode(&value).unwrap().len();
        assert!(msgpack_len < json_len);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let result: Result<serde_json::Value> = WireFormat::Json.decode(b"\xFF\xFE not json");
        assert!(matches!(result, Err(ChannelError::Serialization(_))));
    }

    #[test]
    fn format_mismatch_is_a_serialization_error() {
        let bytes = WireFormat::MessagePack.encode(&json!({"op": "list"})).unwrap();
        let result: Result<serde_json::Value> = WireFormat::Json.decode(&bytes);
        assert!(matches!(result, Err(ChannelError::Serialization(_))));
    }
}
