use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod chat_request;
pub mod completion_payload;

/// A single conversation turn. Only `role` is inspected by the relay; every
/// other field (content, name, tool calls) is captured as-is and forwarded
/// to the upstream untouched.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl Message {
    pub fn is_system(&self) -> bool {
        self.role.as_deref() == Some("system")
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub ok: bool,
    pub error: String,
}

impl ErrorEnvelope {
    /// Serialized `{ok: false, error: ...}` body for a relay-originated error.
    pub fn bytes(message: impl Into<String>) -> Bytes {
        let envelope = ErrorEnvelope {
            ok: false,
            error: message.into(),
        };
        Bytes::from(serde_json::to_vec(&envelope).unwrap_or_default())
    }
}
