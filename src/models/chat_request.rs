use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Message;

fn default_model() -> String {
    "deepseek-chat".to_string()
}

/// The inbound request body. Unknown top-level fields (`stream` included) are
/// dropped; the outbound payload is rebuilt from scratch.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatRequest {
    #[serde(default = "default_model")]
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
}

impl ChatRequest {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_defaults_to_deepseek_chat() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"messages":[{"role":"user","content":"hi"}]}"#).unwrap();
        assert_eq!(request.model, "deepseek-chat");
        assert_eq!(request.messages.len(), 1);
        assert!(request.temperature.is_none());
    }

    #[test]
    fn test_sampling_parameters_are_parsed() {
        let request: ChatRequest = serde_json::from_str(
            r#"{
                "model": "deepseek-reasoner",
                "messages": [],
                "temperature": 0.2,
                "max_tokens": 1234,
                "top_p": 0.9,
                "presence_penalty": 0.1,
                "frequency_penalty": -0.5
            }"#,
        )
        .unwrap();
        assert_eq!(request.model, "deepseek-reasoner");
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(1234));
        assert_eq!(request.top_p, Some(0.9));
        assert_eq!(request.presence_penalty, Some(0.1));
        assert_eq!(request.frequency_penalty, Some(-0.5));
    }

    #[test]
    fn test_unknown_top_level_fields_are_ignored() {
        let request: ChatRequest = serde_json::from_str(
            r#"{"messages":[],"stream":true,"user":"abc"}"#,
        )
        .unwrap();
        assert!(request.messages.is_empty());
    }
}
