use serde::Serialize;

use super::chat_request::ChatRequest;
use super::Message;

const PRIMARY_MAX_TOKENS: u32 = 5000;
const RETRY_MAX_TOKENS: u32 = 3000;
const DEFAULT_TEMPERATURE: f64 = 0.7;

/// The body actually sent to DeepSeek. Streaming is always off; the relay
/// only speaks buffered JSON.
#[derive(Debug, Serialize, Clone)]
pub struct CompletionPayload {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
    pub max_tokens: u32,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
}

impl CompletionPayload {
    /// First attempt: relay defaults, overridden by whatever sampling
    /// parameters the caller supplied.
    pub fn primary(request: &ChatRequest, messages: Vec<Message>) -> Self {
        CompletionPayload {
            model: request.model.clone(),
            messages,
            stream: false,
            max_tokens: request.max_tokens.unwrap_or(PRIMARY_MAX_TOKENS),
            temperature: request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            top_p: request.top_p,
            presence_penalty: request.presence_penalty,
            frequency_penalty: request.frequency_penalty,
        }
    }

    /// Retry attempt after an upstream 502: smaller token budget, caller
    /// sampling overrides dropped.
    pub fn retry(request: &ChatRequest, messages: Vec<Message>) -> Self {
        CompletionPayload {
            model: request.model.clone(),
            messages,
            stream: false,
            max_tokens: RETRY_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: None,
            presence_penalty: None,
            frequency_penalty: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> ChatRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_primary_uses_relay_defaults() {
        let request = request(r#"{"messages":[{"role":"user","content":"hi"}]}"#);
        let payload = CompletionPayload::primary(&request, request.messages.clone());

        assert_eq!(payload.model, "deepseek-chat");
        assert_eq!(payload.max_tokens, 5000);
        assert_eq!(payload.temperature, 0.7);
        assert!(!payload.stream);

        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("top_p").is_none());
        assert!(value.get("presence_penalty").is_none());
        assert!(value.get("frequency_penalty").is_none());
    }

    #[test]
    fn test_primary_caller_overrides_win() {
        let request = request(
            r#"{"messages":[],"temperature":0.2,"max_tokens":1234,"top_p":0.9,"presence_penalty":0.1,"frequency_penalty":-0.5}"#,
        );
        let payload = CompletionPayload::primary(&request, Vec::new());

        assert_eq!(payload.max_tokens, 1234);
        assert_eq!(payload.temperature, 0.2);
        assert_eq!(payload.top_p, Some(0.9));
        assert_eq!(payload.presence_penalty, Some(0.1));
        assert_eq!(payload.frequency_penalty, Some(-0.5));
    }

    #[test]
    fn test_retry_drops_caller_overrides() {
        let request = request(
            r#"{"messages":[],"temperature":0.2,"max_tokens":9999,"top_p":0.9}"#,
        );
        let payload = CompletionPayload::retry(&request, Vec::new());

        assert_eq!(payload.max_tokens, 3000);
        assert_eq!(payload.temperature, 0.7);
        assert!(!payload.stream);
        assert!(payload.top_p.is_none());
        assert!(payload.presence_penalty.is_none());
        assert!(payload.frequency_penalty.is_none());
    }
}
