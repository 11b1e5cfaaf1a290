use anyhow::Error;
use bytes::Bytes;
use http::StatusCode;
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::clients::deepseek::{DeepSeekClient, PRIMARY_TIMEOUT, RETRY_TIMEOUT};
use crate::models::chat_request::ChatRequest;
use crate::models::completion_payload::CompletionPayload;
use crate::models::ErrorEnvelope;
use crate::repos::config::SluiceConfig;
use crate::utils::trim_history;

/// Everything a request needs, built once at startup. The API key lives in
/// the config and is read per request so a relay without one still starts
/// and reports the problem to callers.
pub struct RelayState {
    pub config: SluiceConfig,
    pub client: DeepSeekClient,
}

impl RelayState {
    pub fn new(config: SluiceConfig) -> Result<Self, Error> {
        let client = DeepSeekClient::new(config.upstream_url())?;
        Ok(RelayState { config, client })
    }
}

/// Validates the inbound body, trims history, forwards to DeepSeek and
/// relays the answer. A 502 from DeepSeek triggers exactly one retry.
/// Anticipated failures come back as `Ok` with an error envelope; `Err` is
/// reserved for faults the caller converts to the generic 500.
pub async fn handle_completion(
    state: &RelayState,
    whole_body: Bytes,
) -> Result<(StatusCode, Bytes), Error> {
    let trace_id = Uuid::new_v4().to_string();

    let parsed: Value = match serde_json::from_slice(&whole_body) {
        Ok(value) => value,
        Err(e) => {
            warn!("{} body is not valid JSON: {}", trace_id, e);
            return Ok((StatusCode::BAD_REQUEST, ErrorEnvelope::bytes("Invalid JSON")));
        }
    };
    if !parsed.is_object() {
        warn!("{} body is not a JSON object", trace_id);
        return Ok((StatusCode::BAD_REQUEST, ErrorEnvelope::bytes("Invalid JSON")));
    }
    match parsed.get("messages") {
        Some(messages) if messages.is_array() => {}
        _ => {
            warn!("{} body has no messages array", trace_id);
            return Ok((
                StatusCode::BAD_REQUEST,
                ErrorEnvelope::bytes("Missing messages[]"),
            ));
        }
    }
    let chat_request = match ChatRequest::from_value(parsed) {
        Ok(request) => request,
        Err(e) => {
            warn!("{} body does not decode to a chat request: {}", trace_id, e);
            return Ok((StatusCode::BAD_REQUEST, ErrorEnvelope::bytes("Invalid JSON")));
        }
    };

    let api_key = match state.config.api_key() {
        Some(key) => key,
        None => {
            error!("{} no DeepSeek API key in config or environment", trace_id);
            return Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorEnvelope::bytes("DeepSeek API key not configured"),
            ));
        }
    };

    let trimmed = trim_history(&chat_request.messages);
    info!(
        "{} forwarding {} of {} messages to {}",
        trace_id,
        trimmed.len(),
        chat_request.messages.len(),
        chat_request.model
    );
    let payload = CompletionPayload::primary(&chat_request, trimmed);

    let response = state
        .client
        .chat_completions(&payload, &api_key, PRIMARY_TIMEOUT)
        .await;
    let response = match response {
        Ok(response) => response,
        Err(e) => {
            error!("{} DeepSeek API connection error: {}", trace_id, e);
            return Ok((
                StatusCode::BAD_GATEWAY,
                ErrorEnvelope::bytes(format!("DeepSeek API connection error: {}", e)),
            ));
        }
    };

    info!("{} DeepSeek API responded with {}", trace_id, response.status);
    if response.status == StatusCode::BAD_GATEWAY {
        return retry_with_shorter_context(state, &chat_request, &api_key, &trace_id).await;
    }

    Ok((response.status, response.body))
}

/// One retry after an upstream 502: same trimming, smaller token budget,
/// shorter timeout. Whatever comes back is final, a second 502 included.
async fn retry_with_shorter_context(
    state: &RelayState,
    chat_request: &ChatRequest,
    api_key: &str,
    trace_id: &str,
) -> Result<(StatusCode, Bytes), Error> {
    info!("{} upstream 502, retrying with shorter context", trace_id);
    let trimmed = trim_history(&chat_request.messages);
    let payload = CompletionPayload::retry(chat_request, trimmed);

    match state
        .client
        .chat_completions(&payload, api_key, RETRY_TIMEOUT)
        .await
    {
        Ok(response) => {
            info!("{} retry responded with {}", trace_id, response.status);
            Ok((response.status, response.body))
        }
        Err(e) => {
            error!("{} DeepSeek API connection error on retry: {}", trace_id, e);
            Ok((
                StatusCode::BAD_GATEWAY,
                ErrorEnvelope::bytes(format!("DeepSeek API connection error: {}", e)),
            ))
        }
    }
}
