use std::time::Duration;

use anyhow::Error;
use bytes::Bytes;
use http::{header, StatusCode};

use crate::models::completion_payload::CompletionPayload;

pub const PRIMARY_TIMEOUT: Duration = Duration::from_secs(180);
pub const RETRY_TIMEOUT: Duration = Duration::from_secs(120);

const USER_AGENT: &str = concat!("sluice/", env!("CARGO_PKG_VERSION"));

/// Whatever DeepSeek answered, status and raw body, before the relay decides
/// what to do with it. An `Err` from [`DeepSeekClient::chat_completions`]
/// means the request never produced an HTTP status at all.
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

pub struct DeepSeekClient {
    http: reqwest::Client,
    base_url: String,
}

impl DeepSeekClient {
    pub fn new(base_url: String) -> Result<Self, Error> {
        // HTTP/1.1 with TLS peer verification, reqwest's default
        let http = reqwest::Client::builder()
            .http1_only()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(DeepSeekClient { http, base_url })
    }

    pub async fn chat_completions(
        &self,
        payload: &CompletionPayload,
        api_key: &str,
        timeout: Duration,
    ) -> Result<UpstreamResponse, reqwest::Error> {
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {}", api_key))
            .timeout(timeout)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        Ok(UpstreamResponse { status, body })
    }
}
