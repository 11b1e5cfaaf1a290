use std::convert::Infallible;
use std::sync::Arc;

use anyhow::Error;
use http_body_util::BodyExt;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::body::Incoming;
use hyper::header::{self, HeaderValue};
use hyper::{Method, Request, Response, StatusCode};

use args::{Args, SubCommands};
use clap::Parser;
use handler::completions::{handle_completion, RelayState};
use models::ErrorEnvelope;
use repos::config::SluiceConfig;
use tracing::{error, info};

mod args;
mod clients;
mod commands;
mod handler;
mod models;
mod repos;
mod utils;

fn is_chat_request(path: &str) -> bool {
    path.contains("/chat/completions")
}

/// Every response carries the JSON content type and the CORS policy,
/// error envelopes and preflight replies included.
fn relay_response(status: StatusCode, body: Bytes, origin: &str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_str(origin).unwrap_or_else(|_| HeaderValue::from_static("*")),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    response
}

pub async fn handle(
    state: Arc<RelayState>,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    info!("Received request: {} {}", req.method(), req.uri().path());
    let origin = state.config.cors_allow_origin();

    let (status, body) = match (req.method(), req.uri().path()) {
        // CORS preflight
        (&Method::OPTIONS, _) => (StatusCode::OK, Bytes::new()),

        (&Method::POST, path) if is_chat_request(path) => {
            match req.into_body().collect().await {
                Ok(collected) => {
                    let whole_body = collected.to_bytes();
                    match handle_completion(&state, whole_body).await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            error!("Error handling request: {}", e);
                            (
                                StatusCode::INTERNAL_SERVER_ERROR,
                                ErrorEnvelope::bytes(format!("Server error: {}", e)),
                            )
                        }
                    }
                }
                Err(e) => {
                    error!("Error reading request body: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorEnvelope::bytes(format!("Server error: {}", e)),
                    )
                }
            }
        }

        _ => (StatusCode::NOT_FOUND, ErrorEnvelope::bytes("Not Found")),
    };

    Ok(relay_response(status, body, &origin))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "sluice=info".to_string()))
        .init();
    let args = Args::parse();
    let config = SluiceConfig::load();
    let state = Arc::new(RelayState::new(config)?);
    match args.subcmd {
        // A bare `sluice` starts the relay as well
        Some(SubCommands::Start(_)) | None => {
            commands::start::run(state).await?;
        }
    };
    Ok(())
}
