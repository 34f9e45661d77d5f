use crate::cli::Args;
use crate::llm::chat::ChatClient;
use crate::llm::RelayError;
use super::sse::{ error_stream_response, event_stream };
use std::error::Error;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use axum::{
    body::Body,
    routing::get,
    Router,
    extract::{ State, Query },
    response::Response,
};
use governor::{ DefaultDirectRateLimiter, Quota, RateLimiter };
use serde::Deserialize;
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, warn, error };

pub const DEFAULT_PROMPT: &str = "Hello";

#[derive(Deserialize)]
pub struct CompletionParams {
    pub prompt: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    chat_client: Arc<dyn ChatClient>,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl AppState {
    pub fn new(chat_client: Arc<dyn ChatClient>, rate_limit_per_second: u32) -> Self {
        let limiter = NonZeroU32::new(rate_limit_per_second).map(|rate| {
            Arc::new(RateLimiter::direct(Quota::per_second(rate)))
        });
        Self { chat_client, limiter }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/openai", get(completion_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_http_server(
    addr: SocketAddr,
    state: AppState,
    args: &Args,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let app = router(state);

    if args.enable_tls {
        let (cert_path, key_path) = match (&args.tls_cert_path, &args.tls_key_path) {
            (Some(cert_path), Some(key_path)) => (cert_path, key_path),
            (Some(_), None) | (None, Some(_)) => {
                error!("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.");
                return Err("Missing TLS certificate or key path".into());
            }
            (None, None) => {
                error!("--enable-tls was set but no certificate/key paths provided.");
                return Err("TLS enabled without cert/key".into());
            }
        };

        info!("TLS enabled. Loading certificate from '{}' and key from '{}'", cert_path, key_path);
        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(cert_path, key_path).await?;

        info!("HTTPS server listening on: https://{}", addr);
        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await?;
    } else {
        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            error!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e);
            e
        })?;

        info!("HTTP server listening on: http://{}", addr);
        axum::serve(listener, app.into_make_service()).await?;
    }

    Ok(())
}

/// Relays a streaming completion for `?prompt=` back to the caller.
///
/// Always answers 200 with an event stream. On success the upstream body is passed
/// through untouched; on any failure the body is the two-frame error stream.
async fn completion_handler(
    State(state): State<AppState>,
    Query(params): Query<CompletionParams>,
) -> Response {
    let prompt = params.prompt.filter(|p| !p.is_empty()).unwrap_or_else(|| DEFAULT_PROMPT.to_string());

    match relay(&state, &prompt).await {
        Ok(response) => response,
        Err(e) => {
            error!("API Error: {}", e);
            error_stream_response(&e.user_message())
        }
    }
}

async fn relay(state: &AppState, prompt: &str) -> Result<Response, RelayError> {
    if let Some(limiter) = &state.limiter {
        if limiter.check().is_err() {
            warn!("Relay request rejected by rate limiter");
            return Err(RelayError::RateLimited);
        }
    }

    let upstream = state.chat_client.stream_chat(prompt).await?;
    Ok(event_stream(Body::from_stream(upstream)))
}
