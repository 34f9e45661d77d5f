use clap::Parser;
use crate::llm::{ DEFAULT_CHAT_MODEL, DEFAULT_CHAT_URL, DEFAULT_SYSTEM_PROMPT };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Upstream Chat Provider Args ---
    /// API key presented to the chat completion provider as a bearer token.
    /// Requests are answered with an in-stream error while this is unset.
    #[arg(long, env = "SECRET_OPENAI_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Full URL of the upstream chat completions endpoint
    #[arg(long, env = "CHAT_BASE_URL", default_value = DEFAULT_CHAT_URL)]
    pub chat_base_url: String,

    /// Model name sent with every completion request (e.g., gpt-4o-mini, gpt-4o)
    #[arg(long, env = "CHAT_MODEL", default_value = DEFAULT_CHAT_MODEL)]
    pub chat_model: String,

    /// System instruction prepended to every prompt.
    #[arg(long, env = "SYSTEM_PROMPT", default_value = DEFAULT_SYSTEM_PROMPT)]
    pub system_prompt: String,

    /// Seconds allowed for establishing the upstream connection.
    #[arg(long, env = "CONNECT_TIMEOUT_SECS", default_value = "10")]
    pub connect_timeout_secs: u64,

    /// Seconds allowed for the upstream to answer with response headers.
    /// The streamed body itself is not time-limited.
    #[arg(long, env = "RESPONSE_TIMEOUT_SECS", default_value = "60")]
    pub response_timeout_secs: u64,

    // --- General App Args ---
    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:4000")]
    pub server_addr: String,

    /// Maximum relay requests accepted per second across all clients. 0 disables the limit.
    #[arg(long, env = "RATE_LIMIT_PER_SECOND", default_value = "10")]
    pub rate_limit_per_second: u32,

    /// Optional path to the TLS certificate file (PEM format) for serving HTTPS. Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for serving HTTPS. Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}
