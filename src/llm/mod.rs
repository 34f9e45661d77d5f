pub mod chat;

use crate::cli::Args;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Your name is GPT-4";
pub const GENERIC_FAILURE: &str = "There was an error processing your request";

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub completion_model: String,
    pub base_url: String,
    pub system_prompt: String,
    pub connect_timeout: Duration,
    pub response_timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            completion_model: DEFAULT_CHAT_MODEL.to_string(),
            base_url: DEFAULT_CHAT_URL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            connect_timeout: Duration::from_secs(10),
            response_timeout: Duration::from_secs(60),
        }
    }
}

impl LlmConfig {
    pub fn from_args(args: &Args) -> Self {
        Self {
            api_key: args.openai_api_key.clone().filter(|k| !k.trim().is_empty()),
            completion_model: args.chat_model.clone(),
            base_url: args.chat_base_url.clone(),
            system_prompt: args.system_prompt.clone(),
            connect_timeout: Duration::from_secs(args.connect_timeout_secs),
            response_timeout: Duration::from_secs(args.response_timeout_secs),
        }
    }
}

/// Every way a relay request can fail before upstream bytes start flowing.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("OPENAI_KEY env variable not set")]
    ConfigMissing,

    #[error("no messages provided")]
    NoMessages,

    #[error("request rate limit exceeded")]
    RateLimited,

    #[error("upstream rejected request with status {status}: {message} ({error_type})")]
    UpstreamRejected {
        status: u16,
        message: String,
        error_type: String,
    },

    #[error("upstream did not respond within {secs}s")]
    Timeout {
        secs: u64,
    },

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl RelayError {
    /// Text shown to the client inside the error stream.
    pub fn user_message(&self) -> String {
        match self {
            RelayError::ConfigMissing | RelayError::NoMessages => self.to_string(),
            RelayError::RateLimited => RATE_LIMIT_MESSAGE.to_string(),
            RelayError::UpstreamRejected { message, error_type, .. } => {
                friendly_upstream_message(message, error_type)
            }
            RelayError::Timeout { secs } => format!("Upstream did not respond within {}s", secs),
            RelayError::Transport(_) => GENERIC_FAILURE.to_string(),
        }
    }
}

const INVALID_KEY_MESSAGE: &str = "Invalid API key. Please check your SECRET_OPENAI_KEY in .env file.";
const QUOTA_MESSAGE: &str = "Insufficient quota. Please add credits to your OpenAI account.";
const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again in a moment.";

/// Rewords the common provider rejections. Matching is case-sensitive and the
/// first matching rule wins; anything else passes through unchanged.
pub fn friendly_upstream_message(message: &str, error_type: &str) -> String {
    if message.contains("Invalid API key") || message.contains("incorrect API key") {
        INVALID_KEY_MESSAGE.to_string()
    } else if message.contains("insufficient_quota") || error_type == "insufficient_quota" {
        QUOTA_MESSAGE.to_string()
    } else if message.contains("rate_limit") {
        RATE_LIMIT_MESSAGE.to_string()
    } else {
        message.to_string()
    }
}
