use serde::{ Serialize, Deserialize };
use serde_json::Value as JsonValue;

pub const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub stream: bool,
}

/// Message and type tag pulled out of an upstream error body.
///
/// Providers answer rejected requests with `{"error": {"message", "type"}}`, but the
/// body is read loosely: a bare string under `error` is accepted as the message, and
/// anything unreadable falls back to [`UNKNOWN_ERROR`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpstreamErrorBody {
    pub message: String,
    pub error_type: String,
}

impl UpstreamErrorBody {
    pub fn parse(body: &[u8]) -> Self {
        match serde_json::from_slice::<JsonValue>(body) {
            Ok(value) => Self::from_value(&value),
            Err(_) => Self::unknown(),
        }
    }

    fn from_value(value: &JsonValue) -> Self {
        let error = value.get("error");

        let message = error
            .and_then(|e| e.get("message"))
            .and_then(JsonValue::as_str)
            .filter(|m| !m.is_empty())
            .or_else(|| error.and_then(JsonValue::as_str).filter(|m| !m.is_empty()))
            .unwrap_or(UNKNOWN_ERROR)
            .to_string();

        let error_type = error
            .and_then(|e| e.get("type"))
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string();

        Self { message, error_type }
    }

    fn unknown() -> Self {
        Self { message: UNKNOWN_ERROR.to_string(), error_type: String::new() }
    }
}
