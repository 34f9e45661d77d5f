use async_trait::async_trait;
use futures::TryStreamExt;
use log::{ info, warn };
use reqwest::Client as HttpClient;
use std::error::Error as StdError;
use std::time::Duration;

use super::{ ByteStream, ChatClient };
use crate::llm::{ LlmConfig, RelayError };
use crate::models::chat::{ ChatCompletionRequest, ChatMessage, UpstreamErrorBody };

const TEMPERATURE: f32 = 0.0;

pub struct OpenAIChatClient {
    http: HttpClient,
    api_key: Option<String>,
    model: String,
    base_url: String,
    system_prompt: String,
    response_timeout: Duration,
}

impl OpenAIChatClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let http = HttpClient::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.completion_model.clone(),
            base_url: config.base_url.clone(),
            system_prompt: config.system_prompt.clone(),
            response_timeout: config.response_timeout,
        })
    }

    pub fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(&self.system_prompt), ChatMessage::user(prompt)],
            temperature: TEMPERATURE,
            stream: true,
        }
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn stream_chat(&self, prompt: &str) -> Result<ByteStream, RelayError> {
        let api_key = self.api_key.as_deref().ok_or(RelayError::ConfigMissing)?;

        let req = self.build_request(prompt);
        if req.messages.is_empty() {
            return Err(RelayError::NoMessages);
        }

        let pending = self.http.post(&self.base_url).bearer_auth(api_key).json(&req).send();
        let resp = tokio::time::timeout(self.response_timeout, pending)
            .await
            .map_err(|_| RelayError::Timeout { secs: self.response_timeout.as_secs() })??;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.bytes().await.unwrap_or_default();
            let parsed = UpstreamErrorBody::parse(&body);
            return Err(RelayError::UpstreamRejected {
                status: status.as_u16(),
                message: parsed.message,
                error_type: parsed.error_type,
            });
        }

        info!("Upstream {} accepted stream request ({})", self.model, status);
        let body = resp.bytes_stream().map_err(|e| {
            warn!("Upstream stream broke off mid-relay: {}", e);
            Box::new(e) as Box<dyn StdError + Send + Sync>
        });
        Ok(Box::pin(body))
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> String {
        self.base_url.clone()
    }
}
