pub mod openai;

use async_trait::async_trait;
use axum::body::Bytes;
use futures::Stream;
use std::error::Error as StdError;
use std::pin::Pin;
use std::sync::Arc;
use super::{ LlmConfig, RelayError };
use self::openai::OpenAIChatClient;

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, Box<dyn StdError + Send + Sync>>> + Send>>;

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Opens a streaming completion for `prompt` and hands back the raw upstream body.
    ///
    /// Resolves once response headers arrive; the body has not been read yet.
    async fn stream_chat(&self, prompt: &str) -> Result<ByteStream, RelayError>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> String;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
    let client: Arc<dyn ChatClient> = Arc::new(OpenAIChatClient::from_config(config)?);
    Ok(client)
}
