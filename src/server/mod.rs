pub mod api;
pub mod sse;

use crate::cli::Args;
use crate::llm::chat::new_client;
use crate::llm::LlmConfig;
use api::AppState;
use log::{ info, warn };
use std::error::Error;
use std::net::SocketAddr;

pub struct Server {
    addr: String,
    args: Args,
}

impl Server {
    pub fn new(addr: String, args: Args) -> Self {
        Self { addr, args }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let addr = self.addr.parse::<SocketAddr>()
            .map_err(|e| format!("Invalid server address '{}': {}", self.addr, e))?;

        let config = LlmConfig::from_args(&self.args);
        if config.api_key.is_none() {
            warn!("SECRET_OPENAI_KEY is not set; completion requests will answer with an error stream.");
        }

        let chat_client = new_client(&config)?;
        info!("Relaying to {} with model {}", chat_client.get_base_url(), chat_client.get_model());

        let state = AppState::new(chat_client, self.args.rate_limit_per_second);
        api::start_http_server(addr, state, &self.args).await
    }
}
