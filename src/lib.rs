pub mod models;
pub mod server;
pub mod llm;
pub mod cli;
pub mod toast;

use cli::Args;
use log::info;
use server::Server;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat Base URL: {}", args.chat_base_url);
    info!("Chat Model: {}", args.chat_model);
    info!("API Key: {}", if args.openai_api_key.as_deref().is_some_and(|k| !k.trim().is_empty()) { "set" } else { "NOT SET" });
    info!("Connect Timeout: {}s", args.connect_timeout_secs);
    info!("Response Timeout: {}s", args.response_timeout_secs);
    info!("Rate Limit: {}/s", args.rate_limit_per_second);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let server = Server::new(args.server_addr.clone(), args);
    server.run().await?;

    Ok(())
}
