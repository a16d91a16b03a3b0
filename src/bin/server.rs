//! Game server binary.
//!
//! Runs the HTTP server for hosting live matches, with WebSocket
//! connections for real-time play.

use anyhow::Context;
use fenyflow::server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string());
    Server::run(&addr)
        .await
        .with_context(|| format!("server failed on {addr}"))
}
