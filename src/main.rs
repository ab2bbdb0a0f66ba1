//! CLI for livecomments
//!
//! Subcommands:
//! - `server`: run the WebSocket endpoint
//! - `listen`: subscribe to one post and print its comment events (smoke tests)

use std::sync::Arc;

use clap::Parser;
use futures_util::StreamExt;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{error, info, warn};

use livecomments::config::load_config;
use livecomments::hub::{CommentEvent, Hub};
use livecomments::transport::start_websocket_server;
use livecomments::utils::logging;

#[derive(Parser)]
#[command(name = "livecomments")]
enum Command {
    /// Start the WebSocket server
    Server,
    /// Subscribe to a post's comments and print every event received
    Listen {
        /// Base WebSocket URL of the server
        #[arg(long, default_value = "ws://127.0.0.1:8080")]
        url: String,
        /// Post whose comments to follow
        #[arg(long)]
        post: i64,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cmd = Command::parse();

    match cmd {
        Command::Server => {
            if let Err(e) = run_server().await {
                // Config may have failed before the configured level was applied.
                logging::init("info");
                error!("Server failed: {}", e);
            }
        }
        Command::Listen { url, post } => {
            logging::init("info");
            if let Err(e) = run_listener(&url, post).await {
                error!("Listener failed: {}", e);
            }
        }
    }
}

async fn run_server() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    logging::init(&config.logging.level);

    let hub = Arc::new(Hub::new(&config.hub));

    tokio::select! {
        result = start_websocket_server(config.server.addr(), hub, config.hub.clone()) => {
            result?;
            error!("WebSocket server exited unexpectedly.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    Ok(())
}

async fn run_listener(url: &str, post: i64) -> Result<(), Box<dyn std::error::Error>> {
    let endpoint = format!("{}/comments/{post}", url.trim_end_matches('/'));
    let (mut ws_stream, _response) = connect_async(endpoint.as_str()).await?;
    info!("Listening on {endpoint}");

    while let Some(frame) = ws_stream.next().await {
        match frame? {
            WsMessage::Text(text) => match serde_json::from_str::<CommentEvent>(text.as_str()) {
                Ok(event) => println!("{event:?}"),
                Err(e) => warn!("Unrecognised event {}: {e}", text.as_str()),
            },
            WsMessage::Close(_) => break,
            _ => {}
        }
    }

    info!("Server closed the subscription");
    Ok(())
}
