//! Connects to a chat server, prints every server event and sends a greeting.
//!
//! The session id is kept in `CHAT_SESSION_FILE` (default `.chat/session.json`), so
//! running this twice resumes the same conversation.
//!
//! ```sh
//! CHAT_WS_URL=ws://localhost:8000/ws/chat/ RUST_LOG=debug cargo run --example chat -- "Hello!"
//! ```

use std::env;
use std::time::Duration;

use chat_socket_client::message::{ChatMessage, ServerEvent};
use chat_socket_client::session::FileStore;
use chat_socket_client::ws::{ConnectionManager, ConnectionState, handler};
use futures::StreamExt as _;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Chat endpoint, for example `ws://localhost:8000/ws/chat/`.
const ENDPOINT_VAR: &str = "CHAT_WS_URL";

/// Where the session id is persisted between runs.
const SESSION_FILE_VAR: &str = "CHAT_SESSION_FILE";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let endpoint =
        env::var(ENDPOINT_VAR).unwrap_or_else(|_| "ws://localhost:8000/ws/chat/".to_owned());
    let session_file =
        env::var(SESSION_FILE_VAR).unwrap_or_else(|_| ".chat/session.json".to_owned());
    let text = env::args().nth(1).unwrap_or_else(|| "Hello!".to_owned());

    let store = FileStore::new(session_file);
    let connection = ConnectionManager::new(&endpoint, &store)?;
    info!(session_id = %connection.session_id(), endpoint = %connection.endpoint());

    connection.on_message(handler(|message| match ServerEvent::from_value(message) {
        Some(ServerEvent::Message { message }) => info!(event = "message", %message),
        Some(ServerEvent::Typing { is_typing }) => debug!(event = "typing", is_typing),
        Some(ServerEvent::Error { message }) => warn!(event = "error", %message),
        _ => debug!(event = "unknown", %message),
    }));

    let mut states = connection.state_receiver();
    tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state: ConnectionState = *states.borrow_and_update();
            debug!(?state, "Connection state changed");
        }
    });

    connection.connect().await?;
    connection.send(ChatMessage::text(text)).await?;

    // Keep listening until the server goes quiet.
    let mut replies = Box::pin(connection.messages());
    while let Ok(Some(reply)) = timeout(Duration::from_secs(30), replies.next()).await {
        if let Err(e) = reply {
            warn!(error = %e, "Missed replies");
        }
    }

    connection.disconnect();
    Ok(())
}
