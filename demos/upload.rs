//! Uploads a file over the chat socket as a base64 `file` frame.
//!
//! ```sh
//! CHAT_WS_URL=ws://localhost:8000/ws/chat/ cargo run --example upload -- ./notes.txt text/plain
//! ```

use std::env;
use std::time::Duration;

use anyhow::Context as _;
use chat_socket_client::message::FileAttachment;
use chat_socket_client::session::FileStore;
use chat_socket_client::ws::ConnectionManager;
use tracing::info;

/// Chat endpoint, for example `ws://localhost:8000/ws/chat/`.
const ENDPOINT_VAR: &str = "CHAT_WS_URL";

/// Where the session id is persisted between runs.
const SESSION_FILE_VAR: &str = "CHAT_SESSION_FILE";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = env::args().skip(1);
    let path = args.next().context("usage: upload <path> [mime-type]")?;
    let content_type = args.next();

    let endpoint =
        env::var(ENDPOINT_VAR).unwrap_or_else(|_| "ws://localhost:8000/ws/chat/".to_owned());
    let session_file =
        env::var(SESSION_FILE_VAR).unwrap_or_else(|_| ".chat/session.json".to_owned());

    let connection = ConnectionManager::new(&endpoint, &FileStore::new(session_file))?;
    let mut replies = connection.subscribe();

    connection.connect().await?;

    let file = FileAttachment::from_path(&path, content_type.as_deref());
    info!(file_name = %file.name, file_type = %file.content_type, "Uploading");
    connection.send(file).await?;

    if let Ok(Ok(reply)) = tokio::time::timeout(Duration::from_secs(10), replies.recv()).await {
        info!(%reply, "Server replied");
    }

    connection.disconnect();
    Ok(())
}
