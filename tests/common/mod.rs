#![allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    reason = "Do not need additional syntax for setting up tests"
)]
#![allow(
    unused,
    reason = "Not every test binary uses every helper"
)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chat_socket_client::ws::config::{Config, ReconnectConfig};
use futures_util::{SinkExt as _, StreamExt as _};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

pub const PATH: &str = "/ws/chat/";

/// How long helpers wait for something that is expected to happen.
pub const WAIT: Duration = Duration::from_secs(3);

/// Server-side commands fanned out to every live connection.
#[derive(Clone, Debug)]
enum Command {
    Text(String),
    Close,
}

/// Mock chat server.
pub struct MockWsServer {
    addr: SocketAddr,
    /// Broadcast commands to ALL connected clients
    command_tx: broadcast::Sender<Command>,
    /// Request URI of each accepted connection, sent once it is ready to receive commands
    connection_rx: mpsc::UnboundedReceiver<String>,
    /// Text frames received from clients
    frame_rx: mpsc::UnboundedReceiver<String>,
}

impl MockWsServer {
    /// Start a mock server on a random port.
    pub async fn start() -> Self {
        Self::start_with(false).await
    }

    /// Start a server that completes handshakes and then never reads, so PINGs go unanswered.
    pub async fn start_silent() -> Self {
        Self::start_with(true).await
    }

    async fn start_with(silent: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (command_tx, _) = broadcast::channel::<Command>(100);
        let (connection_tx, connection_rx) = mpsc::unbounded_channel::<String>();
        let (frame_tx, frame_rx) = mpsc::unbounded_channel::<String>();

        let broadcast_tx = command_tx.clone();

        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };

                let uri = Arc::new(Mutex::new(String::new()));
                let uri_slot = Arc::clone(&uri);
                let callback = move |request: &Request,
                                     response: Response|
                      -> Result<Response, ErrorResponse> {
                    *uri_slot.lock().unwrap() = request.uri().to_string();
                    Ok(response)
                };

                let Ok(ws_stream) = tokio_tungstenite::accept_hdr_async(stream, callback).await
                else {
                    continue;
                };

                let mut command_rx = broadcast_tx.subscribe();
                let uri = uri.lock().unwrap().clone();
                drop(connection_tx.send(uri));

                if silent {
                    tokio::spawn(async move {
                        let _held = ws_stream;
                        tokio::time::sleep(Duration::from_secs(60)).await;
                    });
                    continue;
                }

                let (mut write, mut read) = ws_stream.split();
                let frame_tx = frame_tx.clone();

                tokio::spawn(async move {
                    loop {
                        tokio::select! {
                            msg = read.next() => {
                                match msg {
                                    Some(Ok(Message::Text(text))) => {
                                        drop(frame_tx.send(text.to_string()));
                                    }
                                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                                    Some(Ok(_)) => {}
                                }
                            }
                            command = command_rx.recv() => {
                                match command {
                                    Ok(Command::Text(text)) => {
                                        if write.send(Message::Text(text.into())).await.is_err() {
                                            break;
                                        }
                                    }
                                    Ok(Command::Close) => {
                                        drop(write.send(Message::Close(None)).await);
                                        break;
                                    }
                                    Err(_) => break,
                                }
                            }
                        }
                    }
                });
            }
        });

        Self {
            addr,
            command_tx,
            connection_rx,
            frame_rx,
        }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}{}", self.addr, PATH)
    }

    /// Send a text frame to all connected clients.
    pub fn send(&self, text: &str) {
        drop(self.command_tx.send(Command::Text(text.to_owned())));
    }

    /// Close every live connection from the server side.
    pub fn close_all(&self) {
        drop(self.command_tx.send(Command::Close));
    }

    /// Request URI of the next accepted connection.
    pub async fn next_connection(&mut self) -> Option<String> {
        self.next_connection_within(WAIT).await
    }

    pub async fn next_connection_within(&mut self, limit: Duration) -> Option<String> {
        timeout(limit, self.connection_rx.recv()).await.ok().flatten()
    }

    /// Next text frame sent by a client.
    pub async fn next_frame(&mut self) -> Option<String> {
        self.next_frame_within(WAIT).await
    }

    pub async fn next_frame_within(&mut self, limit: Duration) -> Option<String> {
        timeout(limit, self.frame_rx.recv()).await.ok().flatten()
    }
}

/// An address nothing listens on.
pub async fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{addr}{PATH}")
}

/// An address that accepts TCP connections but never answers the WebSocket handshake.
pub async fn stalled_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    format!("ws://{addr}{PATH}")
}

/// Fast reconnects so tests do not wait out the production delay.
#[must_use]
pub fn config() -> Config {
    let mut config = Config::default();
    config.reconnect = ReconnectConfig::fixed(Duration::from_millis(50));
    config.handshake_timeout = Some(Duration::from_secs(2));
    config
}
