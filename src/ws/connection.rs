#![expect(
    clippy::module_name_repetitions,
    reason = "Connection types expose their domain in the name for clarity"
)]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use async_stream::try_stream;
use backoff::ExponentialBackoff;
use backoff::backoff::Backoff as _;
use futures::{SinkExt as _, Stream, StreamExt as _};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Notify, broadcast, mpsc, oneshot, watch};
use tokio::time::{interval, sleep, timeout};
use tokio_tungstenite::tungstenite::{Bytes, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use super::config::Config;
use super::error::WsError;
use super::handler::{HandlerRegistry, MessageHandler};
use super::traits::{JsonParser, MessageParser};
use crate::error::{Error, Kind};
use crate::message::OutboundMessage;
use crate::session::{SessionId, SessionStore};
use crate::Result;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Query parameter carrying the session identifier.
pub const SESSION_QUERY_PARAM: &str = "session_id";

/// How long to wait for the peer to acknowledge a requested close.
const CLOSE_GRACE_DURATION: Duration = Duration::from_secs(1);

/// Connection state tracking.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No attempt has started yet
    Disconnected,
    /// Handshake in progress
    Connecting {
        /// Consecutive failed handshakes before this one
        attempt: u32,
    },
    /// Handshake completed, frames flow both ways
    Open {
        /// When the connection was established
        since: Instant,
    },
    /// A requested close is in progress
    Closing,
    /// No transport; the manager is stopped or about to schedule a retry
    Closed,
    /// Waiting out the delay before the next attempt
    Reconnecting {
        /// Consecutive failed handshakes so far
        attempt: u32,
        /// Delay before the next attempt starts
        delay: Duration,
    },
}

impl ConnectionState {
    /// Check if the connection is currently open.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open { .. })
    }
}

/// Signals from the heartbeat task to the frame pump.
enum Beat {
    Ping,
    Expired,
}

/// Why an open connection ended without a transport error.
#[derive(Debug)]
enum Closure {
    Requested,
    Remote,
}

/// Owns one logical chat connection: the session identity, the live transport, the
/// reconnect policy and the handler registry.
///
/// Construction resolves the session id from the given [`SessionStore`], appends it to the
/// endpoint as `?session_id=<id>` and starts connecting in the background. Whenever the
/// transport closes for any reason other than [`disconnect`](Self::disconnect), a new
/// attempt is scheduled after the configured delay (3 seconds by default).
///
/// At most one transport exists per manager. Cloning the manager yields another handle to
/// the same connection; dropping every handle stops the background task. Handlers that need
/// to reply should capture a [`WeakConnectionManager`] from [`downgrade`](Self::downgrade),
/// since a strong clone stored in the registry keeps the connection alive forever.
///
/// # Example
///
/// ```rust, no_run
/// use chat_socket_client::message::ChatMessage;
/// use chat_socket_client::session::FileStore;
/// use chat_socket_client::ws::{ConnectionManager, handler};
///
/// # async fn example() -> chat_socket_client::Result<()> {
/// let store = FileStore::new("session.json");
/// let connection = ConnectionManager::new("wss://chat.example.com/ws/chat/", &store)?;
///
/// connection.on_message(handler(|message| println!("{message}")));
/// connection.connect().await?;
/// connection.send(ChatMessage::text("Hello!")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

/// A non-owning handle to a [`ConnectionManager`].
///
/// Does not keep the background task alive. Capture this in message handlers instead of a
/// strong clone.
#[derive(Clone)]
pub struct WeakConnectionManager {
    inner: Weak<Inner>,
}

impl WeakConnectionManager {
    /// The manager, if any strong handle still exists.
    #[must_use]
    pub fn upgrade(&self) -> Option<ConnectionManager> {
        self.inner.upgrade().map(|inner| ConnectionManager { inner })
    }
}

struct Inner {
    shared: Arc<Shared>,
    /// Disconnect intent. Dropped with the last handle, which the loop also treats as a stop.
    stop_tx: watch::Sender<bool>,
    runtime: Handle,
}

/// State shared with the background connection loop.
struct Shared {
    endpoint: Url,
    session_id: SessionId,
    config: Config,
    parser: Box<dyn MessageParser>,
    state_tx: watch::Sender<ConnectionState>,
    broadcast_tx: broadcast::Sender<Value>,
    handlers: HandlerRegistry,
    link: Mutex<Link>,
    /// Cuts a reconnect delay short when the host asks to connect.
    retry: Notify,
}

/// Fields mutated by both the host and the loop, guarded by one lock.
#[derive(Default)]
struct Link {
    running: bool,
    outbound: Option<mpsc::UnboundedSender<String>>,
    waiters: Vec<oneshot::Sender<Result<()>>>,
}

impl ConnectionManager {
    /// Create a manager with the default [`Config`] and start connecting.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new<S: SessionStore + ?Sized>(base_url: &str, store: &S) -> Result<Self> {
        Self::with_config(base_url, Config::default(), store)
    }

    /// Create a manager with a custom [`Config`] and start connecting.
    pub fn with_config<S: SessionStore + ?Sized>(
        base_url: &str,
        config: Config,
        store: &S,
    ) -> Result<Self> {
        Self::with_parser(base_url, config, store, JsonParser)
    }

    /// Create a manager with a custom inbound [`MessageParser`] and start connecting.
    pub fn with_parser<S, P>(base_url: &str, config: Config, store: &S, parser: P) -> Result<Self>
    where
        S: SessionStore + ?Sized,
        P: MessageParser,
    {
        let runtime = Handle::try_current().map_err(|e| Error::with_source(Kind::Internal, e))?;
        let session_id = SessionId::resolve(store)?;
        let endpoint = connection_url(base_url, &session_id)?;

        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        let (broadcast_tx, _) = broadcast::channel(config.message_capacity.max(1));
        let (stop_tx, _) = watch::channel(false);

        #[cfg(feature = "tracing")]
        tracing::debug!(%endpoint, %session_id, "Creating WebSocket connection manager");

        let manager = Self {
            inner: Arc::new(Inner {
                shared: Arc::new(Shared {
                    endpoint,
                    session_id,
                    config,
                    parser: Box::new(parser),
                    state_tx,
                    broadcast_tx,
                    handlers: HandlerRegistry::default(),
                    link: Mutex::new(Link::default()),
                    retry: Notify::new(),
                }),
                stop_tx,
                runtime,
            }),
        };

        {
            let mut link = manager.inner.shared.lock_link();
            manager.spawn_loop(&mut link);
        }

        Ok(manager)
    }

    fn spawn_loop(&self, link: &mut Link) {
        link.running = true;
        let shared = Arc::clone(&self.inner.shared);
        let stop_rx = self.inner.stop_tx.subscribe();
        self.inner
            .runtime
            .spawn(async move { connection_loop(shared, stop_rx).await });
    }

    /// (Re)establish the transport.
    ///
    /// Resolves once the connection is open, or fails if the next handshake fails. The
    /// outcome reflects a single attempt only: automatic reconnection keeps running after a
    /// failure. Clears any earlier [`disconnect`](Self::disconnect) request. Never starts a
    /// second concurrent attempt; if one is in flight this waits for it, and if a reconnect
    /// delay is pending it is cut short.
    pub async fn connect(&self) -> Result<()> {
        let outcome = {
            self.inner.stop_tx.send_replace(false);

            let mut link = self.inner.shared.lock_link();
            let state = *self.inner.shared.state_tx.borrow();
            if state.is_open() {
                return Ok(());
            }

            let (tx, rx) = oneshot::channel();
            link.waiters.push(tx);

            if !link.running {
                self.spawn_loop(&mut link);
            } else if matches!(
                state,
                ConnectionState::Reconnecting { .. }
                    | ConnectionState::Closed
                    | ConnectionState::Closing
            ) {
                self.inner.shared.retry.notify_one();
            }

            rx
        };

        outcome
            .await
            .unwrap_or_else(|_e| Err(WsError::ConnectionClosed.into()))
    }

    /// Close the transport and stop reconnecting.
    ///
    /// An open connection receives a close frame; a pending handshake or reconnect delay is
    /// abandoned. Pending [`connect`](Self::connect) calls fail with
    /// [`WsError::ConnectionClosed`]. Call [`connect`](Self::connect) to start again.
    pub fn disconnect(&self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(endpoint = %self.inner.shared.endpoint, "Disconnect requested");

        self.inner.stop_tx.send_replace(true);
        let waiters = {
            let mut link = self.inner.shared.lock_link();
            link.outbound = None;
            std::mem::take(&mut link.waiters)
        };
        fail_waiters(waiters, || WsError::ConnectionClosed);
    }

    /// Send one message over the open connection.
    ///
    /// JSON payloads are serialized and queued immediately. File payloads are read and
    /// base64-encoded first, then queued as one [`FileFrame`](crate::message::FileFrame).
    /// Each call transmits at most once and never retries.
    ///
    /// Fails with [`WsError::NotConnected`] (see [`Error::is_not_connected`]) when the
    /// connection is not open, both before and after a file is encoded.
    pub async fn send<M: Into<OutboundMessage>>(&self, message: M) -> Result<()> {
        match message.into() {
            OutboundMessage::Json(value) => {
                let text = serde_json::to_string(&value)?;
                self.transmit(text)
            }
            OutboundMessage::File(file) => {
                if !self.state().is_open() {
                    return Err(not_connected());
                }

                #[cfg(feature = "tracing")]
                tracing::debug!(file_name = %file.name, file_type = %file.content_type, "Encoding file for upload");

                let frame = file.encode().await?;
                let text = serde_json::to_string(&frame)?;
                self.transmit(text)
            }
        }
    }

    fn transmit(&self, text: String) -> Result<()> {
        let link = self.inner.shared.lock_link();
        let Some(outbound) = link.outbound.as_ref() else {
            return Err(not_connected());
        };
        if !self.inner.shared.state_tx.borrow().is_open() {
            return Err(not_connected());
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(%text, "Queueing WebSocket text message");

        outbound.send(text).map_err(|_e| not_connected())
    }

    /// Register `handler` to run for every inbound message, after those registered earlier.
    ///
    /// The same handler may be registered more than once and then runs once per
    /// registration.
    pub fn on_message(&self, handler: MessageHandler) {
        self.inner.shared.handlers.push(handler);
    }

    /// Remove the first registration of `handler`, compared by identity.
    ///
    /// Returns `false` if it was not registered.
    pub fn remove_message_handler(&self, handler: &MessageHandler) -> bool {
        self.inner.shared.handlers.remove(handler)
    }

    /// Number of handler registrations.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.inner.shared.handlers.len()
    }

    /// Subscribe to parsed inbound messages.
    ///
    /// Each call returns an independent receiver. Messages reach receivers after all
    /// registered handlers have run.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Value> {
        self.inner.shared.broadcast_tx.subscribe()
    }

    /// Stream of parsed inbound messages.
    ///
    /// Yields [`WsError::Lagged`] when the consumer falls more than
    /// [`Config::message_capacity`] messages behind.
    pub fn messages(&self) -> impl Stream<Item = Result<Value>> + use<> {
        let mut rx = self.subscribe();

        try_stream! {
            loop {
                match rx.recv().await {
                    Ok(message) => yield message,
                    Err(RecvError::Lagged(n)) => {
                        #[cfg(feature = "tracing")]
                        tracing::warn!("Message stream lagged, missed {n} messages");
                        Err(WsError::Lagged { count: n })?;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    /// Get the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.inner.shared.state_tx.borrow()
    }

    /// Subscribe to connection state changes.
    #[must_use]
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.inner.shared.state_tx.subscribe()
    }

    /// The session identifier sent with every connection attempt.
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.inner.shared.session_id
    }

    /// The full connection URL, including the session query parameter.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.shared.endpoint
    }

    /// A handle that does not keep the connection alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakConnectionManager {
        WeakConnectionManager {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

/// Build `<base_url>?session_id=<id>`, keeping any query the base already carries.
pub fn connection_url(base_url: &str, session_id: &SessionId) -> Result<Url> {
    let mut url = Url::parse(base_url)?;

    match url.scheme() {
        "ws" | "wss" => {}
        other => {
            return Err(Error::validation(format!(
                "unsupported scheme `{other}`, expected `ws` or `wss`"
            )));
        }
    }

    url.query_pairs_mut()
        .append_pair(SESSION_QUERY_PARAM, session_id.as_str());
    Ok(url)
}

fn not_connected() -> Error {
    #[cfg(feature = "tracing")]
    tracing::warn!("Cannot send message: WebSocket is not connected");

    WsError::NotConnected.into()
}

fn fail_waiters<F: Fn() -> WsError>(waiters: Vec<oneshot::Sender<Result<()>>>, error: F) {
    for waiter in waiters {
        _ = waiter.send(Err(error().into()));
    }
}

/// Whether the host asked to stop, or every handle is gone.
fn stop_now(stop_rx: &watch::Receiver<bool>) -> bool {
    stop_rx.has_changed().is_err() || *stop_rx.borrow()
}

async fn stop_requested(stop_rx: &mut watch::Receiver<bool>) {
    _ = stop_rx.wait_for(|stop| *stop).await;
}

impl Shared {
    fn lock_link(&self) -> MutexGuard<'_, Link> {
        // Every Link field is valid on its own, so a poisoned lock is recoverable.
        self.link.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: ConnectionState) {
        let _link = self.lock_link();
        self.state_tx.send_replace(state);
    }

    fn opened(&self, outbound: mpsc::UnboundedSender<String>) {
        let mut link = self.lock_link();
        link.outbound = Some(outbound);
        self.state_tx.send_replace(ConnectionState::Open {
            since: Instant::now(),
        });
        for waiter in link.waiters.drain(..) {
            _ = waiter.send(Ok(()));
        }
    }

    fn closed(&self) {
        let mut link = self.lock_link();
        link.outbound = None;
        self.state_tx.send_replace(ConnectionState::Closed);
    }

    fn handshake_failed(&self, error: &WsError) {
        let mut link = self.lock_link();
        self.state_tx.send_replace(ConnectionState::Closed);
        let waiters = std::mem::take(&mut link.waiters);
        fail_waiters(waiters, || match error {
            WsError::Timeout => WsError::Timeout,
            WsError::HandshakeFailed { reason } => WsError::HandshakeFailed {
                reason: reason.clone(),
            },
            other => WsError::HandshakeFailed {
                reason: other.to_string(),
            },
        });
    }

    /// Decide, under the lock, whether the loop exits. A concurrent `connect` either sees
    /// the loop still running or finds it gone and spawns a new one.
    fn finish_if_stopped(&self, stop_rx: &watch::Receiver<bool>, exhausted: bool) -> bool {
        let mut link = self.lock_link();
        if !stop_now(stop_rx) && !exhausted {
            return false;
        }

        link.running = false;
        link.outbound = None;
        self.state_tx.send_replace(ConnectionState::Closed);
        let waiters = std::mem::take(&mut link.waiters);
        fail_waiters(waiters, || WsError::ConnectionClosed);
        true
    }

    /// Parse one text frame and hand it to handlers, then to stream subscribers.
    fn deliver(&self, text: &str) {
        match self.parser.parse(text) {
            Ok(message) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(?message, "Parsed WebSocket message");

                self.handlers.dispatch(&message);
                _ = self.broadcast_tx.send(message);
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(%text, error = %e, "Dropping malformed WebSocket message");
                #[cfg(not(feature = "tracing"))]
                let _: (&&str, &WsError) = (&text, &e);
            }
        }
    }

    async fn handshake(&self) -> std::result::Result<WsStream, WsError> {
        let attempt = connect_async(self.endpoint.as_str());
        let result = match self.config.handshake_timeout {
            Some(limit) => timeout(limit, attempt)
                .await
                .map_err(|_e| WsError::Timeout)?,
            None => attempt.await,
        };

        result
            .map(|(ws_stream, _)| ws_stream)
            .map_err(|e| WsError::HandshakeFailed {
                reason: e.to_string(),
            })
    }
}

/// Main connection loop with automatic reconnection.
async fn connection_loop(shared: Arc<Shared>, mut stop_rx: watch::Receiver<bool>) {
    let mut attempt = 0_u32;
    let mut backoff: ExponentialBackoff = shared.config.reconnect.clone().into();

    loop {
        shared.set_state(ConnectionState::Connecting { attempt });

        let outcome = tokio::select! {
            outcome = shared.handshake() => Some(outcome),
            () = stop_requested(&mut stop_rx) => None,
        };

        match outcome {
            Some(Ok(ws_stream)) => {
                attempt = 0;
                backoff.reset();

                let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
                shared.opened(outbound_tx);

                #[cfg(feature = "tracing")]
                tracing::debug!(endpoint = %shared.endpoint, "WebSocket connection established");

                let closure =
                    handle_connection(ws_stream, outbound_rx, &shared, &mut stop_rx).await;

                match closure {
                    Ok(closure) => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(?closure, "WebSocket connection closed");
                        #[cfg(not(feature = "tracing"))]
                        let _: &Closure = &closure;
                    }
                    Err(e) => {
                        #[cfg(feature = "tracing")]
                        tracing::warn!("WebSocket connection lost: {e:?}");
                        #[cfg(not(feature = "tracing"))]
                        let _: &Error = &e;
                    }
                }
            }
            Some(Err(e)) => {
                attempt = attempt.saturating_add(1);

                #[cfg(feature = "tracing")]
                tracing::warn!(attempt, error = %e, "Unable to connect");

                shared.handshake_failed(&e);
            }
            None => {}
        }

        let exhausted = shared
            .config
            .reconnect
            .max_attempts
            .is_some_and(|max| attempt >= max);
        if shared.finish_if_stopped(&stop_rx, exhausted) {
            break;
        }

        let delay = backoff
            .next_backoff()
            .unwrap_or(shared.config.reconnect.max_backoff);
        shared.set_state(ConnectionState::Reconnecting { attempt, delay });

        #[cfg(feature = "tracing")]
        tracing::debug!(attempt, ?delay, "Scheduling reconnect");

        tokio::select! {
            () = sleep(delay) => {}
            () = shared.retry.notified() => {}
            () = stop_requested(&mut stop_rx) => {}
        }

        if shared.finish_if_stopped(&stop_rx, false) {
            break;
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(endpoint = %shared.endpoint, "Connection loop stopped");
}

/// Pump frames on an open connection until it closes.
async fn handle_connection(
    ws_stream: WsStream,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
    shared: &Shared,
    stop_rx: &mut watch::Receiver<bool>,
) -> Result<Closure> {
    let (mut write, mut read) = ws_stream.split();

    // Channel to notify heartbeat loop when PONG is received
    let (pong_tx, pong_rx) = watch::channel(Instant::now());
    let (beat_tx, mut beat_rx) = mpsc::unbounded_channel();

    let heartbeat_timeout = shared.config.heartbeat_timeout;
    let heartbeat_handle = shared.config.heartbeat_interval.map(|every| {
        tokio::spawn(async move {
            heartbeat_loop(beat_tx, every, heartbeat_timeout, pong_rx).await;
        })
    });

    let closure = loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        #[cfg(feature = "tracing")]
                        tracing::trace!(text = %text.as_str(), "Received WebSocket text message");

                        shared.deliver(text.as_str());
                    }
                    Some(Ok(Message::Pong(_))) => {
                        _ = pong_tx.send(Instant::now());
                    }
                    Some(Ok(Message::Close(frame))) => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(?frame, "Server closed WebSocket connection");
                        #[cfg(not(feature = "tracing"))]
                        let _: &Option<tokio_tungstenite::tungstenite::protocol::CloseFrame> = &frame;
                        break Ok(Closure::Remote);
                    }
                    Some(Ok(_)) => {
                        // Binary frames and PINGs; tungstenite answers PINGs itself.
                    }
                    Some(Err(e)) => break Err(WsError::Connection(e).into()),
                    None => break Ok(Closure::Remote),
                }
            }

            Some(text) = outbound_rx.recv() => {
                if let Err(e) = write.send(Message::Text(text.into())).await {
                    break Err(WsError::Connection(e).into());
                }
            }

            Some(beat) = beat_rx.recv() => {
                match beat {
                    Beat::Ping => {
                        if let Err(e) = write.send(Message::Ping(Bytes::new())).await {
                            break Err(WsError::Connection(e).into());
                        }
                    }
                    Beat::Expired => break Err(WsError::Timeout.into()),
                }
            }

            () = stop_requested(stop_rx) => {
                shared.set_state(ConnectionState::Closing);
                _ = write.send(Message::Close(None)).await;

                // Give the peer a moment to acknowledge; it may already be gone.
                _ = timeout(CLOSE_GRACE_DURATION, async {
                    while let Some(Ok(msg)) = read.next().await {
                        if msg.is_close() {
                            break;
                        }
                    }
                })
                .await;

                break Ok(Closure::Requested);
            }
        }
    };

    if let Some(handle) = heartbeat_handle {
        handle.abort();
    }

    // Refuse new sends, then report anything queued after the pump stopped reading.
    shared.closed();
    outbound_rx.close();
    while let Ok(text) = outbound_rx.try_recv() {
        #[cfg(feature = "tracing")]
        tracing::warn!(%text, "Dropping message queued while the connection was closing");
        #[cfg(not(feature = "tracing"))]
        let _: String = text;
    }

    closure
}

/// Heartbeat loop that requests PING frames and monitors PONG responses.
async fn heartbeat_loop(
    beat_tx: mpsc::UnboundedSender<Beat>,
    every: Duration,
    limit: Duration,
    mut pong_rx: watch::Receiver<Instant>,
) {
    let mut ping_interval = interval(every);

    loop {
        ping_interval.tick().await;

        // Mark current PONG state as seen before sending PING
        // This prevents changed() from returning immediately due to a stale PONG
        drop(pong_rx.borrow_and_update());

        let ping_sent = Instant::now();
        if beat_tx.send(Beat::Ping).is_err() {
            // Frame pump has terminated
            break;
        }

        match timeout(limit, pong_rx.changed()).await {
            Ok(Ok(())) => {
                let last_pong = *pong_rx.borrow_and_update();
                if last_pong < ping_sent {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("PONG received but older than last PING, connection may be stale");
                    _ = beat_tx.send(Beat::Expired);
                    break;
                }
            }
            Ok(Err(_)) => {
                // Channel closed, connection is terminating
                break;
            }
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("Heartbeat timeout: no PONG received within {limit:?}");
                _ = beat_tx.send(Beat::Expired);
                break;
            }
        }
    }
}
