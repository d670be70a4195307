//! Persistent WebSocket connection management.
//!
//! # Architecture
//!
//! - [`ConnectionManager`]: owns the transport, reconnects after every unexpected close and
//!   dispatches inbound messages
//! - [`MessageHandler`]: callback invoked for each inbound message, in registration order
//! - [`MessageParser`]: trait for turning inbound text frames into JSON values
//!
//! # Example
//!
//! ```ignore
//! let store = MemoryStore::new();
//! let connection = ConnectionManager::new("ws://localhost:8000/ws/chat/", &store)?;
//!
//! let printer = handler(|message| println!("{message}"));
//! connection.on_message(Arc::clone(&printer));
//! connection.connect().await?;
//! connection.send(json!({"type": "message", "text": "hi"})).await?;
//! connection.remove_message_handler(&printer);
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod handler;
pub mod traits;

pub use connection::{ConnectionManager, ConnectionState, WeakConnectionManager};
#[expect(
    clippy::module_name_repetitions,
    reason = "WsError includes module name for clarity when used outside this module"
)]
pub use error::WsError;
pub use handler::{MessageHandler, handler};
pub use traits::*;
