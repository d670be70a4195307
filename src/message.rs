//! Outbound payloads and the typed view over inbound chat events.
//!
//! Everything travels as JSON text frames. Plain payloads are serialized verbatim; file
//! payloads are read, base64-encoded and wrapped into a single [`FileFrame`].

use std::path::PathBuf;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;

/// MIME type used when the host does not supply one.
pub const DEFAULT_FILE_TYPE: &str = "application/octet-stream";

/// A message the host hands to [`ConnectionManager::send`](crate::ws::ConnectionManager::send).
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    /// Any JSON value, sent as-is.
    Json(Value),
    /// A file, transcoded into a [`FileFrame`] before sending.
    File(FileAttachment),
}

impl From<Value> for OutboundMessage {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<FileAttachment> for OutboundMessage {
    fn from(file: FileAttachment) -> Self {
        Self::File(file)
    }
}

impl From<ChatMessage> for OutboundMessage {
    fn from(message: ChatMessage) -> Self {
        Self::Json(message.into_value())
    }
}

/// Where a file's bytes come from.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum FileSource {
    Bytes(Vec<u8>),
    /// Read asynchronously when the message is sent.
    Path(PathBuf),
}

/// A file to upload over the socket.
///
/// ```rust
/// use chat_socket_client::message::{FileAttachment, FileSource};
///
/// let file = FileAttachment::builder()
///     .name("notes.txt")
///     .content_type("text/plain")
///     .source(FileSource::Bytes(b"hi".to_vec()))
///     .build();
/// assert_eq!(file.content_type, "text/plain");
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct FileAttachment {
    #[builder(into)]
    pub name: String,
    #[builder(into, default = DEFAULT_FILE_TYPE.to_owned())]
    pub content_type: String,
    pub source: FileSource,
}

impl FileAttachment {
    /// An attachment whose bytes are already in memory.
    #[must_use]
    pub fn from_bytes<N: Into<String>, T: Into<String>>(
        name: N,
        content_type: T,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            source: FileSource::Bytes(bytes),
        }
    }

    /// An attachment read from disk at send time. The file name defaults to the path's
    /// final component.
    #[must_use]
    pub fn from_path<P: Into<PathBuf>>(path: P, content_type: Option<&str>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            content_type: content_type.unwrap_or(DEFAULT_FILE_TYPE).to_owned(),
            source: FileSource::Path(path),
        }
    }

    /// Read the bytes and build the wire frame.
    pub async fn encode(self) -> Result<FileFrame> {
        let bytes = match self.source {
            FileSource::Bytes(bytes) => bytes,
            FileSource::Path(path) => tokio::fs::read(&path).await?,
        };

        Ok(FileFrame::new(self.name, self.content_type, &bytes))
    }
}

/// Wire shape of an uploaded file.
///
/// Serializes to `{"type":"file","fileName":..,"fileType":..,"fileData":..}` where
/// `fileData` is standard base64 without a data-URL prefix.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "file", rename_all = "camelCase")]
pub struct FileFrame {
    pub file_name: String,
    pub file_type: String,
    pub file_data: String,
}

impl FileFrame {
    #[must_use]
    pub fn new(file_name: String, file_type: String, bytes: &[u8]) -> Self {
        Self {
            file_name,
            file_type,
            file_data: STANDARD.encode(bytes),
        }
    }

    /// Decode `file_data` back into bytes.
    pub fn bytes(&self) -> std::result::Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.file_data)
    }
}

/// A plain chat line, sent as `{"type":"message","text":..}`.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "message")]
pub struct ChatMessage {
    pub text: String,
}

impl ChatMessage {
    #[must_use]
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self { text: text.into() }
    }

    fn into_value(self) -> Value {
        serde_json::json!({ "type": "message", "text": self.text })
    }
}

/// Typed view over the events a chat server pushes.
///
/// Handlers always receive the raw [`Value`]; use [`ServerEvent::from_value`] to
/// interpret it when the shape is known.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerEvent {
    /// A reply from the assistant.
    Message { message: String },
    /// Typing indicator toggled by the server.
    Typing {
        #[serde(rename = "isTyping")]
        is_typing: bool,
    },
    /// A server-side failure report.
    Error { message: String },
}

impl ServerEvent {
    /// Interpret `value`, returning `None` for unknown or ill-shaped events.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        Self::deserialize(value).ok()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn file_frame_wire_shape() {
        let frame = FileAttachment::from_bytes("hi.txt", "text/plain", b"hi".to_vec())
            .encode()
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_value(&frame).unwrap(),
            json!({
                "type": "file",
                "fileName": "hi.txt",
                "fileType": "text/plain",
                "fileData": "aGk="
            })
        );
        assert_eq!(frame.bytes().unwrap(), b"hi");
    }

    #[tokio::test]
    async fn path_source_is_read_at_encode_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.bin");
        std::fs::write(&path, [0_u8, 159, 146, 150]).unwrap();

        let frame = FileAttachment::from_path(&path, None).encode().await.unwrap();

        assert_eq!(frame.file_name, "report.bin");
        assert_eq!(frame.file_type, DEFAULT_FILE_TYPE);
        assert_eq!(frame.bytes().unwrap(), vec![0_u8, 159, 146, 150]);
    }

    #[tokio::test]
    async fn missing_path_fails_encoding() {
        let result = FileAttachment::from_path("/definitely/not/here.txt", Some("text/plain"))
            .encode()
            .await;

        assert!(result.is_err(), "reading a missing file should fail");
    }

    #[test]
    fn builder_defaults_content_type() {
        let file = FileAttachment::builder()
            .name("blob")
            .source(FileSource::Bytes(Vec::new()))
            .build();

        assert_eq!(file.content_type, DEFAULT_FILE_TYPE);
    }

    #[test]
    fn chat_message_wire_shape() {
        let OutboundMessage::Json(value) = ChatMessage::text("hello").into() else {
            panic!("chat messages are plain JSON");
        };

        assert_eq!(value, json!({"type": "message", "text": "hello"}));
    }

    #[test]
    fn server_events_are_recognised() {
        assert_eq!(
            ServerEvent::from_value(&json!({"type": "message", "message": "Hi!"})),
            Some(ServerEvent::Message {
                message: "Hi!".to_owned()
            })
        );
        assert_eq!(
            ServerEvent::from_value(&json!({"type": "typing", "isTyping": false})),
            Some(ServerEvent::Typing { is_typing: false })
        );
        assert_eq!(
            ServerEvent::from_value(&json!({"type": "error", "message": "Error: boom"})),
            Some(ServerEvent::Error {
                message: "Error: boom".to_owned()
            })
        );
    }

    #[test]
    fn unknown_server_events_are_none() {
        assert_eq!(ServerEvent::from_value(&json!({"type": "presence"})), None);
        assert_eq!(ServerEvent::from_value(&json!("plain")), None);
    }
}
