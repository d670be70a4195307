//! Seams between the transport and the payloads it carries.

use serde_json::Value;

use super::error::WsError;

/// Message parser trait for converting inbound text frames to JSON values.
///
/// The connection manager calls this once per text frame. Returning an error marks
/// the frame as malformed: it is logged and skipped, and no handler sees it.
///
/// # Example
///
/// ```ignore
/// pub struct EnvelopeParser;
///
/// impl MessageParser for EnvelopeParser {
///     fn parse(&self, text: &str) -> Result<Value, WsError> {
///         let mut value: Value = serde_json::from_str(text).map_err(WsError::MalformedFrame)?;
///         Ok(value["payload"].take())
///     }
/// }
/// ```
pub trait MessageParser: Send + Sync + 'static {
    fn parse(&self, text: &str) -> Result<Value, WsError>;
}

/// Parses each frame as one JSON document.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl MessageParser for JsonParser {
    fn parse(&self, text: &str) -> Result<Value, WsError> {
        serde_json::from_str(text).map_err(WsError::MalformedFrame)
    }
}
