//! JSON-RPC transport for LSP communication.
//!
//! Implements Content-Length header framing per the LSP base protocol, over
//! raw bytes and over any async reader/writer pair.
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::LspError;

/// Largest body a frame may carry (64 MiB).
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// A JSON-RPC message (request, response, or notification).
#[derive(Debug, Clone, PartialEq)]
pub enum JsonRpcMessage {
    /// A request (has id and method).
    Request {
        /// The request ID: a number or a string.
        id: Value,
        /// The method name.
        method: String,
        /// The params (JSON value).
        params: Value,
    },
    /// A response (has id, may have result or error).
    Response {
        /// The request ID this responds to.
        id: Value,
        /// The result (if successful).
        result: Option<Value>,
        /// The error (if failed).
        error: Option<RpcError>,
    },
    /// A notification (has method, no id).
    Notification {
        /// The method name.
        method: String,
        /// The params.
        params: Value,
    },
}

/// An error object in a JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcError {
    /// The error code.
    pub code: i32,
    /// The error message.
    pub message: String,
}

/// Frame a JSON-RPC message with Content-Length header.
pub fn frame_message(body: &str) -> Vec<u8> {
    let header = format!("Content-Length: {}\r\n\r\n", body.len());
    let mut bytes = header.into_bytes();
    bytes.extend_from_slice(body.as_bytes());
    bytes
}

/// Serialize a JSON-RPC notification (no id).
pub fn serialize_notification(method: &str, params: Value) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params
    })
    .to_string()
}

/// Serialize a JSON-RPC response.
pub fn serialize_response(id: &Value, result: Value) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
    .to_string()
}

/// Serialize a JSON-RPC error response. `id` is `null` when the failing
/// message could not be identified.
pub fn serialize_error_response(id: &Value, code: i32, message: &str) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message
        }
    })
    .to_string()
}

/// Parse the Content-Length value from raw header text.
pub fn parse_content_length(header: &str) -> Result<usize, LspError> {
    for line in header.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("Content-Length:") {
            let value = value.trim();
            return value.parse::<usize>().map_err(|_| {
                LspError::InvalidMessage(format!("invalid Content-Length: {}", value))
            });
        }
    }
    Err(LspError::InvalidMessage(
        "missing Content-Length header".to_string(),
    ))
}

fn message_id(value: &Value) -> Result<Value, LspError> {
    match &value["id"] {
        id @ (Value::Number(_) | Value::String(_)) => Ok(id.clone()),
        _ => Err(LspError::InvalidMessage(
            "id must be a number or a string".into(),
        )),
    }
}

fn message_method(value: &Value) -> Result<String, LspError> {
    value["method"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| LspError::InvalidMessage("method must be string".into()))
}

/// Parse a JSON-RPC message from a JSON string.
pub fn parse_message(json_str: &str) -> Result<JsonRpcMessage, LspError> {
    let value: Value = serde_json::from_str(json_str)
        .map_err(|e| LspError::Serialization(format!("invalid JSON: {}", e)))?;

    if !value.is_object() {
        return Err(LspError::InvalidMessage("message must be an object".into()));
    }

    let has_id = value.get("id").is_some_and(|id| !id.is_null());
    let has_method = value.get("method").is_some();
    let params = || value.get("params").cloned().unwrap_or(Value::Null);

    match (has_id, has_method) {
        (true, true) => Ok(JsonRpcMessage::Request {
            id: message_id(&value)?,
            method: message_method(&value)?,
            params: params(),
        }),
        (true, false) => {
            let result = value.get("result").cloned();
            let error = value.get("error").and_then(|e| {
                Some(RpcError {
                    code: i32::try_from(e.get("code")?.as_i64()?).ok()?,
                    message: e.get("message")?.as_str()?.to_string(),
                })
            });
            Ok(JsonRpcMessage::Response {
                id: message_id(&value)?,
                result,
                error,
            })
        }
        (false, true) => Ok(JsonRpcMessage::Notification {
            method: message_method(&value)?,
            params: params(),
        }),
        (false, false) => Err(LspError::InvalidMessage(
            "message has neither id nor method".to_string(),
        )),
    }
}

/// Read one framed body from `reader`.
///
/// Returns `Ok(None)` on a clean end of stream before any header byte.
/// Header lines other than `Content-Length` are ignored. A body longer than
/// [`MAX_FRAME_LEN`] is skipped and reported as `InvalidMessage`, leaving
/// the stream at the next frame.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<String>, LspError>
where
    R: AsyncBufRead + Unpin,
{
    read_frame_with_limit(reader, MAX_FRAME_LEN).await
}

async fn read_frame_with_limit<R>(
    reader: &mut R,
    max_len: usize,
) -> Result<Option<String>, LspError>
where
    R: AsyncBufRead + Unpin,
{
    let mut content_length: Option<usize> = None;
    let mut saw_header = false;

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            if saw_header {
                return Err(LspError::InvalidMessage("end of stream inside header".into()));
            }
            return Ok(None);
        }
        saw_header = true;

        let trimmed = line.trim();
        if trimmed.is_empty() {
            if content_length.is_some() {
                break;
            }
            // Stray blank line between frames.
            saw_header = false;
            continue;
        }
        if trimmed.starts_with("Content-Length:") {
            content_length = Some(parse_content_length(trimmed)?);
        }
    }

    let length = content_length.unwrap_or_default();
    if length > max_len {
        let skipped =
            tokio::io::copy(&mut (&mut *reader).take(length as u64), &mut tokio::io::sink())
                .await?;
        tracing::warn!(length, skipped, "skipped oversized frame");
        return Err(LspError::InvalidMessage(format!(
            "frame of {} bytes exceeds the {} byte limit",
            length, max_len
        )));
    }
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).await?;

    String::from_utf8(body)
        .map(Some)
        .map_err(|_| LspError::InvalidMessage("invalid UTF-8 in body".into()))
}

/// Write one framed body to `writer` and flush.
pub async fn write_frame<W>(writer: &mut W, body: &str) -> Result<(), LspError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&frame_message(body)).await?;
    writer.flush().await?;
    Ok(())
}
