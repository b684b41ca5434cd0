//! Outgoing message queue.
//!
//! Every frame the server sends goes through one unbounded channel drained
//! by a single writer task, so handlers and background analysis can enqueue
//! without awaiting and frames never interleave on the wire.
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::LspError;
use crate::transport::{
    frame_message, serialize_error_response, serialize_notification, serialize_response,
};
use crate::types::{Diagnostic, MessageParams, MessageType, PublishDiagnosticsParams};

/// Cloneable sender for outgoing JSON-RPC bodies.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<String>,
}

impl Outbox {
    /// Create an outbox and the receiver its writer task drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, body: String) -> Result<(), LspError> {
        self.tx.send(body).map_err(|_| LspError::ChannelClosed)
    }

    /// Queue a notification.
    pub fn notify<P: Serialize>(&self, method: &str, params: P) -> Result<(), LspError> {
        let params = serde_json::to_value(params)?;
        self.send(serialize_notification(method, params))
    }

    /// Queue a successful response.
    pub fn respond(&self, id: &Value, result: Value) -> Result<(), LspError> {
        self.send(serialize_response(id, result))
    }

    /// Queue an error response.
    pub fn respond_error(&self, id: &Value, code: i32, message: &str) -> Result<(), LspError> {
        self.send(serialize_error_response(id, code, message))
    }

    /// Queue `textDocument/publishDiagnostics` with the complete set.
    pub fn publish_diagnostics(
        &self,
        uri: &str,
        diagnostics: Vec<Diagnostic>,
    ) -> Result<(), LspError> {
        self.notify(
            "textDocument/publishDiagnostics",
            PublishDiagnosticsParams {
                uri: uri.to_string(),
                diagnostics,
            },
        )
    }

    /// Surface a message to the user (`window/showMessage`) and record it in
    /// the client's log channel (`window/logMessage`).
    pub fn show_message(&self, typ: MessageType, message: &str) -> Result<(), LspError> {
        let params = MessageParams {
            typ,
            message: message.to_string(),
        };
        self.notify("window/showMessage", &params)?;
        self.notify("window/logMessage", &params)
    }
}

/// Spawn the writer task: frame each queued body and write it to `writer`.
///
/// The task ends when every [`Outbox`] clone is dropped or the write fails.
pub fn spawn_writer<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<String>) -> JoinHandle<()>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(body) = rx.recv().await {
            if let Err(e) = writer.write_all(&frame_message(&body)).await {
                tracing::error!("write to client failed: {}", e);
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
        let _ = writer.shutdown().await;
    })
}
