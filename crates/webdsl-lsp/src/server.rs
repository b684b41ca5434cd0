//! The language server loop.
//!
//! One reader loop decodes frames and applies document mutations in arrival
//! order. Analysis runs on the blocking pool; read-only queries run on
//! spawned tasks against the snapshot taken when they arrived. All output
//! goes through the [`Outbox`] writer task.
use std::ops::ControlFlow;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::task::JoinSet;

use crate::analysis::Analyzer;
use crate::completion::completions;
use crate::diagnostics::DiagnosticsEngine;
use crate::document::{DocumentSnapshot, DocumentStore};
use crate::error::{codes, LspError};
use crate::hover::hover;
use crate::outbox::{spawn_writer, Outbox};
use crate::session::{MessageClass, Session, SessionState};
use crate::symbols::document_symbols;
use crate::transport::{parse_message, read_frame, JsonRpcMessage};
use crate::types::{
    initialize_result, DidChangeTextDocumentParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, DidSaveTextDocumentParams, DocumentSymbolParams, MessageType,
    TextDocumentPositionParams,
};

/// Shown when settings change while the server is running.
pub const RELOAD_REQUIRED_MESSAGE: &str =
    "webdsl: configuration changed; reload the window to apply it";

/// Per-connection server state.
pub struct Server {
    session: Session,
    store: Arc<DocumentStore>,
    engine: Arc<DiagnosticsEngine>,
    outbox: Outbox,
    tasks: JoinSet<()>,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("session", &self.session)
            .field("documents", &self.store.len())
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, LspError> {
    serde_json::from_value(params)
        .map_err(|e| LspError::rpc(codes::INVALID_PARAMS, format!("invalid params: {}", e)))
}

fn to_result<T: Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        tracing::error!("could not serialize result: {}", e);
        Value::Null
    })
}

/// A read-only query captured in the reader loop.
enum Query {
    Hover(Option<DocumentSnapshot>, TextDocumentPositionParams),
    Completion,
    Symbols(Option<DocumentSnapshot>),
}

impl Query {
    fn answer(self) -> Value {
        match self {
            Query::Hover(snapshot, params) => snapshot
                .and_then(|snap| hover(&snap.text, params.position))
                .map_or(Value::Null, to_result),
            Query::Completion => to_result(completions()),
            Query::Symbols(snapshot) => match snapshot {
                Some(snap) => to_result(document_symbols(&snap.text)),
                None => Value::Array(Vec::new()),
            },
        }
    }
}

impl Server {
    /// Create a server that writes through `outbox`.
    pub fn new(analyzer: Analyzer, outbox: Outbox) -> Self {
        Self {
            session: Session::new(),
            store: Arc::new(DocumentStore::new()),
            engine: Arc::new(DiagnosticsEngine::new(analyzer, outbox.clone())),
            outbox,
            tasks: JoinSet::new(),
        }
    }

    /// Handle one decoded message. `Break` carries the exit code.
    pub fn handle(&mut self, message: JsonRpcMessage) -> ControlFlow<i32> {
        while self.tasks.try_join_next().is_some() {}

        match message {
            JsonRpcMessage::Request { id, method, params } => {
                tracing::debug!(%method, %id, "request");
                self.handle_request(id, &method, params);
                ControlFlow::Continue(())
            }
            JsonRpcMessage::Notification { method, params } => {
                tracing::debug!(%method, "notification");
                self.handle_notification(&method, params)
            }
            JsonRpcMessage::Response { id, .. } => {
                tracing::debug!(%id, "ignoring response from client");
                ControlFlow::Continue(())
            }
        }
    }

    fn reply(&self, id: &Value, result: Result<Value, LspError>) {
        let sent = match result {
            Ok(value) => self.outbox.respond(id, value),
            Err(e) => {
                tracing::warn!(%id, "request failed: {}", e);
                let message = match &e {
                    LspError::Rpc { message, .. } => message.clone(),
                    other => other.to_string(),
                };
                self.outbox.respond_error(id, e.code(), &message)
            }
        };
        if let Err(e) = sent {
            tracing::warn!("could not queue response: {}", e);
        }
    }

    fn handle_request(&mut self, id: Value, method: &str, params: Value) {
        match method {
            "initialize" => {
                let result = self.session.initialize().map(|()| initialize_result());
                self.reply(&id, result);
            }
            "shutdown" => {
                self.session.shutdown();
                self.reply(&id, Ok(Value::Null));
            }
            "textDocument/hover" | "textDocument/completion" | "textDocument/documentSymbol" => {
                match self.capture_query(method, params) {
                    Ok(query) => {
                        let outbox = self.outbox.clone();
                        self.tasks.spawn(async move {
                            if let Err(e) = outbox.respond(&id, query.answer()) {
                                tracing::warn!("could not queue response: {}", e);
                            }
                        });
                    }
                    Err(e) => self.reply(&id, Err(e)),
                }
            }
            _ if self.session.state() == SessionState::Uninitialized => {
                self.reply(
                    &id,
                    Err(LspError::rpc(
                        codes::SERVER_NOT_INITIALIZED,
                        "server not initialized",
                    )),
                );
            }
            other => {
                self.reply(
                    &id,
                    Err(LspError::rpc(
                        codes::METHOD_NOT_FOUND,
                        format!("method not found: {}", other),
                    )),
                );
            }
        }
    }

    fn capture_query(&self, method: &str, params: Value) -> Result<Query, LspError> {
        self.session.check_request(MessageClass::Query)?;
        match method {
            "textDocument/hover" => {
                let params: TextDocumentPositionParams = parse_params(params)?;
                let snapshot = self.store.get(&params.text_document.uri);
                Ok(Query::Hover(snapshot, params))
            }
            "textDocument/completion" => {
                let _: TextDocumentPositionParams = parse_params(params)?;
                Ok(Query::Completion)
            }
            _ => {
                let params: DocumentSymbolParams = parse_params(params)?;
                Ok(Query::Symbols(self.store.get(&params.text_document.uri)))
            }
        }
    }

    fn handle_notification(&mut self, method: &str, params: Value) -> ControlFlow<i32> {
        match method {
            "initialized" => {
                self.session.initialized();
            }
            "exit" => return ControlFlow::Break(self.session.exit()),
            "$/cancelRequest" | "$/setTrace" => {}
            "workspace/didChangeConfiguration" => {
                tracing::warn!("configuration changed; not applied until restart");
                if let Err(e) = self
                    .outbox
                    .show_message(MessageType::Warning, RELOAD_REQUIRED_MESSAGE)
                {
                    tracing::warn!("could not notify client: {}", e);
                }
            }
            "textDocument/didOpen"
            | "textDocument/didChange"
            | "textDocument/didSave"
            | "textDocument/didClose" => {
                if !self.session.accepts_mutation() {
                    tracing::warn!(method, state = ?self.session.state(), "dropping document notification");
                } else if let Err(e) = self.apply_mutation(method, params) {
                    tracing::warn!(method, "malformed notification: {}", e);
                }
            }
            other => tracing::debug!(method = other, "ignoring notification"),
        }
        ControlFlow::Continue(())
    }

    fn apply_mutation(&mut self, method: &str, params: Value) -> Result<(), LspError> {
        let snapshot = match method {
            "textDocument/didOpen" => {
                let params: DidOpenTextDocumentParams = parse_params(params)?;
                let doc = params.text_document;
                Some(self.store.open(&doc.uri, doc.text))
            }
            "textDocument/didChange" => {
                let params: DidChangeTextDocumentParams = parse_params(params)?;
                let change = params.content_changes.into_iter().last().ok_or_else(|| {
                    LspError::rpc(codes::INVALID_PARAMS, "didChange without content")
                })?;
                Some(self.store.change(&params.text_document.uri, change.text))
            }
            "textDocument/didSave" => {
                let params: DidSaveTextDocumentParams = parse_params(params)?;
                self.store.save(&params.text_document.uri, params.text)
            }
            _ => {
                let params: DidCloseTextDocumentParams = parse_params(params)?;
                let uri = params.text_document.uri;
                let revision = self.store.close(&uri);
                self.engine.clear(&uri, revision);
                None
            }
        };

        if let Some(snapshot) = snapshot {
            let engine = Arc::clone(&self.engine);
            let store = Arc::clone(&self.store);
            self.tasks.spawn_blocking(move || {
                engine.refresh(&store, &snapshot);
            });
        }
        Ok(())
    }

    /// Wait for every spawned query and analysis task.
    pub async fn drain(&mut self) {
        while self.tasks.join_next().await.is_some() {}
    }
}

/// Serve one client over `reader`/`writer` until `exit` or end of input.
///
/// Returns the process exit code: 0 when `shutdown` preceded `exit` or the
/// end of input, 1 otherwise.
pub async fn serve<R, W>(reader: R, writer: W, analyzer: Analyzer) -> Result<i32, LspError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (outbox, rx) = Outbox::new();
    let writer_task = spawn_writer(writer, rx);
    let mut server = Server::new(analyzer, outbox.clone());
    let mut reader = BufReader::new(reader);

    tracing::info!("webdsl language server started");

    let outcome = loop {
        let body = match read_frame(&mut reader).await {
            Ok(Some(body)) => body,
            Ok(None) => {
                tracing::info!("client closed the connection");
                break Ok(server.session.exit());
            }
            Err(LspError::InvalidMessage(reason)) => {
                tracing::warn!("bad frame: {}", reason);
                let _ = outbox.respond_error(&Value::Null, codes::PARSE_ERROR, &reason);
                continue;
            }
            Err(e) => break Err(e),
        };

        match parse_message(&body) {
            Ok(message) => {
                if let ControlFlow::Break(code) = server.handle(message) {
                    break Ok(code);
                }
            }
            Err(e) => {
                tracing::warn!("bad message: {}", e);
                let _ = outbox.respond_error(&Value::Null, e.code(), &e.to_string());
            }
        }
    };

    server.drain().await;
    drop(server);
    drop(outbox);
    if let Err(e) = writer_task.await {
        tracing::error!("writer task failed: {}", e);
    }
    tracing::info!(?outcome, "webdsl language server stopped");
    outcome
}

#[cfg(test)]
impl Server {
    fn state(&self) -> SessionState {
        self.session.state()
    }

    fn documents(&self) -> &DocumentStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::UnboundedReceiver;

    const URI: &str = "file:///srv/app.webdsl";

    fn server() -> (Server, UnboundedReceiver<String>) {
        let (outbox, rx) = Outbox::new();
        (Server::new(Analyzer::default(), outbox), rx)
    }

    fn request(id: i64, method: &str, params: Value) -> JsonRpcMessage {
        JsonRpcMessage::Request {
            id: Value::from(id),
            method: method.to_string(),
            params,
        }
    }

    fn notification(method: &str, params: Value) -> JsonRpcMessage {
        JsonRpcMessage::Notification {
            method: method.to_string(),
            params,
        }
    }

    fn drain(rx: &mut UnboundedReceiver<String>) -> Vec<Value> {
        let mut out = Vec::new();
        while let Ok(body) = rx.try_recv() {
            out.push(serde_json::from_str(&body).unwrap());
        }
        out
    }

    async fn initialized() -> (Server, UnboundedReceiver<String>) {
        let (mut server, mut rx) = server();
        let _ = server.handle(request(1, "initialize", serde_json::json!({})));
        let _ = server.handle(notification("initialized", serde_json::json!({})));
        drain(&mut rx);
        (server, rx)
    }

    fn open(text: &str) -> JsonRpcMessage {
        notification(
            "textDocument/didOpen",
            serde_json::json!({
                "textDocument": { "uri": URI, "languageId": "webdsl", "version": 1, "text": text }
            }),
        )
    }

    #[tokio::test]
    async fn request_before_initialize_is_rejected() {
        let (mut server, mut rx) = server();
        let _ = server.handle(request(
            7,
            "textDocument/documentSymbol",
            serde_json::json!({ "textDocument": { "uri": URI } }),
        ));
        let sent = drain(&mut rx);
        assert_eq!(sent[0]["id"], 7);
        assert_eq!(sent[0]["error"]["code"], codes::SERVER_NOT_INITIALIZED);
    }

    #[tokio::test]
    async fn initialize_advertises_capabilities() {
        let (mut server, mut rx) = server();
        let _ = server.handle(request(1, "initialize", serde_json::json!({})));
        let sent = drain(&mut rx);
        assert_eq!(sent[0]["result"]["capabilities"]["hoverProvider"], true);
        assert_eq!(server.state(), SessionState::Initialized);

        let _ = server.handle(request(2, "initialize", serde_json::json!({})));
        let sent = drain(&mut rx);
        assert_eq!(sent[0]["error"]["code"], codes::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn open_publishes_diagnostics() {
        let (mut server, mut rx) = initialized().await;
        let _ = server.handle(open("server\n"));
        server.drain().await;
        let sent = drain(&mut rx);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["method"], "textDocument/publishDiagnostics");
        assert_eq!(sent[0]["params"]["diagnostics"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn queries_on_unopened_document_are_weakest() {
        let (mut server, mut rx) = initialized().await;
        let _ = server.handle(request(
            3,
            "textDocument/hover",
            serde_json::json!({ "textDocument": { "uri": URI }, "position": { "line": 0, "character": 0 } }),
        ));
        let _ = server.handle(request(
            4,
            "textDocument/documentSymbol",
            serde_json::json!({ "textDocument": { "uri": URI } }),
        ));
        let _ = server.handle(request(
            5,
            "textDocument/completion",
            serde_json::json!({ "textDocument": { "uri": URI }, "position": { "line": 0, "character": 0 } }),
        ));
        server.drain().await;
        let mut sent = drain(&mut rx);
        sent.sort_by_key(|m| m["id"].as_i64());
        assert!(sent[0]["result"].is_null());
        assert_eq!(sent[1]["result"], serde_json::json!([]));
        assert_eq!(sent[2]["result"].as_array().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn invalid_params_yield_error() {
        let (mut server, mut rx) = initialized().await;
        let _ = server.handle(request(9, "textDocument/hover", serde_json::json!({ "nope": 1 })));
        let sent = drain(&mut rx);
        assert_eq!(sent[0]["error"]["code"], codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn unknown_method_not_found() {
        let (mut server, mut rx) = initialized().await;
        let _ = server.handle(request(10, "textDocument/rename", Value::Null));
        let sent = drain(&mut rx);
        assert_eq!(sent[0]["error"]["code"], codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_notification_is_dropped() {
        let (mut server, mut rx) = initialized().await;
        let flow = server.handle(notification("textDocument/didOpen", serde_json::json!(42)));
        assert_eq!(flow, ControlFlow::Continue(()));
        server.drain().await;
        assert!(drain(&mut rx).is_empty());
        assert!(server.documents().is_empty());
    }

    #[tokio::test]
    async fn configuration_change_reports_reload() {
        let (mut server, mut rx) = initialized().await;
        let _ = server.handle(notification(
            "workspace/didChangeConfiguration",
            serde_json::json!({ "settings": {} }),
        ));
        let sent = drain(&mut rx);
        assert_eq!(sent[0]["method"], "window/showMessage");
        assert_eq!(sent[0]["params"]["type"], 2);
        assert_eq!(sent[1]["method"], "window/logMessage");
    }

    #[tokio::test]
    async fn mutations_rejected_after_shutdown() {
        let (mut server, mut rx) = initialized().await;
        let _ = server.handle(request(11, "shutdown", Value::Null));
        let _ = server.handle(open("server 1\n"));
        server.drain().await;
        let sent = drain(&mut rx);
        assert_eq!(sent.len(), 1);
        assert!(sent[0]["result"].is_null());
        assert!(server.documents().is_empty());
    }

    #[tokio::test]
    async fn exit_codes() {
        let (mut server, _rx) = initialized().await;
        let _ = server.handle(request(12, "shutdown", Value::Null));
        let _ = server.handle(request(13, "shutdown", Value::Null));
        assert_eq!(
            server.handle(notification("exit", Value::Null)),
            ControlFlow::Break(0)
        );

        let (mut server, _rx) = initialized().await;
        assert_eq!(
            server.handle(notification("exit", Value::Null)),
            ControlFlow::Break(1)
        );
    }

    #[tokio::test]
    async fn serve_ends_on_eof_with_code_one() {
        let (client, server_io) = tokio::io::duplex(4096);
        let (read_half, write_half) = tokio::io::split(server_io);
        drop(client);
        let code = serve(read_half, write_half, Analyzer::default()).await.unwrap();
        assert_eq!(code, 1);
    }
}
