use std::collections::VecDeque;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{BufReader, DuplexStream, ReadHalf, WriteHalf};
use tokio::task::JoinHandle;

use webdsl_core::build_outline;
use webdsl_lsp::transport::{read_frame, write_frame};
use webdsl_lsp::{serve, Analyzer, LspError};

const URI: &str = "file:///srv/app/main.webdsl";

const SOURCE: &str = "\
server 8080
endpoint GET \"/users\": list()
endpoint POST \"/users\": create()
func list(): json { \"users\": [] }
class Store:
    method get(id): id
    method put(id, v): v
class Cache:
    method get(id): id
";

// ── Harness ─────────────────────────────────────────────────────

struct Client {
    writer: WriteHalf<DuplexStream>,
    reader: BufReader<ReadHalf<DuplexStream>>,
    pending: VecDeque<Value>,
    next_id: i64,
    server: JoinHandle<Result<i32, LspError>>,
}

impl Client {
    fn start() -> Self {
        let (client_io, server_io) = tokio::io::duplex(64 * 1024);
        let (server_read, server_write) = tokio::io::split(server_io);
        let server = tokio::spawn(serve(server_read, server_write, Analyzer::default()));
        let (read, writer) = tokio::io::split(client_io);
        Self {
            writer,
            reader: BufReader::new(read),
            pending: VecDeque::new(),
            next_id: 0,
            server,
        }
    }

    async fn send(&mut self, message: Value) {
        write_frame(&mut self.writer, &message.to_string())
            .await
            .unwrap();
    }

    async fn notify(&mut self, method: &str, params: Value) {
        self.send(json!({ "jsonrpc": "2.0", "method": method, "params": params }))
            .await;
    }

    async fn recv(&mut self) -> Value {
        let body = tokio::time::timeout(Duration::from_secs(5), read_frame(&mut self.reader))
            .await
            .expect("timed out waiting for the server")
            .unwrap()
            .expect("server closed the stream");
        serde_json::from_str(&body).unwrap()
    }

    async fn request(&mut self, method: &str, params: Value) -> Value {
        self.next_id += 1;
        let id = self.next_id;
        self.send(json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }))
            .await;
        loop {
            let message = self.recv().await;
            if message["id"] == id {
                return message;
            }
            self.pending.push_back(message);
        }
    }

    async fn notification(&mut self, method: &str) -> Value {
        if let Some(pos) = self.pending.iter().position(|m| m["method"] == method) {
            return self.pending.remove(pos).unwrap();
        }
        loop {
            let message = self.recv().await;
            if message["method"] == method {
                return message;
            }
            self.pending.push_back(message);
        }
    }

    async fn initialize(&mut self) {
        let response = self.request("initialize", json!({ "capabilities": {} })).await;
        assert!(response["result"]["capabilities"].is_object());
        self.notify("initialized", json!({})).await;
    }

    async fn open(&mut self, text: &str) {
        self.notify(
            "textDocument/didOpen",
            json!({ "textDocument": { "uri": URI, "languageId": "webdsl", "version": 1, "text": text } }),
        )
        .await;
    }

    async fn change(&mut self, version: i64, text: &str) {
        self.notify(
            "textDocument/didChange",
            json!({
                "textDocument": { "uri": URI, "version": version },
                "contentChanges": [{ "text": text }]
            }),
        )
        .await;
    }

    async fn save(&mut self, text: Option<&str>) {
        let mut params = json!({ "textDocument": { "uri": URI } });
        if let Some(text) = text {
            params["text"] = json!(text);
        }
        self.notify("textDocument/didSave", params).await;
    }

    async fn diagnostics(&mut self) -> Vec<Value> {
        let message = self.notification("textDocument/publishDiagnostics").await;
        assert_eq!(message["params"]["uri"], URI);
        message["params"]["diagnostics"].as_array().unwrap().clone()
    }

    async fn hover(&mut self, line: u32, character: u32) -> Value {
        self.request(
            "textDocument/hover",
            json!({ "textDocument": { "uri": URI }, "position": { "line": line, "character": character } }),
        )
        .await
    }

    async fn finish(mut self, shutdown: bool) -> i32 {
        if shutdown {
            let response = self.request("shutdown", Value::Null).await;
            assert!(response["result"].is_null());
        }
        self.notify("exit", Value::Null).await;
        tokio::time::timeout(Duration::from_secs(5), self.server)
            .await
            .expect("server did not stop")
            .unwrap()
            .unwrap()
    }
}

// ── Lifecycle ───────────────────────────────────────────────────

#[tokio::test]
async fn requests_before_initialize_are_rejected() {
    let mut client = Client::start();
    let response = client
        .request("textDocument/documentSymbol", json!({ "textDocument": { "uri": URI } }))
        .await;
    assert_eq!(response["error"]["code"], -32002);
    assert_eq!(client.finish(false).await, 1);
}

#[tokio::test]
async fn clean_shutdown_exits_zero() {
    let mut client = Client::start();
    client.initialize().await;
    assert_eq!(client.finish(true).await, 0);
}

#[tokio::test]
async fn exit_without_shutdown_exits_one() {
    let mut client = Client::start();
    client.initialize().await;
    assert_eq!(client.finish(false).await, 1);
}

#[tokio::test]
async fn malformed_json_gets_parse_error() {
    let mut client = Client::start();
    write_frame(&mut client.writer, "{ not json").await.unwrap();
    let response = client.recv().await;
    assert_eq!(response["error"]["code"], -32700);
    assert!(response["id"].is_null());
    client.initialize().await;
    assert_eq!(client.finish(true).await, 0);
}

// ── Diagnostics ─────────────────────────────────────────────────

#[tokio::test]
async fn parse_error_maps_to_zero_based_line() {
    let mut client = Client::start();
    client.initialize().await;
    client.open("server 8080\n\nserver\n").await;

    let diagnostics = client.diagnostics().await;
    assert_eq!(diagnostics.len(), 1);
    let range = &diagnostics[0]["range"];
    assert_eq!(range["start"]["line"], 2);
    assert_eq!(range["start"]["character"], 0);
    assert_eq!(range["end"]["character"], 200);
    assert_eq!(diagnostics[0]["severity"], 1);
    assert_eq!(diagnostics[0]["source"], "webdsl");

    assert_eq!(client.finish(true).await, 0);
}

#[tokio::test]
async fn fixing_the_text_replaces_the_set() {
    let mut client = Client::start();
    client.initialize().await;
    client.open("server\n").await;
    assert_eq!(client.diagnostics().await.len(), 1);

    client.change(2, SOURCE).await;
    assert!(client.diagnostics().await.is_empty());

    assert_eq!(client.finish(true).await, 0);
}

#[tokio::test]
async fn save_with_text_publishes_full_set() {
    let mut client = Client::start();
    client.initialize().await;
    client.open("server\n").await;
    assert_eq!(client.diagnostics().await.len(), 1);

    client.save(Some(SOURCE)).await;
    assert!(client.diagnostics().await.is_empty());

    client.save(Some("server 8080\nserver\n")).await;
    let diagnostics = client.diagnostics().await;
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0]["range"]["start"]["line"], 1);

    assert_eq!(client.finish(true).await, 0);
}

#[tokio::test]
async fn save_without_text_reanalyzes_stored_text() {
    let mut client = Client::start();
    client.initialize().await;
    client.open(SOURCE).await;
    assert!(client.diagnostics().await.is_empty());

    client.save(None).await;
    assert!(client.diagnostics().await.is_empty());

    client.change(2, "server\n").await;
    assert_eq!(client.diagnostics().await.len(), 1);

    client.save(None).await;
    let diagnostics = client.diagnostics().await;
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0]["range"]["start"]["line"], 0);

    assert_eq!(client.finish(true).await, 0);
}

#[tokio::test]
async fn close_clears_diagnostics() {
    let mut client = Client::start();
    client.initialize().await;
    client.open("server\n").await;
    assert_eq!(client.diagnostics().await.len(), 1);

    client
        .notify("textDocument/didClose", json!({ "textDocument": { "uri": URI } }))
        .await;
    assert!(client.diagnostics().await.is_empty());

    let symbols = client
        .request("textDocument/documentSymbol", json!({ "textDocument": { "uri": URI } }))
        .await;
    assert_eq!(symbols["result"], json!([]));

    assert_eq!(client.finish(true).await, 0);
}

// ── Queries ─────────────────────────────────────────────────────

#[tokio::test]
async fn symbols_match_outline_counts() {
    let mut client = Client::start();
    client.initialize().await;
    client.open(SOURCE).await;

    let response = client
        .request("textDocument/documentSymbol", json!({ "textDocument": { "uri": URI } }))
        .await;
    let symbols = response["result"].as_array().unwrap();
    let outline = build_outline(SOURCE);

    let classes: Vec<&Value> = symbols.iter().filter(|s| s["kind"] == 5).collect();
    assert_eq!(classes.len(), outline.classes.len());
    let methods: usize = classes
        .iter()
        .map(|c| c["children"].as_array().unwrap().len())
        .sum();
    assert_eq!(methods, outline.method_count());
    assert_eq!(
        symbols.len(),
        1 + outline.endpoints.len() + outline.functions.len() + outline.classes.len()
    );
    assert_eq!(symbols[0]["name"], "server");
    assert_eq!(symbols[0]["detail"], "port 8080");

    assert_eq!(client.finish(true).await, 0);
}

#[tokio::test]
async fn hover_on_keyword_and_unknown_word() {
    let mut client = Client::start();
    client.initialize().await;
    client.open(SOURCE).await;

    let get = client.hover(1, 10).await;
    let markdown = get["result"]["contents"]["value"].as_str().unwrap();
    assert!(markdown.contains("GET"));
    assert_eq!(get["result"]["contents"]["kind"], "markdown");

    let method = client.hover(5, 12).await;
    let markdown = method["result"]["contents"]["value"].as_str().unwrap();
    assert!(markdown.contains("Store.get"));
    assert!(markdown.contains("Cache.get"));

    let unknown = client.hover(5, 20).await;
    assert!(unknown["result"].is_null());

    assert_eq!(client.finish(true).await, 0);
}

#[tokio::test]
async fn completion_is_fixed_snippet_list() {
    let mut client = Client::start();
    client.initialize().await;

    let response = client
        .request(
            "textDocument/completion",
            json!({ "textDocument": { "uri": URI }, "position": { "line": 0, "character": 0 } }),
        )
        .await;
    let labels: Vec<&str> = response["result"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["label"].as_str().unwrap())
        .collect();
    assert_eq!(
        labels,
        vec!["server", "endpoint", "func", "class", "GET", "POST", "json"]
    );

    assert_eq!(client.finish(true).await, 0);
}

#[tokio::test]
async fn queries_after_shutdown_are_still_answered() {
    let mut client = Client::start();
    client.initialize().await;
    client.open(SOURCE).await;
    let _ = client.diagnostics().await;

    let response = client.request("shutdown", Value::Null).await;
    assert!(response["result"].is_null());
    let hover = client.hover(0, 1).await;
    assert!(hover["result"]["contents"]["value"]
        .as_str()
        .unwrap()
        .contains("Active port: `8080`"));

    client.notify("exit", Value::Null).await;
    let code = client.server.await.unwrap().unwrap();
    assert_eq!(code, 0);
}
