//! LSP protocol types.
//!
//! The subset of the Language Server Protocol (v3.17) this server speaks.
//! Field names serialize in camelCase; enum-like kinds serialize as the
//! protocol's integer codes.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// LSP Position: 0-based line and character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LspPosition {
    /// Zero-based line number.
    pub line: u32,
    /// Zero-based character offset.
    pub character: u32,
}

impl LspPosition {
    /// Create a new LSP position.
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// LSP Range: start and end positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LspRange {
    /// Start position (inclusive).
    pub start: LspPosition,
    /// End position (exclusive).
    pub end: LspPosition,
}

impl LspRange {
    /// Create a new LSP range.
    pub fn new(start: LspPosition, end: LspPosition) -> Self {
        Self { start, end }
    }

    /// A range on a single line from `start_col` to `end_col`.
    pub fn on_line(line: u32, start_col: u32, end_col: u32) -> Self {
        Self::new(
            LspPosition::new(line, start_col),
            LspPosition::new(line, end_col),
        )
    }
}

/// Diagnostic severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum DiagnosticSeverity {
    /// Reports an error.
    Error = 1,
    /// Reports a warning.
    Warning = 2,
    /// Reports an information.
    Information = 3,
    /// Reports a hint.
    Hint = 4,
}

impl From<DiagnosticSeverity> for u8 {
    fn from(value: DiagnosticSeverity) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for DiagnosticSeverity {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, String> {
        match value {
            1 => Ok(DiagnosticSeverity::Error),
            2 => Ok(DiagnosticSeverity::Warning),
            3 => Ok(DiagnosticSeverity::Information),
            4 => Ok(DiagnosticSeverity::Hint),
            other => Err(format!("invalid diagnostic severity {}", other)),
        }
    }
}

/// A diagnostic published for a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The range at which the diagnostic applies.
    pub range: LspRange,
    /// The severity of the diagnostic.
    pub severity: DiagnosticSeverity,
    /// The diagnostic's message.
    pub message: String,
    /// The diagnostic's source tag.
    pub source: String,
}

/// Params of `textDocument/publishDiagnostics`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishDiagnosticsParams {
    /// The document the diagnostics belong to.
    pub uri: String,
    /// The complete diagnostic set; replaces any earlier set.
    pub diagnostics: Vec<Diagnostic>,
}

/// Completion item kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum CompletionItemKind {
    /// A text completion.
    Text = 1,
    /// A function completion.
    Function = 3,
    /// A class completion.
    Class = 7,
    /// A constant or value completion.
    Value = 12,
    /// A keyword completion.
    Keyword = 14,
    /// A snippet completion.
    Snippet = 15,
}

impl From<CompletionItemKind> for u8 {
    fn from(value: CompletionItemKind) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for CompletionItemKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, String> {
        match value {
            1 => Ok(Self::Text),
            3 => Ok(Self::Function),
            7 => Ok(Self::Class),
            12 => Ok(Self::Value),
            14 => Ok(Self::Keyword),
            15 => Ok(Self::Snippet),
            other => Err(format!("unsupported completion item kind {}", other)),
        }
    }
}

/// `insertTextFormat` value marking snippet syntax (`$1`, `${1:name}`).
pub const INSERT_TEXT_FORMAT_SNIPPET: u8 = 2;

/// A completion item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionItem {
    /// The label of this completion item.
    pub label: String,
    /// The kind of this completion item.
    pub kind: CompletionItemKind,
    /// A human-readable string with additional information.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Text inserted when the item is accepted.
    pub insert_text: String,
    /// Format of `insert_text`.
    pub insert_text_format: u8,
    /// Documentation for this item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

/// Markup content for hover results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupContent {
    /// The type of the markup content.
    pub kind: String,
    /// The content itself.
    pub value: String,
}

impl MarkupContent {
    /// Markdown-formatted content.
    pub fn markdown(value: impl Into<String>) -> Self {
        Self {
            kind: "markdown".to_string(),
            value: value.into(),
        }
    }
}

/// Hover information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hover {
    /// The hover's content.
    pub contents: MarkupContent,
    /// An optional range; never set by this server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<LspRange>,
}

/// Symbol kinds used in document symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum SymbolKind {
    /// A namespace symbol.
    Namespace = 3,
    /// A class symbol.
    Class = 5,
    /// A method symbol.
    Method = 6,
    /// A function symbol.
    Function = 12,
}

impl From<SymbolKind> for u8 {
    fn from(value: SymbolKind) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for SymbolKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, String> {
        match value {
            3 => Ok(Self::Namespace),
            5 => Ok(Self::Class),
            6 => Ok(Self::Method),
            12 => Ok(Self::Function),
            other => Err(format!("unsupported symbol kind {}", other)),
        }
    }
}

/// A hierarchical symbol in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSymbol {
    /// The name of this symbol.
    pub name: String,
    /// More detail, e.g. the declaring keyword.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// The kind of this symbol.
    pub kind: SymbolKind,
    /// The full range of the declaration.
    pub range: LspRange,
    /// The range to reveal when the symbol is selected.
    pub selection_range: LspRange,
    /// Nested symbols.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocumentSymbol>,
}

impl DocumentSymbol {
    /// Total number of symbols in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(DocumentSymbol::count).sum::<usize>()
    }
}

/// Identifies a text document by URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDocumentIdentifier {
    /// The document's URI.
    pub uri: String,
}

/// A document transferred on open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDocumentItem {
    /// The document's URI.
    pub uri: String,
    /// Language identifier.
    #[serde(default)]
    pub language_id: String,
    /// Client-side version number.
    #[serde(default)]
    pub version: i32,
    /// Full content.
    pub text: String,
}

/// Params of `textDocument/didOpen`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidOpenTextDocumentParams {
    /// The opened document.
    pub text_document: TextDocumentItem,
}

/// One content change; only full-document replacements are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDocumentContentChangeEvent {
    /// The new full content.
    pub text: String,
}

/// Params of `textDocument/didChange`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidChangeTextDocumentParams {
    /// The changed document.
    pub text_document: TextDocumentIdentifier,
    /// Content changes; the last one is the current full text.
    pub content_changes: Vec<TextDocumentContentChangeEvent>,
}

/// Params of `textDocument/didSave`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidSaveTextDocumentParams {
    /// The saved document.
    pub text_document: TextDocumentIdentifier,
    /// Content at save time, when the client includes it.
    #[serde(default)]
    pub text: Option<String>,
}

/// Params of `textDocument/didClose`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidCloseTextDocumentParams {
    /// The closed document.
    pub text_document: TextDocumentIdentifier,
}

/// Params of `textDocument/hover` and `textDocument/completion`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDocumentPositionParams {
    /// The document.
    pub text_document: TextDocumentIdentifier,
    /// Cursor position.
    pub position: LspPosition,
}

/// Params of `textDocument/documentSymbol`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSymbolParams {
    /// The document.
    pub text_document: TextDocumentIdentifier,
}

/// Severity of a `window/showMessage` or `window/logMessage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum MessageType {
    /// An error message.
    Error = 1,
    /// A warning message.
    Warning = 2,
    /// An information message.
    Info = 3,
    /// A log message.
    Log = 4,
}

impl From<MessageType> for u8 {
    fn from(value: MessageType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for MessageType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, String> {
        match value {
            1 => Ok(MessageType::Error),
            2 => Ok(MessageType::Warning),
            3 => Ok(MessageType::Info),
            4 => Ok(MessageType::Log),
            other => Err(format!("invalid message type {}", other)),
        }
    }
}

/// Params of `window/showMessage` and `window/logMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageParams {
    /// Message severity.
    #[serde(rename = "type")]
    pub typ: MessageType,
    /// The message text.
    pub message: String,
}

/// `textDocumentSync` value for full-document synchronization.
pub const TEXT_DOCUMENT_SYNC_FULL: u8 = 1;

/// Characters that prompt the client to request completions.
pub const COMPLETION_TRIGGER_CHARACTERS: [&str; 4] = [" ", "/", "\"", ":"];

/// Capabilities advertised in the `initialize` result.
pub fn server_capabilities() -> Value {
    serde_json::json!({
        "textDocumentSync": {
            "openClose": true,
            "change": TEXT_DOCUMENT_SYNC_FULL,
            "save": { "includeText": true }
        },
        "hoverProvider": true,
        "completionProvider": {
            "triggerCharacters": COMPLETION_TRIGGER_CHARACTERS,
            "resolveProvider": false
        },
        "documentSymbolProvider": true
    })
}

/// The full `initialize` result.
pub fn initialize_result() -> Value {
    serde_json::json!({
        "capabilities": server_capabilities(),
        "serverInfo": {
            "name": "webdsl-ls",
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}
