//! webdsl-lsp: language server for webdsl documents.
//!
//! Speaks JSON-RPC over stdio, keeps full copies of open documents, and
//! answers diagnostics, hover, completion and document-symbol traffic from
//! the current text. The launcher starts the configured server executable
//! on the editor side.
pub mod analysis;
pub mod completion;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod hover;
pub mod launcher;
pub mod outbox;
pub mod server;
pub mod session;
pub mod symbols;
pub mod transport;
pub mod types;

pub use analysis::{Analysis, Analyzer};
pub use diagnostics::DiagnosticsEngine;
pub use document::{DocumentSnapshot, DocumentStore};
pub use error::LspError;
pub use launcher::{report_launch_failure, ServerProcess};
pub use outbox::Outbox;
pub use server::{serve, Server};
pub use session::{Session, SessionState};
pub use types::{
    CompletionItem, CompletionItemKind, Diagnostic, DiagnosticSeverity, DocumentSymbol, Hover,
    LspPosition, LspRange, MarkupContent, SymbolKind,
};
