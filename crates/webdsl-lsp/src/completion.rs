//! Completion: a fixed list of snippets, independent of cursor context.
//! Clients filter by prefix themselves.
use crate::types::{CompletionItem, CompletionItemKind, INSERT_TEXT_FORMAT_SNIPPET};

struct Snippet {
    label: &'static str,
    kind: CompletionItemKind,
    detail: &'static str,
    body: &'static str,
}

const SNIPPETS: &[Snippet] = &[
    Snippet {
        label: "server",
        kind: CompletionItemKind::Keyword,
        detail: "server <port>",
        body: "server ${1:8080}",
    },
    Snippet {
        label: "endpoint",
        kind: CompletionItemKind::Snippet,
        detail: "endpoint METHOD \"/path\": body",
        body: "endpoint ${1:GET} \"${2:/path}\": ${3:body}",
    },
    Snippet {
        label: "func",
        kind: CompletionItemKind::Function,
        detail: "func name(args): expr",
        body: "func ${1:name}(${2:args}): ${3:expr}",
    },
    Snippet {
        label: "class",
        kind: CompletionItemKind::Class,
        detail: "class Name: with one method",
        body: "class ${1:Name}:\n    method ${2:name}(${3:args}): ${4:body}",
    },
    Snippet {
        label: "GET",
        kind: CompletionItemKind::Keyword,
        detail: "HTTP GET",
        body: "GET",
    },
    Snippet {
        label: "POST",
        kind: CompletionItemKind::Keyword,
        detail: "HTTP POST",
        body: "POST",
    },
    Snippet {
        label: "json",
        kind: CompletionItemKind::Value,
        detail: "JSON response literal",
        body: "json { \"${1:message}\": \"${2:Hello}\" }",
    },
];

/// The completion list. Always the same items in the same order.
pub fn completions() -> Vec<CompletionItem> {
    SNIPPETS
        .iter()
        .map(|s| CompletionItem {
            label: s.label.to_string(),
            kind: s.kind,
            detail: Some(s.detail.to_string()),
            insert_text: s.body.to_string(),
            insert_text_format: INSERT_TEXT_FORMAT_SNIPPET,
            documentation: None,
        })
        .collect()
}
