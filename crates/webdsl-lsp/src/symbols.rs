//! Document symbols: the outline as a nested tree.
//!
//! Top-level order is server, endpoints, functions, classes; source
//! interleaving between the groups is not preserved.
use webdsl_core::{build_outline, Outline, Span};

use crate::types::{DocumentSymbol, LspRange, SymbolKind};

fn range(line: usize, span: Span) -> LspRange {
    let line = u32::try_from(line).unwrap_or(u32::MAX);
    let col = |c: usize| u32::try_from(c).unwrap_or(u32::MAX);
    LspRange::on_line(line, col(span.start), col(span.end))
}

fn symbol(
    name: String,
    detail: Option<String>,
    kind: SymbolKind,
    line: usize,
    span: Span,
) -> DocumentSymbol {
    let range = range(line, span);
    DocumentSymbol {
        name,
        detail,
        kind,
        range,
        selection_range: range,
        children: Vec::new(),
    }
}

/// Convert an outline into document symbols.
pub fn outline_symbols(outline: &Outline) -> Vec<DocumentSymbol> {
    let mut out = Vec::with_capacity(
        usize::from(outline.server.is_some())
            + outline.endpoints.len()
            + outline.functions.len()
            + outline.classes.len(),
    );

    if let Some(server) = &outline.server {
        out.push(symbol(
            "server".to_string(),
            Some(format!("port {}", server.port)),
            SymbolKind::Namespace,
            server.line,
            server.span,
        ));
    }

    out.extend(outline.endpoints.iter().map(|e| {
        symbol(
            format!("{} {}", e.method, e.path),
            Some("endpoint".to_string()),
            SymbolKind::Function,
            e.line,
            e.span,
        )
    }));

    out.extend(outline.functions.iter().map(|f| {
        symbol(
            f.name.clone(),
            Some("func".to_string()),
            SymbolKind::Function,
            f.line,
            f.span,
        )
    }));

    out.extend(outline.classes.iter().map(|c| {
        let mut class = symbol(c.name.clone(), None, SymbolKind::Class, c.line, c.span);
        class.children = c
            .methods
            .iter()
            .map(|m| {
                symbol(
                    m.name.clone(),
                    Some(format!("({})", m.args)),
                    SymbolKind::Method,
                    m.line,
                    m.span,
                )
            })
            .collect();
        class
    }));

    out
}

/// Document symbols for `text`.
pub fn document_symbols(text: &str) -> Vec<DocumentSymbol> {
    outline_symbols(&build_outline(text))
}
