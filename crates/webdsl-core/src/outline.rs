//! Lexical outline of a DSL document.
//!
//! [`build_outline`] scans physical lines with a handful of anchored
//! patterns and never consults the parser, so it produces a usable
//! structural index for any input: empty text, half-typed declarations,
//! truncated class blocks or binary garbage.
use std::sync::OnceLock;

use regex::Regex;

use crate::position::{indentation, Span};

/// The `server <port>` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerOutline {
    pub port: u16,
    pub line: usize,
    pub span: Span,
}

/// An `endpoint <METHOD> "<path>"` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointOutline {
    /// HTTP method as written (e.g. `GET`).
    pub method: String,
    /// Path with surrounding quotes removed.
    pub path: String,
    pub line: usize,
    pub span: Span,
}

/// A top-level `func <name>(<args>)` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionOutline {
    pub name: String,
    /// Raw text between the parentheses, trimmed.
    pub args: String,
    pub line: usize,
    pub span: Span,
}

/// A method declared inside a `class` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodOutline {
    pub name: String,
    pub args: String,
    pub line: usize,
    pub span: Span,
}

/// A `class <Name>:` block and its methods in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassOutline {
    pub name: String,
    pub line: usize,
    pub span: Span,
    pub methods: Vec<MethodOutline>,
}

/// Structural index of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    /// The active server declaration. When several are present the last
    /// one in the document wins.
    pub server: Option<ServerOutline>,
    pub endpoints: Vec<EndpointOutline>,
    pub functions: Vec<FunctionOutline>,
    pub classes: Vec<ClassOutline>,
}

impl Outline {
    /// Total number of methods across all classes.
    pub fn method_count(&self) -> usize {
        self.classes.iter().map(|c| c.methods.len()).sum()
    }
}

#[cfg(test)]
impl Outline {
    fn is_empty(&self) -> bool {
        self.server.is_none()
            && self.endpoints.is_empty()
            && self.functions.is_empty()
            && self.classes.is_empty()
    }
}

struct Patterns {
    server: Regex,
    endpoint: Regex,
    func: Regex,
    class: Regex,
    method: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        server: Regex::new(r"^server\s+(\d+)\b").expect("server pattern"),
        endpoint: Regex::new(r#"^endpoint\s+([A-Za-z]+)\s+(?:"([^"]*)"?|([^\s:"]+))"#)
            .expect("endpoint pattern"),
        func: Regex::new(r"^func\s+([A-Za-z_][A-Za-z0-9_]*)\s*(?:\(([^)]*)\)?)?")
            .expect("func pattern"),
        class: Regex::new(r"^class\s+([A-Za-z_][A-Za-z0-9_]*)").expect("class pattern"),
        method: Regex::new(r"^(?:method|func)\s+([A-Za-z_][A-Za-z0-9_]*)\s*(?:\(([^)]*)\)?)?")
            .expect("method pattern"),
    })
}

/// Build the outline of `text` in a single pass over its lines.
///
/// Declarations are matched on the trimmed line at any indentation, so a
/// `func` line inside an endpoint body is recorded as a function.
/// A class body is every following line indented deeper than the `class`
/// line; only method declarations inside it are recorded. Blank lines do
/// not close the block, the first non-blank line at the class's
/// indentation or shallower does.
pub fn build_outline(text: &str) -> Outline {
    let pats = patterns();
    let mut outline = Outline::default();
    let mut open_class: Option<(usize, ClassOutline)> = None;

    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let indent = indentation(line);
        let content = line.trim_start();

        if let Some((class_indent, class)) = open_class.as_mut() {
            if indent > *class_indent {
                if let Some(caps) = pats.method.captures(content) {
                    class.methods.push(MethodOutline {
                        name: caps[1].to_string(),
                        args: optional_group(&caps, 2),
                        line: line_no,
                        span: Span::of_content(line),
                    });
                }
                continue;
            }
            if let Some((_, class)) = open_class.take() {
                outline.classes.push(class);
            }
        }

        if let Some(caps) = pats.server.captures(content) {
            if let Ok(port) = caps[1].parse::<u16>() {
                outline.server = Some(ServerOutline {
                    port,
                    line: line_no,
                    span: Span::of_content(line),
                });
            }
        } else if let Some(caps) = pats.endpoint.captures(content) {
            let path = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            outline.endpoints.push(EndpointOutline {
                method: caps[1].to_string(),
                path,
                line: line_no,
                span: Span::of_content(line),
            });
        } else if let Some(caps) = pats.func.captures(content) {
            outline.functions.push(FunctionOutline {
                name: caps[1].to_string(),
                args: optional_group(&caps, 2),
                line: line_no,
                span: Span::of_content(line),
            });
        } else if let Some(caps) = pats.class.captures(content) {
            open_class = Some((
                indent,
                ClassOutline {
                    name: caps[1].to_string(),
                    line: line_no,
                    span: Span::of_content(line),
                    methods: Vec::new(),
                },
            ));
        }
    }

    if let Some((_, class)) = open_class {
        outline.classes.push(class);
    }

    tracing::trace!(
        endpoints = outline.endpoints.len(),
        functions = outline.functions.len(),
        classes = outline.classes.len(),
        methods = outline.method_count(),
        "outline built"
    );
    outline
}

fn optional_group(caps: &regex::Captures<'_>, index: usize) -> String {
    caps.get(index)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}
