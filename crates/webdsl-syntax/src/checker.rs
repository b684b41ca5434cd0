//! Static checker seam and the reference rules.
use std::collections::HashMap;

use crate::ast::{Ast, HttpMethod, Item};

/// One finding, loosely typed the way external checkers report them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckMessage {
    pub message: String,
    /// `"error"` for hard errors; anything else is treated as a warning.
    pub kind: String,
}

impl CheckMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: "error".to_string(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: "warning".to_string(),
        }
    }
}

/// Everything a checker found in one AST.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub errors: Vec<CheckMessage>,
    pub warnings: Vec<CheckMessage>,
}

/// Semantic checks over a parsed document.
///
/// Implementations must return in bounded time for any AST.
pub trait Checker: Send + Sync {
    fn check(&self, ast: &Ast) -> CheckReport;
}

/// The built-in checker.
///
/// Errors: the same `METHOD path` declared twice. Warnings: no server,
/// several servers, a function or class name declared twice, a class
/// without methods.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceChecker;

impl Checker for ReferenceChecker {
    fn check(&self, ast: &Ast) -> CheckReport {
        let mut report = CheckReport::default();

        let servers: Vec<(u16, usize)> = ast.servers().collect();
        match servers.as_slice() {
            [] => report
                .warnings
                .push(CheckMessage::warning("no server declaration")),
            [_] => {}
            [.., (port, line)] => report.warnings.push(CheckMessage::warning(format!(
                "multiple server declarations; port {port} from line {line} takes effect"
            ))),
        }

        let mut routes: HashMap<(HttpMethod, &str), usize> = HashMap::new();
        let mut functions: HashMap<&str, usize> = HashMap::new();
        let mut classes: HashMap<&str, usize> = HashMap::new();

        for item in &ast.items {
            match item {
                Item::Server { .. } => {}
                Item::Endpoint {
                    method, path, line, ..
                } => {
                    if let Some(first) = routes.insert((*method, path.as_str()), *line) {
                        report.errors.push(CheckMessage::error(format!(
                            "duplicate endpoint {method} {path} (lines {first} and {line})"
                        )));
                    }
                }
                Item::Function { name, line, .. } => {
                    if let Some(first) = functions.insert(name.as_str(), *line) {
                        report.warnings.push(CheckMessage::warning(format!(
                            "function '{name}' on line {line} shadows the one on line {first}"
                        )));
                    }
                }
                Item::Class {
                    name,
                    methods,
                    line,
                } => {
                    if let Some(first) = classes.insert(name.as_str(), *line) {
                        report.warnings.push(CheckMessage::warning(format!(
                            "class '{name}' on line {line} shadows the one on line {first}"
                        )));
                    }
                    if methods.is_empty() {
                        report.warnings.push(CheckMessage::warning(format!(
                            "class '{name}' declares no methods"
                        )));
                    }
                }
            }
        }

        tracing::trace!(
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "static check finished"
        );
        report
    }
}
