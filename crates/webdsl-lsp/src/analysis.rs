//! Parse adapter: runs the parser and checker over a text snapshot and
//! converts their loosely-typed output into [`Diagnostic`]s.
use std::sync::{Arc, OnceLock};

use regex::Regex;
use webdsl_config::DiagnosticsConfig;
use webdsl_syntax::{Ast, CheckMessage, Checker, Parser, ReferenceChecker, ReferenceParser};

use crate::types::{Diagnostic, DiagnosticSeverity, LspRange};

/// Result of analysing one text snapshot.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    /// Parse error (at most one) followed by checker findings.
    pub diagnostics: Vec<Diagnostic>,
    /// The AST, when parsing succeeded.
    pub ast: Option<Ast>,
}

fn line_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^\s*Line\s+(\d+)\s*:\s*(.*)$").expect("line prefix pattern"))
}

/// Wraps a [`Parser`] and [`Checker`] pair.
#[derive(Clone)]
pub struct Analyzer {
    parser: Arc<dyn Parser>,
    checker: Arc<dyn Checker>,
    source: String,
    parse_error_width: u32,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("source", &self.source)
            .field("parse_error_width", &self.parse_error_width)
            .finish_non_exhaustive()
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::reference(&DiagnosticsConfig::default())
    }
}

impl Analyzer {
    /// Build an analyzer around arbitrary collaborators.
    pub fn new(
        parser: Arc<dyn Parser>,
        checker: Arc<dyn Checker>,
        config: &DiagnosticsConfig,
    ) -> Self {
        Self {
            parser,
            checker,
            source: config.source.clone(),
            parse_error_width: config.parse_error_width.max(1),
        }
    }

    /// Analyzer using the built-in parser and checker.
    pub fn reference(config: &DiagnosticsConfig) -> Self {
        Self::new(Arc::new(ReferenceParser), Arc::new(ReferenceChecker), config)
    }

    /// Parse, then check if parsing succeeded.
    ///
    /// A parse failure yields exactly one diagnostic and skips the checker.
    pub fn analyze(&self, text: &str) -> Analysis {
        match self.parser.parse(text) {
            Err(failure) => {
                tracing::debug!(message = %failure.message, "parse failed");
                Analysis {
                    diagnostics: vec![self.parse_error(&failure.message)],
                    ast: None,
                }
            }
            Ok(ast) => {
                let report = self.checker.check(&ast);
                let diagnostics = report
                    .errors
                    .iter()
                    .chain(report.warnings.iter())
                    .map(|finding| self.check_finding(finding))
                    .collect();
                Analysis {
                    diagnostics,
                    ast: Some(ast),
                }
            }
        }
    }

    /// Convert a parser message of the form `Line N: <msg>`.
    ///
    /// Anchored on 0-based line `N-1`, columns `[0, parse_error_width)`. A
    /// message without a usable line number is kept verbatim at `[0, 1)` on
    /// the first line.
    pub fn parse_error(&self, message: &str) -> Diagnostic {
        let located = line_prefix().captures(message).and_then(|caps| {
            let line: u32 = caps.get(1)?.as_str().parse().ok()?;
            let rest = caps.get(2).map_or("", |m| m.as_str()).trim();
            Some((line.saturating_sub(1), rest))
        });

        match located {
            Some((line, rest)) => Diagnostic {
                range: LspRange::on_line(line, 0, self.parse_error_width),
                severity: DiagnosticSeverity::Error,
                message: if rest.is_empty() {
                    message.to_string()
                } else {
                    rest.to_string()
                },
                source: self.source.clone(),
            },
            None => {
                tracing::warn!(message, "parser message has no line number");
                Diagnostic {
                    range: LspRange::on_line(0, 0, 1),
                    severity: DiagnosticSeverity::Error,
                    message: message.to_string(),
                    source: self.source.clone(),
                }
            }
        }
    }

    /// Convert one checker finding. The checker reports no positions, so
    /// every finding sits at `(0,0)-(0,1)`.
    pub fn check_finding(&self, finding: &CheckMessage) -> Diagnostic {
        let severity = if finding.kind == "error" {
            DiagnosticSeverity::Error
        } else {
            DiagnosticSeverity::Warning
        };
        Diagnostic {
            range: LspRange::on_line(0, 0, 1),
            severity,
            message: finding.message.clone(),
            source: self.source.clone(),
        }
    }
}
