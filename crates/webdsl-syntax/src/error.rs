use thiserror::Error;

/// Errors raised by the reference parser.
///
/// Every variant renders as `Line N: <message>` with a 1-based `N`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("Line {line}: unexpected token '{token}'")]
    UnexpectedToken { line: usize, token: String },
    #[error("Line {line}: invalid port '{value}'")]
    InvalidPort { line: usize, value: String },
    #[error("Line {line}: unsupported HTTP method '{method}'")]
    UnknownMethod { line: usize, method: String },
    #[error("Line {line}: expected quoted path")]
    ExpectedPath { line: usize },
    #[error("Line {line}: unterminated string")]
    UnterminatedString { line: usize },
    #[error("Line {line}: expected identifier after '{keyword}'")]
    ExpectedIdentifier { line: usize, keyword: &'static str },
    #[error("Line {line}: expected ':' to open {construct}")]
    MissingColon {
        line: usize,
        construct: &'static str,
    },
    #[error("Line {line}: expected ')' to close parameter list")]
    UnclosedParams { line: usize },
    #[error("Line {line}: {construct} has no body")]
    MissingBody {
        line: usize,
        construct: &'static str,
    },
    #[error("Line {line}: unexpected indentation")]
    UnexpectedIndent { line: usize },
}
