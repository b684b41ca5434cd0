//! Parser seam and the reference line-oriented parser.
//!
//! The analysis engine only sees the [`Parser`] trait and the message of a
//! [`ParseFailure`]; any implementation whose failure messages follow the
//! `Line N: <message>` shape can be plugged in.
use crate::ast::{Ast, Body, HttpMethod, Item, Method};
use crate::error::SyntaxError;

/// An opaque parse failure.
///
/// The message is expected to look like `Line N: <message>` but consumers
/// must cope with any text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub message: String,
}

impl ParseFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<SyntaxError> for ParseFailure {
    fn from(err: SyntaxError) -> Self {
        Self::new(err.to_string())
    }
}

/// Turns document text into an [`Ast`].
///
/// Implementations must return in bounded time for any input.
pub trait Parser: Send + Sync {
    fn parse(&self, text: &str) -> Result<Ast, ParseFailure>;
}

/// The built-in parser for the reference grammar.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceParser;

impl Parser for ReferenceParser {
    fn parse(&self, text: &str) -> Result<Ast, ParseFailure> {
        parse_document(text).map_err(ParseFailure::from)
    }
}

/// A declaration whose block may still receive indented lines.
enum Pending {
    Endpoint {
        method: HttpMethod,
        path: String,
        body: Body,
        line: usize,
    },
    Function {
        name: String,
        params: Vec<String>,
        body: Body,
        line: usize,
    },
    Class {
        name: String,
        methods: Vec<Method>,
        member_indent: Option<usize>,
        line: usize,
    },
}

/// Parse a whole document, stopping at the first error.
///
/// Blocks are delimited by indentation; `#` starts a comment line.
pub fn parse_document(text: &str) -> Result<Ast, SyntaxError> {
    let mut items = Vec::new();
    let mut pending: Option<Pending> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = raw.trim();
        if content.is_empty() || content.starts_with('#') {
            continue;
        }
        let indent = raw.chars().take_while(|c| c.is_whitespace()).count();

        if indent == 0 {
            if let Some(done) = pending.take() {
                items.push(finish(done)?);
            }
            pending = parse_declaration(content, line, &mut items)?;
            continue;
        }

        match pending.as_mut() {
            None => return Err(SyntaxError::UnexpectedIndent { line }),
            Some(Pending::Endpoint { body, .. }) | Some(Pending::Function { body, .. }) => {
                body.lines.push(content.to_string());
            }
            Some(Pending::Class {
                methods,
                member_indent,
                ..
            }) => {
                let members_at = *member_indent.get_or_insert(indent);
                if indent == members_at {
                    methods.push(parse_method(content, line)?);
                } else if indent > members_at {
                    if let Some(method) = methods.last_mut() {
                        method.body.lines.push(content.to_string());
                    }
                } else {
                    return Err(SyntaxError::UnexpectedIndent { line });
                }
            }
        }
    }

    if let Some(done) = pending.take() {
        items.push(finish(done)?);
    }
    tracing::trace!(items = items.len(), "document parsed");
    Ok(Ast { items })
}

/// Parse a column-0 declaration. Complete items go straight into `items`;
/// block openers are returned as pending.
fn parse_declaration(
    content: &str,
    line: usize,
    items: &mut Vec<Item>,
) -> Result<Option<Pending>, SyntaxError> {
    let (keyword, rest) = content
        .split_once(char::is_whitespace)
        .unwrap_or((content, ""));
    let rest = rest.trim();

    match keyword {
        "server" => {
            let port = rest.parse::<u16>().map_err(|_| SyntaxError::InvalidPort {
                line,
                value: rest.to_string(),
            })?;
            items.push(Item::Server { port, line });
            Ok(None)
        }
        "endpoint" => {
            let (method_name, after) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let method =
                HttpMethod::from_name(method_name).ok_or_else(|| SyntaxError::UnknownMethod {
                    line,
                    method: method_name.to_string(),
                })?;
            let after = after.trim_start();
            let quoted = after
                .strip_prefix('"')
                .ok_or(SyntaxError::ExpectedPath { line })?;
            let close = quoted
                .find('"')
                .ok_or(SyntaxError::UnterminatedString { line })?;
            let path = quoted[..close].to_string();
            let inline = block_opener(&quoted[close + 1..], line, "endpoint body")?;
            Ok(Some(Pending::Endpoint {
                method,
                path,
                body: inline_body(inline),
                line,
            }))
        }
        "func" => {
            let (name, params, inline) = parse_signature(rest, line, "func")?;
            Ok(Some(Pending::Function {
                name,
                params,
                body: inline_body(inline),
                line,
            }))
        }
        "class" => {
            let (name, after) =
                take_ident(rest).ok_or(SyntaxError::ExpectedIdentifier {
                    line,
                    keyword: "class",
                })?;
            let trailing = block_opener(after, line, "class body")?;
            if !trailing.is_empty() {
                return Err(SyntaxError::UnexpectedToken {
                    line,
                    token: first_token(trailing),
                });
            }
            Ok(Some(Pending::Class {
                name: name.to_string(),
                methods: Vec::new(),
                member_indent: None,
                line,
            }))
        }
        other => Err(SyntaxError::UnexpectedToken {
            line,
            token: other.to_string(),
        }),
    }
}

fn parse_method(content: &str, line: usize) -> Result<Method, SyntaxError> {
    let (keyword, rest) = content
        .split_once(char::is_whitespace)
        .unwrap_or((content, ""));
    let keyword = match keyword {
        "method" => "method",
        "func" => "func",
        other => {
            return Err(SyntaxError::UnexpectedToken {
                line,
                token: other.to_string(),
            })
        }
    };
    let (name, params, inline) = parse_signature(rest.trim(), line, keyword)?;
    Ok(Method {
        name,
        params,
        body: inline_body(inline),
        line,
    })
}

/// Parse `name(a, b): [inline body]`.
fn parse_signature<'a>(
    rest: &'a str,
    line: usize,
    keyword: &'static str,
) -> Result<(String, Vec<String>, &'a str), SyntaxError> {
    let (name, after) = take_ident(rest).ok_or(SyntaxError::ExpectedIdentifier { line, keyword })?;
    let Some(after) = after.trim_start().strip_prefix('(') else {
        return Err(SyntaxError::UnexpectedToken {
            line,
            token: first_token(after),
        });
    };
    let close = after
        .find(')')
        .ok_or(SyntaxError::UnclosedParams { line })?;
    let params = after[..close]
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect();
    let inline = block_opener(&after[close + 1..], line, "function body")?;
    Ok((name.to_string(), params, inline))
}

/// Expect a `:` and return whatever follows it, trimmed.
fn block_opener<'a>(
    after: &'a str,
    line: usize,
    construct: &'static str,
) -> Result<&'a str, SyntaxError> {
    after
        .trim_start()
        .strip_prefix(':')
        .map(str::trim)
        .ok_or(SyntaxError::MissingColon { line, construct })
}

fn finish(pending: Pending) -> Result<Item, SyntaxError> {
    match pending {
        Pending::Endpoint {
            method,
            path,
            body,
            line,
        } => {
            if body.is_empty() {
                return Err(SyntaxError::MissingBody {
                    line,
                    construct: "endpoint",
                });
            }
            Ok(Item::Endpoint {
                method,
                path,
                body,
                line,
            })
        }
        Pending::Function {
            name,
            params,
            body,
            line,
        } => {
            if body.is_empty() {
                return Err(SyntaxError::MissingBody {
                    line,
                    construct: "function",
                });
            }
            Ok(Item::Function {
                name,
                params,
                body,
                line,
            })
        }
        Pending::Class {
            name,
            methods,
            line,
            ..
        } => {
            if let Some(empty) = methods.iter().find(|m| m.body.is_empty()) {
                return Err(SyntaxError::MissingBody {
                    line: empty.line,
                    construct: "method",
                });
            }
            Ok(Item::Class {
                name,
                methods,
                line,
            })
        }
    }
}

fn inline_body(inline: &str) -> Body {
    let mut body = Body::default();
    if !inline.is_empty() {
        body.lines.push(inline.to_string());
    }
    body
}

fn take_ident(s: &str) -> Option<(&str, &str)> {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return None,
    }
    let end = chars
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map_or(s.len(), |(i, _)| i);
    Some(s.split_at(end))
}

fn first_token(s: &str) -> String {
    s.split_whitespace()
        .next()
        .unwrap_or("end of line")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "\
# sample service
server 8080

endpoint GET \"/users\": json { \"message\": \"Hello\" }
endpoint POST \"/users\":
    create(request)
    respond(201)

func add(a, b): a + b

class Store:
    method get(key):
        lookup(key)
    func put(key, value): write(key, value)
";

    #[test]
    fn parses_valid_document() {
        let ast = parse_document(VALID).expect("valid document");
        assert_eq!(ast.items.len(), 5);
        assert_eq!(ast.servers().collect::<Vec<_>>(), vec![(8080, 2)]);
        match &ast.items[2] {
            Item::Endpoint {
                method, path, body, ..
            } => {
                assert_eq!(*method, HttpMethod::Post);
                assert_eq!(path, "/users");
                assert_eq!(body.lines, vec!["create(request)", "respond(201)"]);
            }
            other => panic!("expected endpoint, got {other:?}"),
        }
        match &ast.items[3] {
            Item::Function { name, params, .. } => {
                assert_eq!(name, "add");
                assert_eq!(params, &vec!["a".to_string(), "b".to_string()]);
            }
            other => panic!("expected function, got {other:?}"),
        }
        match &ast.items[4] {
            Item::Class { name, methods, line } => {
                assert_eq!(name, "Store");
                assert_eq!(*line, 11);
                assert_eq!(methods.len(), 2);
                assert_eq!(methods[0].body.lines, vec!["lookup(key)"]);
                assert_eq!(methods[1].params.len(), 2);
            }
            other => panic!("expected class, got {other:?}"),
        }
    }

    #[test]
    fn empty_document_is_valid() {
        assert_eq!(parse_document("").unwrap(), Ast::default());
        assert_eq!(parse_document("\n# only a comment\n").unwrap(), Ast::default());
    }

    #[test]
    fn unknown_keyword() {
        let err = parse_document("server 80\nroute \"/x\"").unwrap_err();
        assert_eq!(err.to_string(), "Line 2: unexpected token 'route'");
    }

    #[test]
    fn invalid_port() {
        let err = parse_document("server eighty").unwrap_err();
        assert_eq!(err, SyntaxError::InvalidPort { line: 1, value: "eighty".into() });
    }

    #[test]
    fn unsupported_method() {
        let err = parse_document("endpoint FETCH \"/x\": ok").unwrap_err();
        assert_eq!(err.to_string(), "Line 1: unsupported HTTP method 'FETCH'");
    }

    #[test]
    fn unterminated_path() {
        let err = parse_document("endpoint GET \"/x: ok").unwrap_err();
        assert_eq!(err, SyntaxError::UnterminatedString { line: 1 });
    }

    #[test]
    fn unquoted_path() {
        let err = parse_document("endpoint GET /x: ok").unwrap_err();
        assert_eq!(err, SyntaxError::ExpectedPath { line: 1 });
    }

    #[test]
    fn missing_colon_after_class() {
        let err = parse_document("class Foo\n  method a(): 1").unwrap_err();
        assert_eq!(err.to_string(), "Line 1: expected ':' to open class body");
    }

    #[test]
    fn unclosed_params() {
        let err = parse_document("func f(a, b: a").unwrap_err();
        assert_eq!(err, SyntaxError::UnclosedParams { line: 1 });
    }

    #[test]
    fn endpoint_without_body() {
        let err = parse_document("endpoint GET \"/a\":\nserver 80").unwrap_err();
        assert_eq!(err.to_string(), "Line 1: endpoint has no body");
    }

    #[test]
    fn method_without_body() {
        let err = parse_document("class Foo:\n  method bar():\n  method baz():\n").unwrap_err();
        assert_eq!(err.to_string(), "Line 2: method has no body");
    }

    #[test]
    fn stray_indentation() {
        let err = parse_document("  server 80").unwrap_err();
        assert_eq!(err, SyntaxError::UnexpectedIndent { line: 1 });
    }

    #[test]
    fn non_method_in_class() {
        let err = parse_document("class Foo:\n  field x\n").unwrap_err();
        assert_eq!(err.to_string(), "Line 2: unexpected token 'field'");
    }

    #[test]
    fn class_member_dedent_inside_block() {
        let err = parse_document("class Foo:\n    method a(): 1\n  method b(): 2\n").unwrap_err();
        assert_eq!(err, SyntaxError::UnexpectedIndent { line: 3 });
    }

    #[test]
    fn reference_parser_reports_line_prefixed_failure() {
        let failure = ReferenceParser.parse("server 80\n\nbogus").unwrap_err();
        assert_eq!(failure.message, "Line 3: unexpected token 'bogus'");
    }

    #[test]
    fn take_ident_splits_identifier() {
        assert_eq!(take_ident("name(x)"), Some(("name", "(x)")));
        assert_eq!(take_ident("_a1 rest"), Some(("_a1", " rest")));
        assert_eq!(take_ident("1abc"), None);
        assert_eq!(take_ident(""), None);
    }
}
