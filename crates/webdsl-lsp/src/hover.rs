//! Hover: Markdown for the word under the cursor.
//!
//! Keywords get canned explanations; declared names are resolved through a
//! [`SymbolIndex`] built from the current text. No range is reported.
use std::fmt::Write as _;

use webdsl_core::{build_outline, Outline, SymbolIndex};

use crate::types::{Hover, LspPosition, MarkupContent};

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ':' | '/' | '"')
}

/// The raw word touching column `col` of `line`, counted in chars.
///
/// Returns `None` when the character at `col` is not a word character.
pub fn word_at(line: &str, col: usize) -> Option<&str> {
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let (_, at) = *chars.get(col)?;
    if !is_word_char(at) {
        return None;
    }

    let mut start = col;
    while start > 0 && is_word_char(chars[start - 1].1) {
        start -= 1;
    }
    let mut end = col + 1;
    while end < chars.len() && is_word_char(chars[end].1) {
        end += 1;
    }

    let from = chars[start].0;
    let to = chars.get(end).map_or(line.len(), |(i, _)| *i);
    Some(&line[from..to])
}

/// Strip trailing `:` then one surrounding pair of quotes, each side
/// independently.
pub fn normalize_word(word: &str) -> &str {
    let word = word.trim_end_matches(':');
    let word = word.strip_prefix('"').unwrap_or(word);
    word.strip_suffix('"').unwrap_or(word)
}

/// Char index of the character covering UTF-16 offset `units` in `line`.
/// An offset inside a surrogate pair maps to that character; one past the
/// end maps to the char count.
fn char_index(line: &str, units: usize) -> usize {
    let mut seen = 0;
    for (i, c) in line.chars().enumerate() {
        seen += c.len_utf16();
        if seen > units {
            return i;
        }
    }
    line.chars().count()
}

/// Hover for `position` in `text`, or `None`. `position.character` is a
/// UTF-16 offset.
pub fn hover(text: &str, position: LspPosition) -> Option<Hover> {
    let line = text.lines().nth(position.line as usize)?;
    let col = char_index(line, position.character as usize);
    let word = normalize_word(word_at(line, col)?);
    if word.is_empty() {
        return None;
    }

    let outline = build_outline(text);
    let markdown = describe(word, &outline)?;
    Some(Hover {
        contents: MarkupContent::markdown(markdown),
        range: None,
    })
}

fn describe(word: &str, outline: &Outline) -> Option<String> {
    if let Some(doc) = keyword_doc(word) {
        let mut out = doc.to_string();
        if word == "server" {
            if let Some(server) = &outline.server {
                let _ = write!(
                    out,
                    "\n\nActive port: `{}` (line {})",
                    server.port,
                    server.line + 1
                );
            }
        }
        return Some(out);
    }

    let index = SymbolIndex::build(outline);

    if let Some(func) = index.function(word) {
        return Some(format!(
            "**func** `{}({})`\n\nDeclared on line {}.",
            func.name,
            func.args,
            func.line + 1
        ));
    }

    if let Some(class) = index.class(word) {
        let mut out = format!("**class** `{}`\n\nDeclared on line {}.", class.name, class.line + 1);
        if class.methods.is_empty() {
            out.push_str("\n\nNo methods.");
        } else {
            out.push_str("\n\nMethods:");
            for method in &class.methods {
                let _ = write!(out, "\n- `{}({})`", method.name, method.args);
            }
        }
        return Some(out);
    }

    let methods = index.methods(word);
    if !methods.is_empty() {
        let mut out = format!("**method** `{}`\n", word);
        for site in methods {
            let _ = write!(
                out,
                "\n- `{}.{}` (line {})",
                site.class_name,
                site.method.name,
                site.method.line + 1
            );
        }
        return Some(out);
    }

    let endpoints = index.endpoints(word);
    if !endpoints.is_empty() {
        let mut out = format!("**endpoint** `{}`\n", word);
        for endpoint in endpoints {
            let _ = write!(out, "\n- `{}` (line {})", endpoint.method, endpoint.line + 1);
        }
        return Some(out);
    }

    None
}

fn keyword_doc(word: &str) -> Option<&'static str> {
    match word {
        "server" => Some(
            "**server** `<port>`\n\nDeclares the port the HTTP server listens on.\n\n```webdsl\nserver 8080\n```",
        ),
        "endpoint" => Some(
            "**endpoint** `<METHOD> \"<path>\": <body>`\n\nDeclares a route. The body is an expression or an indented block.\n\n```webdsl\nendpoint GET \"/users\":\n    json { \"users\": [] }\n```",
        ),
        "func" => Some(
            "**func** `<name>(<args>): <expr>`\n\nDeclares a function callable from endpoint bodies.\n\n```webdsl\nfunc add(a, b): a + b\n```",
        ),
        "class" => Some(
            "**class** `<Name>:`\n\nDeclares a class. Methods are indented below it.\n\n```webdsl\nclass Greeter:\n    method hello(name): \"Hello \" + name\n```",
        ),
        "GET" => Some(
            "**GET** HTTP method\n\nRetrieves a resource without side effects.\n\n```webdsl\nendpoint GET \"/users\": json { \"users\": [] }\n```",
        ),
        "POST" => Some(
            "**POST** HTTP method\n\nSubmits data to create or process a resource.\n\n```webdsl\nendpoint POST \"/users\": json { \"created\": true }\n```",
        ),
        _ => None,
    }
}
