//! Syntax tree produced by a successful parse.
//!
//! Line numbers are 1-based, matching the `Line N:` convention of parse
//! failure messages.
use std::fmt;

/// HTTP methods accepted by `endpoint` declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Parse an upper-case method name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    /// The canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A block or inline body, kept as raw source lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Body {
    pub lines: Vec<String>,
}

impl Body {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A method inside a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub params: Vec<String>,
    pub body: Body,
    pub line: usize,
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Server {
        port: u16,
        line: usize,
    },
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
        line: usize,
    },
}

/// A parsed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ast {
    pub items: Vec<Item>,
}

impl Ast {
    /// Iterate over declared server ports.
    pub fn servers(&self) -> impl Iterator<Item = (u16, usize)> + '_ {
        self.items.iter().filter_map(|item| match item {
            Item::Server { port, line } => Some((*port, *line)),
            _ => None,
        })
    }
}
