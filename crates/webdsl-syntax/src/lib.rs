//! webdsl-syntax — the parser and static checker consumed by the
//! analysis engine.
//!
//! The engine depends only on the [`Parser`] and [`Checker`] traits. The
//! reference implementations here cover the core grammar: `server`,
//! `endpoint`, `func` and `class` declarations with indented bodies.
pub mod ast;
pub mod checker;
pub mod error;
pub mod parser;

pub use ast::{Ast, Body, HttpMethod, Item, Method};
pub use checker::{CheckMessage, CheckReport, Checker, ReferenceChecker};
pub use error::SyntaxError;
pub use parser::{parse_document, ParseFailure, Parser, ReferenceParser};
