//! webdsl-core — structural analysis of webdsl documents.
//!
//! Everything here is a pure function of document text: the lexical
//! [`Outline`] and the [`SymbolIndex`] derived from it. Nothing depends on
//! the parser succeeding.
pub mod index;
pub mod logging;
pub mod outline;
pub mod position;

pub use index::{MethodSite, SymbolIndex};
pub use outline::{
    build_outline, ClassOutline, EndpointOutline, FunctionOutline, MethodOutline, Outline,
    ServerOutline,
};
pub use position::Span;
