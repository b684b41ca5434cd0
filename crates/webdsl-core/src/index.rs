//! Name lookup tables derived from an [`Outline`].
//!
//! An index borrows the outline it was built from and is meant to live for
//! a single query; it is rebuilt from fresh text every time.
use std::collections::HashMap;

use crate::outline::{ClassOutline, EndpointOutline, FunctionOutline, MethodOutline, Outline};

/// A method together with the name of the class declaring it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodSite<'a> {
    pub class_name: &'a str,
    pub method: &'a MethodOutline,
}

/// Definition sites keyed by name.
#[derive(Debug, Default)]
pub struct SymbolIndex<'a> {
    functions: HashMap<&'a str, &'a FunctionOutline>,
    classes: HashMap<&'a str, &'a ClassOutline>,
    methods: HashMap<&'a str, Vec<MethodSite<'a>>>,
    endpoints: HashMap<&'a str, Vec<&'a EndpointOutline>>,
}

impl<'a> SymbolIndex<'a> {
    /// Index every declaration in `outline`.
    ///
    /// Functions and classes are unique by name and the last declaration
    /// wins. Methods and endpoints keep every declaration in source order.
    pub fn build(outline: &'a Outline) -> Self {
        let mut index = Self::default();

        for func in &outline.functions {
            index.functions.insert(func.name.as_str(), func);
        }
        for class in &outline.classes {
            index.classes.insert(class.name.as_str(), class);
            for method in &class.methods {
                index
                    .methods
                    .entry(method.name.as_str())
                    .or_default()
                    .push(MethodSite {
                        class_name: class.name.as_str(),
                        method,
                    });
            }
        }
        for endpoint in &outline.endpoints {
            index
                .endpoints
                .entry(endpoint.path.as_str())
                .or_default()
                .push(endpoint);
        }

        index
    }

    /// Look up a top-level function by name.
    pub fn function(&self, name: &str) -> Option<&'a FunctionOutline> {
        self.functions.get(name).copied()
    }

    /// Look up a class by name.
    pub fn class(&self, name: &str) -> Option<&'a ClassOutline> {
        self.classes.get(name).copied()
    }

    /// Every method called `name`, across all classes.
    pub fn methods(&self, name: &str) -> &[MethodSite<'a>] {
        self.methods.get(name).map_or(&[], |v| v.as_slice())
    }

    /// Every endpoint declared with `path`.
    pub fn endpoints(&self, path: &str) -> &[&'a EndpointOutline] {
        self.endpoints.get(path).map_or(&[], |v| v.as_slice())
    }
}
