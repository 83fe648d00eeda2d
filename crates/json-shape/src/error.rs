//! Validation error tree and the reporting context derived from it.

use serde_json::Value;
use thiserror::Error;

/// A single node of the validation failure tree.
///
/// A failed decode produces exactly one root node. A node with children is an
/// aggregation point (object, array, tuple, exhausted union, intersection):
/// its own fields label the aggregation context and the offending raw values
/// live in the leaves below it.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorNode {
    /// The offending raw input at this node.
    pub value: Value,
    /// Path segment label: field name, stringified index, or branch index.
    pub key: String,
    /// Display name of the shape that was active at this node.
    pub type_name: String,
    /// Child failures, in declaration/positional order.
    pub children: Vec<ErrorNode>,
}

impl ErrorNode {
    /// A terminal failure carrying the offending value itself.
    pub fn leaf(value: Value, key: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            value,
            key: key.into(),
            type_name: type_name.into(),
            children: Vec::new(),
        }
    }

    /// An aggregation node over one or more child failures.
    pub fn branch(
        value: Value,
        key: impl Into<String>,
        type_name: impl Into<String>,
        children: Vec<ErrorNode>,
    ) -> Self {
        Self {
            value,
            key: key.into(),
            type_name: type_name.into(),
            children,
        }
    }

    /// Flattens the tree depth-first into root-to-leaf contexts.
    ///
    /// Returns one entry per leaf, in left-to-right order; each entry pairs
    /// the full path (this node included) with the leaf that ends it.
    pub fn leaves(&self) -> Vec<(Vec<ContextEntry>, &ErrorNode)> {
        let mut out = Vec::new();
        let mut trail = Vec::new();
        self.collect(&mut trail, &mut out);
        out
    }

    fn collect<'a>(
        &'a self,
        trail: &mut Vec<ContextEntry>,
        out: &mut Vec<(Vec<ContextEntry>, &'a ErrorNode)>,
    ) {
        trail.push(ContextEntry {
            key: self.key.clone(),
            type_name: self.type_name.clone(),
        });
        if self.children.is_empty() {
            out.push((trail.clone(), self));
        } else {
            for child in &self.children {
                child.collect(trail, out);
            }
        }
        trail.pop();
    }
}

/// One step of a root-to-leaf failure path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextEntry {
    pub key: String,
    pub type_name: String,
}

/// Returned by the fail-fast reporter when a decode failed.
///
/// The message is the path reporter's output, newline-joined.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DecodeError(pub String);
