//! Logical combinators: alternation, narrowing, predicates, and constants.

use indexmap::IndexSet;
use serde_json::Value;

use crate::descriptor::{Kind, Shape, ShapeRef};

fn joined_name(members: &[ShapeRef], sep: &str) -> String {
    format!(
        "({})",
        members
            .iter()
            .map(|s| s.name().to_string())
            .collect::<Vec<_>>()
            .join(sep)
    )
}

/// Ordered alternation: members are tried in declaration order and the first
/// success wins. Order is a visible contract, not an implementation detail.
pub fn union(members: Vec<ShapeRef>) -> ShapeRef {
    let name = joined_name(&members, " | ");
    Shape::with_kind(name, Kind::Union(members))
}

/// Sequential narrowing: each member consumes the previous member's output.
pub fn intersection(members: Vec<ShapeRef>) -> ShapeRef {
    let name = joined_name(&members, " & ");
    Shape::with_kind(name, Kind::Intersection(members))
}

/// Predicate gate over `base`: succeeds only when the predicate holds for
/// the value `base` produced (the validated, possibly transformed value).
pub fn refinement<F>(base: ShapeRef, name: impl Into<String>, predicate: F) -> ShapeRef
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    Shape::with_kind(
        name,
        Kind::Refinement {
            base,
            predicate: std::sync::Arc::new(predicate),
        },
    )
}

/// Exact match against one constant, with numbers compared by value.
pub fn literal(value: impl Into<Value>) -> ShapeRef {
    let value = value.into();
    let name = value.to_string();
    Shape::with_kind(name, Kind::Literal(value))
}

/// `literal` with an explicit display name.
pub fn literal_named(value: impl Into<Value>, name: impl Into<String>) -> ShapeRef {
    Shape::with_kind(name, Kind::Literal(value.into()))
}

/// A string drawn from a fixed, closed key set.
pub fn keyof<K: Into<String>>(keys: Vec<K>) -> ShapeRef {
    let keys: IndexSet<String> = keys.into_iter().map(Into::into).collect();
    let name = keys
        .iter()
        .map(|k| format!("\"{}\"", k))
        .collect::<Vec<_>>()
        .join(" | ");
    Shape::with_kind(name, Kind::Keyof(keys))
}
