//! Tagged union: discriminant-indexed fast dispatch over a union whose
//! members all carry one constant field.

use std::collections::HashMap;

use serde_json::Value;

use crate::combinator::logical::union;
use crate::descriptor::{tag_key, Kind, Shape, ShapeRef};

/// Builds a union dispatched in O(1) on the `tag` field.
///
/// Each member is inspected structurally (through interface/strict props,
/// intersections, refinements, readonly wrappers, and nested unions) for a
/// constant literal — or closed key set — at `tag`. When every member yields
/// a distinct set of literals, validation checks the discriminant once and
/// dispatches to exactly one member; the failure tree has depth one instead
/// of the generic union's N-branch aggregate. When no consistent mapping
/// exists, this degrades to the generic ordered `union`.
pub fn tagged_union(tag: &str, members: Vec<ShapeRef>) -> ShapeRef {
    match build_index(tag, &members) {
        Some((index, literals)) => {
            let name = format!(
                "({})",
                members
                    .iter()
                    .map(|s| s.name().to_string())
                    .collect::<Vec<_>>()
                    .join(" | ")
            );
            let tag_name = literals
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" | ");
            Shape::with_kind(
                name,
                Kind::Tagged {
                    tag: tag.to_string(),
                    members,
                    index,
                    tag_name,
                },
            )
        }
        None => union(members),
    }
}

/// Maps each member's discriminant literals to its index. `None` when a
/// member exposes no usable literal at the tag, or two members claim the
/// same literal.
fn build_index(tag: &str, members: &[ShapeRef]) -> Option<(HashMap<String, usize>, Vec<Value>)> {
    let mut index = HashMap::new();
    let mut literals = Vec::new();
    for (i, member) in members.iter().enumerate() {
        let tags = tag_literals(member, tag)?;
        if tags.is_empty() {
            return None;
        }
        for lit in tags {
            if index.insert(tag_key(&lit), i).is_some() {
                return None;
            }
            literals.push(lit);
        }
    }
    Some((index, literals))
}

fn tag_literals(shape: &Shape, tag: &str) -> Option<Vec<Value>> {
    match shape.kind() {
        Kind::Interface(props) | Kind::Strict(props) => {
            let prop = props.iter().find(|p| p.key == tag)?;
            match prop.shape.kind() {
                Kind::Literal(v) => Some(vec![v.clone()]),
                Kind::Keyof(keys) => Some(keys.iter().map(|k| Value::String(k.clone())).collect()),
                _ => None,
            }
        }
        Kind::Intersection(members) => members.iter().find_map(|m| tag_literals(m, tag)),
        Kind::Refinement { base, .. } => tag_literals(base, tag),
        Kind::Readonly(inner) => tag_literals(inner, tag),
        Kind::Union(members) => {
            let mut out = Vec::new();
            for member in members {
                out.extend(tag_literals(member, tag)?);
            }
            Some(out)
        }
        _ => None,
    }
}
