//! The validation algorithm: one match dispatch over `Kind`, with the
//! options threaded through every child call and a path segment pushed per
//! recursion.
//!
//! Structural kinds collect every simultaneous error at their level; union
//! and the tagged union are the deliberate exceptions (first success wins,
//! respectively single dispatch).

use serde_json::{Map, Value};

use super::{json_equal, tag_key, DecodeOptions, Kind, Outcome, Prop, Shape, ShapeRef};
use crate::error::ErrorNode;

/// Type name reported for values that should not exist at all (extra keys
/// of a strict object, excess tuple elements).
const NEVER: &str = "never";

pub(crate) fn validate_inner(
    shape: &Shape,
    value: &Value,
    key: &str,
    opts: &DecodeOptions,
) -> Result<Outcome, ErrorNode> {
    match shape.kind() {
        Kind::Null | Kind::Undefined => guard(value.is_null(), shape, value, key),
        Kind::Any => Ok(Outcome::Unchanged),
        Kind::Never => Err(failure(shape, value, key)),
        Kind::String => guard(value.is_string(), shape, value, key),
        Kind::Number => guard(value.is_number(), shape, value, key),
        Kind::Boolean => guard(value.is_boolean(), shape, value, key),
        Kind::UnknownArray => guard(value.is_array(), shape, value, key),
        Kind::UnknownRecord => guard(value.is_object(), shape, value, key),
        Kind::Literal(lit) => guard(json_equal(value, lit), shape, value, key),
        Kind::Keyof(keys) => {
            let hit = value.as_str().is_some_and(|s| keys.contains(s));
            guard(hit, shape, value, key)
        }
        Kind::Interface(props) => validate_props(shape, props, false, value, key, opts),
        Kind::Partial(props) => validate_props(shape, props, true, value, key, opts),
        Kind::Strict(props) => validate_strict(shape, props, value, key, opts),
        Kind::Array(elem) => validate_array(shape, elem, value, key, opts),
        Kind::ReadonlyArray(elem) => {
            let out = validate_array(shape, elem, value, key, opts)?;
            Ok(isolate(out, value, opts))
        }
        Kind::Dictionary { domain, codomain } => {
            validate_dictionary(shape, domain, codomain, value, key, opts)
        }
        Kind::Tuple(items) => validate_tuple(shape, items, value, key, opts),
        Kind::Union(members) => validate_union(shape, members, value, key, opts),
        Kind::Intersection(members) => validate_intersection(shape, members, value, key, opts),
        Kind::Refinement { base, predicate } => {
            let out = validate_inner(base, value, key, opts)?;
            let checked = match &out {
                Outcome::Changed(v) => v,
                Outcome::Unchanged => value,
            };
            if predicate(checked) {
                Ok(out)
            } else {
                // The predicate saw the validated value, so the error
                // records that value, not the raw input.
                Err(ErrorNode::leaf(checked.clone(), key, shape.name()))
            }
        }
        Kind::Readonly(inner) => {
            let out = validate_inner(inner, value, key, opts)?;
            Ok(isolate(out, value, opts))
        }
        Kind::Recursive(cell) => validate_inner(cell.resolve(), value, key, opts),
        Kind::Tagged {
            tag,
            members,
            index,
            tag_name,
        } => validate_tagged(shape, tag, members, index, tag_name, value, key, opts),
        Kind::Pipe { from, to } => {
            let first = validate_inner(from, value, key, opts)?;
            match first {
                Outcome::Unchanged => validate_inner(to, value, key, opts),
                Outcome::Changed(mid) => match validate_inner(to, &mid, key, opts)? {
                    Outcome::Unchanged => Ok(Outcome::Changed(mid)),
                    changed => Ok(changed),
                },
            }
        }
        Kind::Codec { parse, .. } => match parse(value) {
            Some(decoded) => Ok(Outcome::Changed(decoded)),
            None => Err(failure(shape, value, key)),
        },
    }
}

fn failure(shape: &Shape, value: &Value, key: &str) -> ErrorNode {
    ErrorNode::leaf(value.clone(), key, shape.name())
}

fn guard(ok: bool, shape: &Shape, value: &Value, key: &str) -> Result<Outcome, ErrorNode> {
    if ok {
        Ok(Outcome::Unchanged)
    } else {
        Err(failure(shape, value, key))
    }
}

fn isolate(out: Outcome, value: &Value, opts: &DecodeOptions) -> Outcome {
    if opts.isolate_readonly {
        if let Outcome::Unchanged = out {
            return Outcome::Changed(value.clone());
        }
    }
    out
}

/// Shared open-object loop for interface, partial, and strict's first pass.
///
/// Missing fields validate the absent marker (JSON null) unless
/// `skip_missing` (partial) is set; all field errors are collected before
/// returning. Extra keys pass through untouched. The input map is cloned at
/// most once, on the first field whose decoded value differs.
fn validate_props(
    shape: &Shape,
    props: &[Prop],
    skip_missing: bool,
    value: &Value,
    key: &str,
    opts: &DecodeOptions,
) -> Result<Outcome, ErrorNode> {
    let obj = match value.as_object() {
        Some(obj) => obj,
        None => return Err(failure(shape, value, key)),
    };
    let mut errors = Vec::new();
    let mut out: Option<Map<String, Value>> = None;
    for prop in props {
        let field = obj.get(&prop.key);
        if field.is_none() && skip_missing {
            continue;
        }
        let missing = field.is_none();
        let actual = field.unwrap_or(&Value::Null);
        match validate_inner(&prop.shape, actual, &prop.key, opts) {
            Err(child) => errors.push(child),
            Ok(Outcome::Unchanged) => {
                if missing {
                    // The field validated as absent: materialize it.
                    out.get_or_insert_with(|| obj.clone())
                        .insert(prop.key.clone(), Value::Null);
                }
            }
            Ok(Outcome::Changed(decoded)) => {
                out.get_or_insert_with(|| obj.clone())
                    .insert(prop.key.clone(), decoded);
            }
        }
    }
    if !errors.is_empty() {
        return Err(ErrorNode::branch(value.clone(), key, shape.name(), errors));
    }
    Ok(match out {
        Some(map) => Outcome::Changed(Value::Object(map)),
        None => Outcome::Unchanged,
    })
}

/// Open-object pass first; on success, every own key of the intermediate
/// result that is not declared fails against `never` at that key.
fn validate_strict(
    shape: &Shape,
    props: &[Prop],
    value: &Value,
    key: &str,
    opts: &DecodeOptions,
) -> Result<Outcome, ErrorNode> {
    let out = validate_props(shape, props, false, value, key, opts)?;
    let scanned = match &out {
        Outcome::Changed(decoded) => decoded.as_object(),
        Outcome::Unchanged => value.as_object(),
    };
    if let Some(map) = scanned {
        let mut extra = Vec::new();
        for (k, v) in map {
            if !props.iter().any(|p| p.key == *k) {
                extra.push(ErrorNode::leaf(v.clone(), k.clone(), NEVER));
            }
        }
        if !extra.is_empty() {
            return Err(ErrorNode::branch(value.clone(), key, shape.name(), extra));
        }
    }
    Ok(out)
}

fn validate_array(
    shape: &Shape,
    elem: &ShapeRef,
    value: &Value,
    key: &str,
    opts: &DecodeOptions,
) -> Result<Outcome, ErrorNode> {
    let arr = match value.as_array() {
        Some(arr) => arr,
        None => return Err(failure(shape, value, key)),
    };
    let mut errors = Vec::new();
    let mut out: Option<Vec<Value>> = None;
    for (i, item) in arr.iter().enumerate() {
        match validate_inner(elem, item, &i.to_string(), opts) {
            Err(child) => errors.push(child),
            Ok(Outcome::Unchanged) => {}
            Ok(Outcome::Changed(decoded)) => {
                out.get_or_insert_with(|| arr.clone())[i] = decoded;
            }
        }
    }
    if !errors.is_empty() {
        return Err(ErrorNode::branch(value.clone(), key, shape.name(), errors));
    }
    Ok(match out {
        Some(items) => Outcome::Changed(Value::Array(items)),
        None => Outcome::Unchanged,
    })
}

/// Fixed arity: missing indices validate the absent marker, every index at
/// or past the declared length is rejected against `never`.
fn validate_tuple(
    shape: &Shape,
    items: &[ShapeRef],
    value: &Value,
    key: &str,
    opts: &DecodeOptions,
) -> Result<Outcome, ErrorNode> {
    let arr = match value.as_array() {
        Some(arr) => arr,
        None => return Err(failure(shape, value, key)),
    };
    let mut errors = Vec::new();
    let mut out: Option<Vec<Value>> = None;
    for (i, item_shape) in items.iter().enumerate() {
        let field = arr.get(i);
        let missing = field.is_none();
        let actual = field.unwrap_or(&Value::Null);
        match validate_inner(item_shape, actual, &i.to_string(), opts) {
            Err(child) => errors.push(child),
            Ok(Outcome::Unchanged) => {
                if missing {
                    let patched = out.get_or_insert_with(|| arr.clone());
                    while patched.len() <= i {
                        patched.push(Value::Null);
                    }
                }
            }
            Ok(Outcome::Changed(decoded)) => {
                let patched = out.get_or_insert_with(|| arr.clone());
                while patched.len() <= i {
                    patched.push(Value::Null);
                }
                patched[i] = decoded;
            }
        }
    }
    for (i, excess) in arr.iter().enumerate().skip(items.len()) {
        errors.push(ErrorNode::leaf(excess.clone(), i.to_string(), NEVER));
    }
    if !errors.is_empty() {
        return Err(ErrorNode::branch(value.clone(), key, shape.name(), errors));
    }
    Ok(match out {
        Some(items) => Outcome::Changed(Value::Array(items)),
        None => Outcome::Unchanged,
    })
}

/// Validates each entry's key (as a JSON string) against the domain and its
/// value against the codomain, both tagged with the entry key. The map is
/// rebuilt only when some key or value was transformed; a decoded key that
/// is not a JSON string is re-keyed by its compact JSON rendering.
fn validate_dictionary(
    shape: &Shape,
    domain: &ShapeRef,
    codomain: &ShapeRef,
    value: &Value,
    key: &str,
    opts: &DecodeOptions,
) -> Result<Outcome, ErrorNode> {
    let obj = match value.as_object() {
        Some(obj) => obj,
        None => return Err(failure(shape, value, key)),
    };
    let mut errors = Vec::new();
    let mut entries: Vec<(Option<String>, Option<Value>)> = Vec::with_capacity(obj.len());
    for (k, v) in obj {
        let mut decoded_key = None;
        match validate_inner(domain, &Value::String(k.clone()), k, opts) {
            Err(child) => errors.push(child),
            Ok(Outcome::Unchanged) => {}
            Ok(Outcome::Changed(new_key)) => decoded_key = Some(render_key(&new_key)),
        }
        let mut decoded_val = None;
        match validate_inner(codomain, v, k, opts) {
            Err(child) => errors.push(child),
            Ok(Outcome::Unchanged) => {}
            Ok(Outcome::Changed(new_val)) => decoded_val = Some(new_val),
        }
        entries.push((decoded_key, decoded_val));
    }
    if !errors.is_empty() {
        return Err(ErrorNode::branch(value.clone(), key, shape.name(), errors));
    }
    if entries.iter().all(|(k, v)| k.is_none() && v.is_none()) {
        return Ok(Outcome::Unchanged);
    }
    let mut rebuilt = Map::new();
    for ((k, v), (new_key, new_val)) in obj.iter().zip(entries) {
        rebuilt.insert(
            new_key.unwrap_or_else(|| k.clone()),
            new_val.unwrap_or_else(|| v.clone()),
        );
    }
    Ok(Outcome::Changed(Value::Object(rebuilt)))
}

pub(crate) fn render_key(decoded: &Value) -> String {
    match decoded {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Ordered alternation: the first member that succeeds wins outright. Only
/// when every member fails does the union aggregate the full per-branch
/// subtrees, each keyed by its branch index.
fn validate_union(
    shape: &Shape,
    members: &[ShapeRef],
    value: &Value,
    key: &str,
    opts: &DecodeOptions,
) -> Result<Outcome, ErrorNode> {
    let mut errors = Vec::new();
    for (i, member) in members.iter().enumerate() {
        match validate_inner(member, value, &i.to_string(), opts) {
            Ok(out) => return Ok(out),
            Err(child) => errors.push(child),
        }
    }
    Err(ErrorNode::branch(value.clone(), key, shape.name(), errors))
}

/// Sequential narrowing: each member consumes the previous member's output.
/// A failing branch's children are spliced flat into the intersection's own
/// error list — one level shallower than the union's nesting. A leaf branch
/// failure has nothing to splice and is pushed as-is.
fn validate_intersection(
    shape: &Shape,
    members: &[ShapeRef],
    value: &Value,
    key: &str,
    opts: &DecodeOptions,
) -> Result<Outcome, ErrorNode> {
    let mut errors = Vec::new();
    let mut current: Option<Value> = None;
    for (i, member) in members.iter().enumerate() {
        let input = current.as_ref().unwrap_or(value);
        match validate_inner(member, input, &i.to_string(), opts) {
            Ok(Outcome::Unchanged) => {}
            Ok(Outcome::Changed(decoded)) => current = Some(decoded),
            Err(child) => {
                if child.children.is_empty() {
                    errors.push(child);
                } else {
                    errors.extend(child.children);
                }
            }
        }
    }
    if !errors.is_empty() {
        return Err(ErrorNode::branch(value.clone(), key, shape.name(), errors));
    }
    Ok(match current {
        Some(decoded) => Outcome::Changed(decoded),
        None => Outcome::Unchanged,
    })
}

/// Discriminant fast dispatch: one membership check on the tag field, then
/// exactly one member validation. The failure tree has depth one — either a
/// single leaf at the tag key or the single dispatched branch.
#[allow(clippy::too_many_arguments)]
fn validate_tagged(
    shape: &Shape,
    tag: &str,
    members: &[ShapeRef],
    index: &std::collections::HashMap<String, usize>,
    tag_name: &str,
    value: &Value,
    key: &str,
    opts: &DecodeOptions,
) -> Result<Outcome, ErrorNode> {
    let obj = match value.as_object() {
        Some(obj) => obj,
        None => return Err(failure(shape, value, key)),
    };
    let tag_value = obj.get(tag).cloned().unwrap_or(Value::Null);
    match index.get(&tag_key(&tag_value)) {
        Some(&i) => match validate_inner(&members[i], value, &i.to_string(), opts) {
            Ok(out) => Ok(out),
            Err(child) => Err(ErrorNode::branch(
                value.clone(),
                key,
                shape.name(),
                vec![child],
            )),
        },
        None => {
            let child = ErrorNode::leaf(tag_value, tag, tag_name);
            Err(ErrorNode::branch(
                value.clone(),
                key,
                shape.name(),
                vec![child],
            ))
        }
    }
}
