//! Encoding: the structural dual of validation, applied only to values the
//! shape already accepts.
//!
//! `encode_opt` returns `None` when the encoder is the identity transform,
//! so identity compositions (and all-identity containers) allocate nothing.

use serde_json::{Map, Value};

use super::validate::render_key;
use super::{tag_key, Kind, Prop, Shape};

pub(crate) fn encode_opt(shape: &Shape, value: &Value) -> Option<Value> {
    match shape.kind() {
        Kind::Null
        | Kind::Undefined
        | Kind::Any
        | Kind::String
        | Kind::Number
        | Kind::Boolean
        | Kind::UnknownArray
        | Kind::UnknownRecord
        | Kind::Literal(_)
        | Kind::Keyof(_) => None,
        Kind::Never => panic!("cannot encode a value of the `never` shape"),
        Kind::Interface(props) | Kind::Strict(props) => encode_props(props, value, false),
        Kind::Partial(props) => encode_props(props, value, true),
        Kind::Array(elem) | Kind::ReadonlyArray(elem) => {
            let arr = value.as_array()?;
            let mut out: Option<Vec<Value>> = None;
            for (i, item) in arr.iter().enumerate() {
                if let Some(encoded) = encode_opt(elem, item) {
                    out.get_or_insert_with(|| arr.clone())[i] = encoded;
                }
            }
            out.map(Value::Array)
        }
        Kind::Dictionary { domain, codomain } => {
            let obj = value.as_object()?;
            let mut entries: Vec<(Option<String>, Option<Value>)> = Vec::with_capacity(obj.len());
            let mut touched = false;
            for (k, v) in obj {
                let new_key = encode_opt(domain, &Value::String(k.clone())).map(|e| render_key(&e));
                let new_val = encode_opt(codomain, v);
                touched |= new_key.is_some() || new_val.is_some();
                entries.push((new_key, new_val));
            }
            if !touched {
                return None;
            }
            let mut rebuilt = Map::new();
            for ((k, v), (new_key, new_val)) in obj.iter().zip(entries) {
                rebuilt.insert(
                    new_key.unwrap_or_else(|| k.clone()),
                    new_val.unwrap_or_else(|| v.clone()),
                );
            }
            Some(Value::Object(rebuilt))
        }
        Kind::Tuple(items) => {
            let arr = value.as_array()?;
            let mut out: Option<Vec<Value>> = None;
            for (i, item_shape) in items.iter().enumerate() {
                let Some(item) = arr.get(i) else { break };
                if let Some(encoded) = encode_opt(item_shape, item) {
                    out.get_or_insert_with(|| arr.clone())[i] = encoded;
                }
            }
            out.map(Value::Array)
        }
        // In declaration order, the first member whose guard accepts the
        // decoded value encodes it; the last member is the fallback so the
        // encoder always produces output.
        Kind::Union(members) => {
            let member = members.iter().find(|m| m.is(value)).or(members.last())?;
            encode_opt(member, value)
        }
        Kind::Intersection(members) => {
            let mut current: Option<Value> = None;
            for member in members {
                let input = current.as_ref().unwrap_or(value);
                if let Some(encoded) = encode_opt(member, input) {
                    current = Some(encoded);
                }
            }
            current
        }
        Kind::Refinement { base, .. } => encode_opt(base, value),
        Kind::Readonly(inner) => encode_opt(inner, value),
        Kind::Recursive(cell) => encode_opt(cell.resolve(), value),
        Kind::Tagged {
            tag,
            members,
            index,
            ..
        } => {
            let dispatched = value
                .as_object()
                .and_then(|obj| obj.get(tag))
                .and_then(|t| index.get(&tag_key(t)))
                .map(|&i| &members[i]);
            let member = match dispatched {
                Some(member) => member,
                None => members.iter().find(|m| m.is(value)).or(members.last())?,
            };
            encode_opt(member, value)
        }
        // Right-to-left: undo the second stage, then the first.
        Kind::Pipe { from, to } => match encode_opt(to, value) {
            Some(mid) => Some(encode_opt(from, &mid).unwrap_or(mid)),
            None => encode_opt(from, value),
        },
        Kind::Codec { serialize, .. } => serialize.as_ref().map(|f| f(value)),
    }
}

/// Encodes declared fields in place; undeclared fields pass through. With
/// `drop_absent` (partial), a declared field holding the absent marker is
/// omitted from the output instead of being written as null.
fn encode_props(props: &[Prop], value: &Value, drop_absent: bool) -> Option<Value> {
    let obj = value.as_object()?;
    let mut out: Option<Map<String, Value>> = None;
    for prop in props {
        let Some(field) = obj.get(&prop.key) else {
            continue;
        };
        if drop_absent && field.is_null() {
            out.get_or_insert_with(|| obj.clone()).shift_remove(&prop.key);
            continue;
        }
        if let Some(encoded) = encode_opt(&prop.shape, field) {
            out.get_or_insert_with(|| obj.clone())
                .insert(prop.key.clone(), encoded);
        }
    }
    out.map(Value::Object)
}
