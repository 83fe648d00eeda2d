//! Structural combinators: objects, arrays, dictionaries, tuples, and the
//! readonly wrappers.

use crate::combinator::logical::union;
use crate::combinator::primitives::undef;
use crate::descriptor::{Kind, Prop, Shape, ShapeRef};

fn to_props<K: Into<String>>(props: Vec<(K, ShapeRef)>) -> Vec<Prop> {
    props
        .into_iter()
        .map(|(key, shape)| Prop {
            key: key.into(),
            shape,
        })
        .collect()
}

fn props_name(props: &[Prop]) -> String {
    if props.is_empty() {
        return "{}".to_string();
    }
    let body = props
        .iter()
        .map(|p| format!("{}: {}", p.key, p.shape.name()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{ {} }}", body)
}

/// Open object: every declared field must validate, undeclared fields pass
/// through untouched and are preserved in the output.
pub fn object<K: Into<String>>(props: Vec<(K, ShapeRef)>) -> ShapeRef {
    let props = to_props(props);
    let name = props_name(&props);
    Shape::with_kind(name, Kind::Interface(props))
}

/// Open object whose fields may all be omitted. Each declared field shape is
/// wrapped in a union with the absent marker at construction; the object
/// loop then skips missing keys outright.
pub fn partial<K: Into<String>>(props: Vec<(K, ShapeRef)>) -> ShapeRef {
    let props = to_props(props);
    let name = format!("Partial<{}>", props_name(&props));
    let wrapped = props
        .into_iter()
        .map(|p| Prop {
            key: p.key,
            shape: union(vec![p.shape, undef()]),
        })
        .collect();
    Shape::with_kind(name, Kind::Partial(wrapped))
}

/// Closed object: like `object`, but any undeclared key in the validated
/// result fails against `never` at that key.
pub fn strict<K: Into<String>>(props: Vec<(K, ShapeRef)>) -> ShapeRef {
    let props = to_props(props);
    let name = format!("Exact<{}>", props_name(&props));
    Shape::with_kind(name, Kind::Strict(props))
}

/// Homogeneous array of `elem`.
pub fn array(elem: ShapeRef) -> ShapeRef {
    let name = format!("Array<{}>", elem.name());
    Shape::with_kind(name, Kind::Array(elem))
}

/// `array` with readonly semantics (see `DecodeOptions::isolate_readonly`).
pub fn readonly_array(elem: ShapeRef) -> ShapeRef {
    let name = format!("ReadonlyArray<{}>", elem.name());
    Shape::with_kind(name, Kind::ReadonlyArray(elem))
}

/// String-keyed map with validated key and value shapes.
pub fn dictionary(domain: ShapeRef, codomain: ShapeRef) -> ShapeRef {
    let name = format!("{{ [K in {}]: {} }}", domain.name(), codomain.name());
    Shape::with_kind(name, Kind::Dictionary { domain, codomain })
}

/// Fixed-arity array; excess elements are rejected, not ignored.
pub fn tuple(items: Vec<ShapeRef>) -> ShapeRef {
    let name = format!(
        "[{}]",
        items
            .iter()
            .map(|s| s.name().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Shape::with_kind(name, Kind::Tuple(items))
}

/// Readonly wrapper: validation delegates to `inner`; with
/// `DecodeOptions::isolate_readonly` the decoded value owns its storage.
pub fn readonly(inner: ShapeRef) -> ShapeRef {
    let name = format!("Readonly<{}>", inner.name());
    Shape::with_kind(name, Kind::Readonly(inner))
}
