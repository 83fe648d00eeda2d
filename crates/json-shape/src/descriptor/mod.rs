//! Shape — an immutable, composable runtime type descriptor for JSON values.
//!
//! A shape pairs a display name with a closed `Kind` variant describing how
//! it guards, validates, and encodes values. Combinators build new shapes
//! that reference their children through `Arc`, never mutating them, so one
//! schema tree serves unboundedly many decode calls.

mod encode;
mod validate;

use std::fmt;
use std::sync::{Arc, OnceLock};

use indexmap::IndexSet;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::ErrorNode;

/// Shared reference to an immutable shape.
pub type ShapeRef = Arc<Shape>;

/// Guard predicate over a JSON value.
pub type GuardFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;
/// Custom decoder: `None` signals an invalid input, `Some` the decoded value.
pub type ParseFn = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;
/// Custom encoder back to the external representation.
pub type EncodeFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// A named runtime type descriptor.
pub struct Shape {
    name: String,
    kind: Kind,
}

/// One declared object field.
#[derive(Clone)]
pub struct Prop {
    pub key: String,
    pub shape: ShapeRef,
}

/// The closed set of shape kinds.
///
/// Every combinator is one variant carrying only its own fields, so
/// discriminant finding and any other introspection pattern-match
/// exhaustively instead of probing at runtime.
#[derive(Clone)]
pub enum Kind {
    Null,
    Undefined,
    Any,
    Never,
    String,
    Number,
    Boolean,
    UnknownArray,
    UnknownRecord,
    Literal(Value),
    Keyof(IndexSet<String>),
    Interface(Vec<Prop>),
    Partial(Vec<Prop>),
    Strict(Vec<Prop>),
    Array(ShapeRef),
    ReadonlyArray(ShapeRef),
    Dictionary {
        domain: ShapeRef,
        codomain: ShapeRef,
    },
    Tuple(Vec<ShapeRef>),
    Union(Vec<ShapeRef>),
    Intersection(Vec<ShapeRef>),
    Refinement {
        base: ShapeRef,
        predicate: GuardFn,
    },
    Readonly(ShapeRef),
    Recursive(Arc<RecursiveCell>),
    Tagged {
        tag: String,
        members: Vec<ShapeRef>,
        index: HashMap<String, usize>,
        tag_name: String,
    },
    Pipe {
        from: ShapeRef,
        to: ShapeRef,
    },
    Codec {
        is: GuardFn,
        parse: ParseFn,
        serialize: Option<EncodeFn>,
    },
}

impl Kind {
    /// Stable tag naming the variant, for debugging and introspection.
    pub fn tag(&self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Undefined => "undefined",
            Kind::Any => "any",
            Kind::Never => "never",
            Kind::String => "string",
            Kind::Number => "number",
            Kind::Boolean => "boolean",
            Kind::UnknownArray => "unknown-array",
            Kind::UnknownRecord => "unknown-record",
            Kind::Literal(_) => "literal",
            Kind::Keyof(_) => "keyof",
            Kind::Interface(_) => "interface",
            Kind::Partial(_) => "partial",
            Kind::Strict(_) => "strict",
            Kind::Array(_) => "array",
            Kind::ReadonlyArray(_) => "readonly-array",
            Kind::Dictionary { .. } => "dictionary",
            Kind::Tuple(_) => "tuple",
            Kind::Union(_) => "union",
            Kind::Intersection(_) => "intersection",
            Kind::Refinement { .. } => "refinement",
            Kind::Readonly(_) => "readonly",
            Kind::Recursive(_) => "recursive",
            Kind::Tagged { .. } => "tagged-union",
            Kind::Pipe { .. } => "pipe",
            Kind::Codec { .. } => "codec",
        }
    }
}

/// Lazily resolved self-referential shape.
///
/// Holds the definition closure until first use; the resolved target is
/// memoized and thereafter immutable. `OnceLock` serializes a concurrent
/// first use, which is strictly stronger than the benign recompute the
/// definition's required purity would otherwise allow.
pub struct RecursiveCell {
    target: OnceLock<ShapeRef>,
    define: Box<dyn Fn() -> ShapeRef + Send + Sync>,
}

impl RecursiveCell {
    pub(crate) fn new(define: Box<dyn Fn() -> ShapeRef + Send + Sync>) -> Self {
        Self {
            target: OnceLock::new(),
            define,
        }
    }

    pub(crate) fn resolve(&self) -> &ShapeRef {
        self.target.get_or_init(|| (self.define)())
    }
}

/// Result of one validation step, copy-on-write style.
///
/// Containers fold their children's outcomes: an all-`Unchanged` container
/// stays `Unchanged` and `decode` hands the caller's own value back; the
/// first changed child allocates one fresh copy which is then patched in
/// place.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The input already is the decoded value.
    Unchanged,
    /// The decoded value differs from the input.
    Changed(Value),
}

/// Options resolved once per decode call and threaded through validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// When set, `readonly`/`readonly_array` force their output to own its
    /// storage (a deep copy) instead of sharing buffers with the input.
    pub isolate_readonly: bool,
}

impl Shape {
    pub(crate) fn with_kind(name: impl Into<String>, kind: Kind) -> ShapeRef {
        Arc::new(Self::with_kind_raw(name, kind))
    }

    // For construction sites that manage the allocation themselves
    // (`Arc::new_cyclic` in the recursive combinator).
    pub(crate) fn with_kind_raw(name: impl Into<String>, kind: Kind) -> Shape {
        Shape {
            name: name.into(),
            kind,
        }
    }

    /// The public escape hatch for transforming codecs: a guard over the
    /// decoded value space, a decoder, and an optional encoder (`None`
    /// means the encoder is the identity transform).
    pub fn custom<I, P>(
        name: impl Into<String>,
        is: I,
        parse: P,
        serialize: Option<EncodeFn>,
    ) -> ShapeRef
    where
        I: Fn(&Value) -> bool + Send + Sync + 'static,
        P: Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    {
        Shape::with_kind(
            name,
            Kind::Codec {
                is: Arc::new(is),
                parse: Arc::new(parse),
                serialize,
            },
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Cheap, total guard over the *decoded* value space, consistent with
    /// `validate`: for non-transforming shapes the decoded and raw spaces
    /// coincide.
    pub fn is(&self, value: &Value) -> bool {
        match &self.kind {
            Kind::Null | Kind::Undefined => value.is_null(),
            Kind::Any => true,
            Kind::Never => false,
            Kind::String => value.is_string(),
            Kind::Number => value.is_number(),
            Kind::Boolean => value.is_boolean(),
            Kind::UnknownArray => value.is_array(),
            Kind::UnknownRecord => value.is_object(),
            Kind::Literal(lit) => json_equal(value, lit),
            Kind::Keyof(keys) => value.as_str().is_some_and(|s| keys.contains(s)),
            Kind::Interface(props) => value.as_object().is_some_and(|obj| {
                props
                    .iter()
                    .all(|p| p.shape.is(obj.get(&p.key).unwrap_or(&Value::Null)))
            }),
            Kind::Partial(props) => value.as_object().is_some_and(|obj| {
                props
                    .iter()
                    .all(|p| obj.get(&p.key).is_none_or(|v| p.shape.is(v)))
            }),
            Kind::Strict(props) => value.as_object().is_some_and(|obj| {
                obj.keys().all(|k| props.iter().any(|p| p.key == *k))
                    && props
                        .iter()
                        .all(|p| p.shape.is(obj.get(&p.key).unwrap_or(&Value::Null)))
            }),
            Kind::Array(elem) | Kind::ReadonlyArray(elem) => value
                .as_array()
                .is_some_and(|arr| arr.iter().all(|v| elem.is(v))),
            Kind::Dictionary { domain, codomain } => value.as_object().is_some_and(|obj| {
                obj.iter()
                    .all(|(k, v)| domain.is(&Value::String(k.clone())) && codomain.is(v))
            }),
            Kind::Tuple(items) => value.as_array().is_some_and(|arr| {
                arr.len() == items.len() && items.iter().zip(arr).all(|(s, v)| s.is(v))
            }),
            Kind::Union(members) => members.iter().any(|m| m.is(value)),
            Kind::Intersection(members) => members.iter().all(|m| m.is(value)),
            Kind::Refinement { base, predicate } => base.is(value) && predicate(value),
            Kind::Readonly(inner) => inner.is(value),
            Kind::Recursive(cell) => cell.resolve().is(value),
            Kind::Tagged {
                tag,
                members,
                index,
                ..
            } => value.as_object().is_some_and(|obj| {
                obj.get(tag)
                    .and_then(|t| index.get(&tag_key(t)))
                    .is_some_and(|&i| members[i].is(value))
            }),
            // The guard runs over decoded values, i.e. the second stage's space.
            Kind::Pipe { to, .. } => to.is(value),
            Kind::Codec { is, .. } => is(value),
        }
    }

    /// Validates `value` under the path segment `key`, for embedding inside
    /// a parent shape's validation. Never panics on malformed input.
    pub fn validate(
        &self,
        value: &Value,
        key: &str,
        opts: &DecodeOptions,
    ) -> Result<Outcome, ErrorNode> {
        validate::validate_inner(self, value, key, opts)
    }

    /// Decodes an untyped value, returning either the decoded value or the
    /// root of the failure tree. Consumes the input so the unchanged fast
    /// path returns the caller's own buffers.
    pub fn decode(&self, value: Value) -> Result<Value, ErrorNode> {
        self.decode_with(value, &DecodeOptions::default())
    }

    /// `decode` with explicit options.
    pub fn decode_with(&self, value: Value, opts: &DecodeOptions) -> Result<Value, ErrorNode> {
        match self.validate(&value, "", opts)? {
            Outcome::Unchanged => Ok(value),
            Outcome::Changed(decoded) => Ok(decoded),
        }
    }

    /// Encodes an already-valid decoded value back to its external
    /// representation.
    ///
    /// # Panics
    ///
    /// Panics when the shape is (or dispatches to) `never` — encoding an
    /// impossible value is a schema-construction mistake, not a data error.
    pub fn encode(&self, value: &Value) -> Value {
        encode::encode_opt(self, value).unwrap_or_else(|| value.clone())
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("name", &self.name)
            .field("kind", &self.kind.tag())
            .finish()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Composes two shapes: `to` consumes `from`'s decoded output.
///
/// Validation short-circuits on `from`'s failure; encoders compose
/// right-to-left, and the composition of two identity encoders is itself
/// identity (no allocation).
pub fn pipe(from: ShapeRef, to: ShapeRef) -> ShapeRef {
    let name = format!("pipe({}, {})", from.name(), to.name());
    Shape::with_kind(name, Kind::Pipe { from, to })
}

/// Overrides the display name of an existing shape.
pub fn with_name(shape: &ShapeRef, name: impl Into<String>) -> ShapeRef {
    Arc::new(Shape {
        name: name.into(),
        kind: shape.kind.clone(),
    })
}

/// Deep JSON equality, comparing numbers by value (`1` equals `1.0`).
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .zip(y.as_f64())
            .is_some_and(|(x, y)| x == y),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| json_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| json_equal(v, w)))
        }
        _ => a == b,
    }
}

/// Canonical map key for a discriminant literal: its compact JSON rendering.
pub(crate) fn tag_key(value: &Value) -> String {
    value.to_string()
}
