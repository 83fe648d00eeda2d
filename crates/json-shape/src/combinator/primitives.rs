//! Primitive shapes. All of them are identity codecs: validation never
//! transforms, encoding never allocates.

use crate::descriptor::{Kind, Shape, ShapeRef};

/// JSON null.
pub fn nil() -> ShapeRef {
    Shape::with_kind("null", Kind::Null)
}

/// The absent marker. The JSON value model has a single null, so this also
/// matches `null`; it stays a distinct shape because `partial`'s wrapping
/// and encoding rules treat it specially.
pub fn undef() -> ShapeRef {
    Shape::with_kind("undefined", Kind::Undefined)
}

/// Accepts every value.
pub fn any() -> ShapeRef {
    Shape::with_kind("any", Kind::Any)
}

/// Accepts no value; encoding one is a programmer error and panics.
pub fn never() -> ShapeRef {
    Shape::with_kind("never", Kind::Never)
}

pub fn string() -> ShapeRef {
    Shape::with_kind("string", Kind::String)
}

pub fn number() -> ShapeRef {
    Shape::with_kind("number", Kind::Number)
}

pub fn boolean() -> ShapeRef {
    Shape::with_kind("boolean", Kind::Boolean)
}

/// Any array, elements unchecked.
pub fn unknown_array() -> ShapeRef {
    Shape::with_kind("UnknownArray", Kind::UnknownArray)
}

/// Any string-keyed map, values unchecked.
pub fn unknown_record() -> ShapeRef {
    Shape::with_kind("UnknownRecord", Kind::UnknownRecord)
}
