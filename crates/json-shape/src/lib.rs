//! `json-shape` — composable runtime type descriptors for JSON values.
//!
//! A schema ("shape") is composed bottom-up once, from primitives and
//! combinators, then reused across unboundedly many decode calls. Decoding
//! either produces a validated value — sharing the input's storage when
//! nothing was transformed — or a path-qualified error tree; encoding is the
//! structural dual.
//!
//! # Example
//!
//! ```
//! use json_shape::{object, string, number, reporter};
//! use serde_json::json;
//!
//! let user = object(vec![("name", string()), ("age", number())]);
//! assert!(user.decode(json!({"name": "ada", "age": 36})).is_ok());
//!
//! let errors = reporter::path::report(&user.decode(json!({"name": 1, "age": 36})));
//! assert_eq!(
//!     errors,
//!     ["Invalid value 1 supplied to : { name: string, age: number }/name: string"]
//! );
//! ```

pub mod combinator;
pub mod descriptor;
pub mod error;
pub mod reporter;

pub use combinator::logical::{intersection, keyof, literal, literal_named, refinement, union};
pub use combinator::primitives::{
    any, boolean, never, nil, number, string, undef, unknown_array, unknown_record,
};
pub use combinator::recursive::recursive;
pub use combinator::structural::{
    array, dictionary, object, partial, readonly, readonly_array, strict, tuple,
};
pub use combinator::tagged::tagged_union;
pub use descriptor::{
    json_equal, pipe, with_name, DecodeOptions, EncodeFn, GuardFn, Kind, Outcome, ParseFn, Prop,
    Shape, ShapeRef,
};
pub use error::{ContextEntry, DecodeError, ErrorNode};
