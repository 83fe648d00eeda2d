//! Shape constructors: primitives and the combinators built over them.

pub mod logical;
pub mod primitives;
pub mod recursive;
pub mod structural;
pub mod tagged;
