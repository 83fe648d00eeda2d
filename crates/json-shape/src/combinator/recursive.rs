//! Self-referential shapes for tree-shaped schemas.

use std::sync::{Arc, Weak};

use crate::descriptor::{with_name, Kind, RecursiveCell, Shape, ShapeRef};

/// Builds a self-referential shape. `define` receives the shape itself as a
/// placeholder and must return the fully composed definition; it is called
/// lazily on first use (`is`/`validate`/`encode`) and the result memoized,
/// which breaks the otherwise infinite eager construction. `define` must be
/// pure and deterministic over its argument.
pub fn recursive<F>(name: &str, define: F) -> ShapeRef
where
    F: Fn(ShapeRef) -> ShapeRef + Send + Sync + 'static,
{
    let name = name.to_string();
    Arc::new_cyclic(|weak: &Weak<Shape>| {
        let weak = weak.clone();
        let cell_name = name.clone();
        let cell = RecursiveCell::new(Box::new(move || {
            let self_ref = weak
                .upgrade()
                .expect("recursive shape dropped while resolving its definition");
            // The definition carries the recursion's display name so error
            // paths read e.g. `Node` rather than the expanded object name.
            with_name(&define(self_ref), cell_name.clone())
        }));
        Shape::with_kind_raw(name, Kind::Recursive(Arc::new(cell)))
    })
}
