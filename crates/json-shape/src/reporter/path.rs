//! Path reporter: one human-readable message per failure leaf.

use serde_json::Value;

use crate::error::ErrorNode;

/// Flattens the failure tree into messages, one per leaf in left-to-right
/// order: `Invalid value <json> supplied to <path>` where the path joins
/// `{key}: {type_name}` segments with `/` (the root key is empty). Success
/// yields no messages.
pub fn report(result: &Result<Value, ErrorNode>) -> Vec<String> {
    let root = match result {
        Ok(_) => return Vec::new(),
        Err(root) => root,
    };
    root.leaves()
        .into_iter()
        .map(|(context, leaf)| {
            let path = context
                .iter()
                .map(|entry| format!("{}: {}", entry.key, entry.type_name))
                .collect::<Vec<_>>()
                .join("/");
            format!("Invalid value {} supplied to {}", leaf.value, path)
        })
        .collect()
}
