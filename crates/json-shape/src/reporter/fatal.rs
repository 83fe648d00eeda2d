//! Fail-fast reporter for integration boundaries that want a single error
//! value instead of a message list.

use serde_json::Value;

use crate::error::{DecodeError, ErrorNode};

/// Returns `Err` with the path reporter's messages newline-joined when the
/// decode failed, `Ok(())` otherwise.
pub fn report(result: &Result<Value, ErrorNode>) -> Result<(), DecodeError> {
    let messages = super::path::report(result);
    if messages.is_empty() {
        Ok(())
    } else {
        Err(DecodeError(messages.join("\n")))
    }
}
