//! Canonical JSON serialization.
//!
//! Every JSON document agentforge produces (prompt sections, stdout output,
//! `agents.json`) goes through [`canonical_json`] so that equal inputs always
//! produce byte-identical text: object keys sorted, two-space indentation.
//! Key sorting relies on `serde_json::Map` being `BTreeMap`-backed, so the
//! `preserve_order` feature must stay disabled.

use crate::error::{AgentForgeError, Result};
use serde::Serialize;

/// Serialize a value as pretty-printed JSON with sorted object keys.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value)
        .map_err(|e| AgentForgeError::UserError(format!("failed to serialize JSON: {}", e)))?;
    serde_json::to_string_pretty(&value)
        .map_err(|e| AgentForgeError::UserError(format!("failed to serialize JSON: {}", e)))
}
