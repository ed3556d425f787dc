//! Agent definitions.
//!
//! - **Normalize**: validate untrusted generator output against the agent
//!   schema and produce canonical [`Agent`] values
//! - **Materialize**: render agents to `<slug>/agent.md` documents
//!
//! # Schema
//!
//! | field                 | type                 | required |
//! |-----------------------|----------------------|----------|
//! | `name`                | string               | yes      |
//! | `role`                | string               | yes      |
//! | `responsibilities`    | list or bullet text  | yes      |
//! | `constraints`         | list or bullet text  | yes      |
//! | `exclusions`          | list or bullet text  | no       |
//! | `communication_style` | string               | no       |
//!
//! Any other field rejects the candidate.

mod materialize;
mod normalize;

pub use materialize::{AGENT_DOCUMENT, materialize};
pub use normalize::normalize_generation_output;

use serde::Serialize;

/// Fields every agent candidate must carry.
pub const REQUIRED_FIELDS: [&str; 4] = ["name", "role", "responsibilities", "constraints"];

/// Fields an agent candidate may carry.
pub const OPTIONAL_FIELDS: [&str; 2] = ["exclusions", "communication_style"];

/// A validated, normalized agent definition.
///
/// Strings are trimmed; `name`, `role`, `responsibilities` and `constraints`
/// are never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agent {
    pub name: String,
    pub role: String,
    pub responsibilities: Vec<String>,
    pub constraints: Vec<String>,
    pub exclusions: Vec<String>,
    pub communication_style: String,
}
