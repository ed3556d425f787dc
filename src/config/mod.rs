//! Configuration model for agentforge.
//!
//! This module defines the Config struct that represents `agentforge.yaml`.
//! The file is optional. Unknown fields are ignored, missing fields take
//! their defaults, and values are validated after parsing.

mod model;
mod operations;


pub use model::{CodexConfig, Config, DEFAULT_CONFIG_FILE};
