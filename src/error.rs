//! Error types for the agentforge CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! Every variant is terminal for the run that raised it: nothing in the
//! pipeline retries, falls back, or downgrades an error.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for agentforge operations.
#[derive(Error, Debug)]
pub enum AgentForgeError {
    /// User provided invalid arguments, config, or auxiliary input files.
    #[error("{0}")]
    UserError(String),

    /// The specification document is missing, empty, or structurally invalid.
    #[error("Invalid spec: {0}")]
    SpecError(String),

    /// The external generator executable could not be found or started.
    #[error("{0}")]
    GenerationUnavailable(String),

    /// The external generator did not finish within the timeout.
    #[error("Codex execution exceeded timeout ({0}s).")]
    GenerationTimedOut(u64),

    /// The external generator exited unsuccessfully.
    #[error("Codex execution failed: {0}")]
    GenerationFailed(String),

    /// The generator output violates the agent schema.
    #[error("Invalid agent output: {0}")]
    SchemaError(String),

    /// Filesystem failure while writing generated files.
    #[error("Filesystem error: {0}")]
    IoError(String),
}

impl AgentForgeError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            AgentForgeError::UserError(_)
            | AgentForgeError::SpecError(_)
            | AgentForgeError::IoError(_) => exit_codes::USER_ERROR,
            AgentForgeError::SchemaError(_) => exit_codes::SCHEMA_FAILURE,
            AgentForgeError::GenerationUnavailable(_)
            | AgentForgeError::GenerationTimedOut(_)
            | AgentForgeError::GenerationFailed(_) => exit_codes::GENERATION_FAILURE,
        }
    }
}

/// Result type alias for agentforge operations.
pub type Result<T> = std::result::Result<T, AgentForgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_share_user_exit_code() {
        for err in [
            AgentForgeError::UserError("bad flag".to_string()),
            AgentForgeError::SpecError("empty file".to_string()),
            AgentForgeError::IoError("disk full".to_string()),
        ] {
            assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
        }
    }

    #[test]
    fn schema_error_has_its_own_exit_code() {
        let err = AgentForgeError::SchemaError("unknown field".to_string());
        assert_eq!(err.exit_code(), exit_codes::SCHEMA_FAILURE);
    }

    #[test]
    fn generation_errors_share_exit_code() {
        for err in [
            AgentForgeError::GenerationUnavailable("not found".to_string()),
            AgentForgeError::GenerationTimedOut(5),
            AgentForgeError::GenerationFailed("boom".to_string()),
        ] {
            assert_eq!(err.exit_code(), exit_codes::GENERATION_FAILURE);
        }
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = AgentForgeError::GenerationTimedOut(300);
        assert_eq!(err.to_string(), "Codex execution exceeded timeout (300s).");

        let err = AgentForgeError::SchemaError("Agent has unknown fields: [\"extra\"]".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid agent output: Agent has unknown fields: [\"extra\"]"
        );

        let err = AgentForgeError::SpecError("spec file is empty".to_string());
        assert_eq!(err.to_string(), "Invalid spec: spec file is empty");
    }
}
