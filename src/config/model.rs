//! Config struct definitions and defaults.

use serde::Deserialize;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "agentforge.yaml";

/// Configuration for agentforge.
///
/// This struct represents the contents of `agentforge.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Settings for the Codex CLI generator.
    pub codex: CodexConfig,
}

/// How the Codex CLI is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CodexConfig {
    /// Executable path. `None` falls back to `AGENTFORGE_CODEX_PATH`, then
    /// `codex` on `PATH`.
    pub path: Option<String>,

    /// Arguments passed after the executable, shell-quoted.
    pub args: String,

    /// Seconds before the child process is killed.
    pub timeout_seconds: u64,
}

impl Default for CodexConfig {
    fn default() -> Self {
        Self {
            path: None,
            args: default_args(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_args() -> String {
    "exec -".to_string()
}

fn default_timeout_seconds() -> u64 {
    300
}
