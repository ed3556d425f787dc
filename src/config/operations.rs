//! Config loading and validation.

use super::model::{CodexConfig, Config};
use crate::error::{AgentForgeError, Result};
use std::path::Path;

impl Config {
    /// Load config from a YAML file.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(AgentForgeError::UserError)` - Read or parse error, or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            AgentForgeError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        tracing::debug!(path = %path.display(), "loading config");
        Self::from_yaml(&content)
    }

    /// Load config from `explicit` if given, otherwise from `fallback` when
    /// that file exists. Returns defaults when neither applies.
    ///
    /// An explicit path that does not exist is an error.
    pub fn discover(explicit: Option<&Path>, fallback: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None if fallback.is_file() => Self::load(fallback),
            None => Ok(Self::default()),
        }
    }

    /// Parse config from a YAML string.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml).map_err(|e| {
            AgentForgeError::UserError(format!("failed to parse config YAML: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate config values.
    ///
    /// - `codex.timeout_seconds` must be positive
    /// - `codex.path`, when set, must not be blank
    /// - `codex.args` must be valid shell-quoted words
    pub fn validate(&self) -> Result<()> {
        if self.codex.timeout_seconds == 0 {
            return Err(AgentForgeError::UserError(
                "config validation failed: codex.timeout_seconds must be greater than 0"
                    .to_string(),
            ));
        }

        if let Some(path) = &self.codex.path
            && path.trim().is_empty()
        {
            return Err(AgentForgeError::UserError(
                "config validation failed: codex.path must not be empty".to_string(),
            ));
        }

        self.codex.parsed_args()?;
        Ok(())
    }
}

impl CodexConfig {
    /// Split `args` into argv words.
    pub fn parsed_args(&self) -> Result<Vec<String>> {
        shell_words::split(&self.args).map_err(|e| {
            AgentForgeError::UserError(format!(
                "config validation failed: codex.args is not valid shell syntax: {}",
                e
            ))
        })
    }
}
