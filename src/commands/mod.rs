//! Command implementations for agentforge.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations.

mod generate;
mod run;

use crate::cli::{Cli, CodexArgs, Command};
use crate::config::{Config, DEFAULT_CONFIG_FILE};
use crate::error::Result;
use crate::generator::CodexGenerator;
use std::path::Path;

/// Dispatch a command to its implementation.
///
/// Loads the config file first so every command sees the same settings.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::discover(cli.config.as_deref(), Path::new(DEFAULT_CONFIG_FILE))?;

    match cli.command {
        Command::Generate(args) => generate::cmd_generate(args, &config),
        Command::Run(args) => run::cmd_run(args, &config),
    }
}

/// Build the Codex generator from command-line overrides and config.
fn codex_generator(args: &CodexArgs, config: &Config) -> Result<CodexGenerator> {
    let generator =
        CodexGenerator::resolve(args.codex_path.as_deref(), args.timeout, &config.codex)?;
    tracing::debug!(
        executable = generator.executable(),
        timeout_seconds = generator.timeout_seconds(),
        "resolved codex"
    );
    Ok(generator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::DirGuard;
    use clap::Parser;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_cli_overrides_win_over_config() {
        let mut config = Config::default();
        config.codex.path = Some("/opt/config-codex".to_string());
        config.codex.timeout_seconds = 90;

        let args = CodexArgs {
            codex_path: Some("/opt/cli-codex".to_string()),
            timeout: Some(7),
        };
        let generator = codex_generator(&args, &config).unwrap();

        assert_eq!(generator.executable(), "/opt/cli-codex");
        assert_eq!(generator.timeout_seconds(), 7);
    }

    #[test]
    #[serial]
    fn test_dispatch_reads_config_from_working_directory() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(DEFAULT_CONFIG_FILE),
            "codex:\n  timeout_seconds: 0\n",
        )
        .unwrap();
        let _guard = DirGuard::new(temp_dir.path());

        let cli = Cli::try_parse_from(["agentforge", "generate", "--spec", "spec.md"]).unwrap();
        let err = dispatch(cli).unwrap_err();

        assert!(err.to_string().contains("codex.timeout_seconds"));
    }

    #[test]
    #[serial]
    fn test_dispatch_missing_explicit_config() {
        let temp_dir = TempDir::new().unwrap();
        let _guard = DirGuard::new(temp_dir.path());

        let cli = Cli::try_parse_from([
            "agentforge",
            "--config",
            "custom.yaml",
            "run",
            "--agent",
            "agent.md",
            "--task",
            "x",
        ])
        .unwrap();
        let err = dispatch(cli).unwrap_err();

        assert!(err.to_string().contains("failed to read config file"));
    }
}
