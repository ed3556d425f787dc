//! CLI argument parsing for agentforge.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

/// AgentForge: generate role-based agent definitions for a repository.
///
/// A specification document and metadata scanned from the target repository
/// are turned into a prompt for the Codex CLI. Its output is validated
/// against a strict agent schema and either printed as JSON or written out
/// as one `agent.md` per agent.
#[derive(Parser, Debug)]
#[command(name = "agentforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the config file (default: ./agentforge.yaml when present).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for agentforge.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate agent definitions from a spec and a repository.
    ///
    /// Prints the validated agents as JSON, or writes one directory per
    /// agent plus `agents.json` when `--output-dir` is given.
    Generate(GenerateArgs),

    /// Run a task through a generated agent.
    ///
    /// Sends the agent definition, optional JSON context, and the task to
    /// Codex and prints its output.
    Run(RunArgs),
}

/// Options shared by commands that invoke Codex.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct CodexArgs {
    /// Path to the Codex executable (overrides AGENTFORGE_CODEX_PATH).
    #[arg(long, value_name = "PATH")]
    pub codex_path: Option<String>,

    /// Seconds to wait for Codex before giving up.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Arguments for the `generate` command.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Markdown specification with `# Goals` and `# Constraints` sections.
    #[arg(long, value_name = "PATH")]
    pub spec: PathBuf,

    /// Repository to scan for languages, frameworks, and tests.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub repo: PathBuf,

    /// Write agent directories and agents.json here instead of printing JSON.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub codex: CodexArgs,
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("task_source").required(true).args(["task", "task_file"])))]
pub struct RunArgs {
    /// Agent definition: an `agent.md` file or the directory containing one.
    #[arg(long, value_name = "PATH")]
    pub agent: PathBuf,

    /// Task text.
    #[arg(long, value_name = "TEXT")]
    pub task: Option<String>,

    /// File containing the task text.
    #[arg(long, value_name = "PATH")]
    pub task_file: Option<PathBuf>,

    /// JSON file holding an object of extra context for the agent.
    #[arg(long, value_name = "PATH")]
    pub context: Option<PathBuf>,

    #[command(flatten)]
    pub codex: CodexArgs,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    #[test]
    fn cli_debug_assert() {
        // Verifies the CLI arguments configuration is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_generate_minimal() {
        let cli = Cli::try_parse_from(["agentforge", "generate", "--spec", "spec.md"]).unwrap();
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
        if let Command::Generate(args) = cli.command {
            assert_eq!(args.spec, PathBuf::from("spec.md"));
            assert_eq!(args.repo, PathBuf::from("."));
            assert!(args.output_dir.is_none());
            assert!(args.codex.codex_path.is_none());
            assert!(args.codex.timeout.is_none());
        } else {
            panic!("Expected Generate command");
        }
    }

    #[test]
    fn parse_generate_full() {
        let cli = Cli::try_parse_from([
            "agentforge",
            "-v",
            "--config",
            "ci/agentforge.yaml",
            "generate",
            "--spec",
            "docs/spec.md",
            "--repo",
            "../service",
            "--output-dir",
            "agents",
            "--codex-path",
            "/opt/codex",
            "--timeout",
            "45",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("ci/agentforge.yaml")));
        if let Command::Generate(args) = cli.command {
            assert_eq!(args.repo, PathBuf::from("../service"));
            assert_eq!(args.output_dir, Some(PathBuf::from("agents")));
            assert_eq!(args.codex.codex_path.as_deref(), Some("/opt/codex"));
            assert_eq!(args.codex.timeout, Some(45));
        } else {
            panic!("Expected Generate command");
        }
    }

    #[test]
    fn parse_verbose_after_subcommand() {
        let cli =
            Cli::try_parse_from(["agentforge", "generate", "--spec", "s.md", "--verbose"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn parse_generate_requires_spec() {
        let err = Cli::try_parse_from(["agentforge", "generate"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn parse_generate_rejects_non_numeric_timeout() {
        let err = Cli::try_parse_from(["agentforge", "generate", "--spec", "s.md", "--timeout", "soon"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn parse_run_with_task() {
        let cli = Cli::try_parse_from([
            "agentforge",
            "run",
            "--agent",
            "agents/ops",
            "--task",
            "Triage the page",
            "--context",
            "ctx.json",
        ])
        .unwrap();

        if let Command::Run(args) = cli.command {
            assert_eq!(args.agent, PathBuf::from("agents/ops"));
            assert_eq!(args.task.as_deref(), Some("Triage the page"));
            assert!(args.task_file.is_none());
            assert_eq!(args.context, Some(PathBuf::from("ctx.json")));
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn parse_run_with_task_file() {
        let cli = Cli::try_parse_from([
            "agentforge",
            "run",
            "--agent",
            "agent.md",
            "--task-file",
            "task.txt",
        ])
        .unwrap();

        if let Command::Run(args) = cli.command {
            assert!(args.task.is_none());
            assert_eq!(args.task_file, Some(PathBuf::from("task.txt")));
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn parse_run_requires_a_task_source() {
        let err = Cli::try_parse_from(["agentforge", "run", "--agent", "agent.md"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn parse_run_rejects_both_task_sources() {
        let err = Cli::try_parse_from([
            "agentforge",
            "run",
            "--agent",
            "agent.md",
            "--task",
            "x",
            "--task-file",
            "task.txt",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }
}
