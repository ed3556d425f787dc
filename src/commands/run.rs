//! Implementation of the `agentforge run` command.

use super::codex_generator;
use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::{AgentForgeError, Result};
use crate::generator::{Generator, run_with_agent};
use serde_json::{Map, Value};
use std::path::Path;

/// Execute the `agentforge run` command.
pub fn cmd_run(args: RunArgs, config: &Config) -> Result<()> {
    let generator = codex_generator(&args.codex, config)?;
    let output = execute(&args, &generator)?;
    println!("{}", output.trim_end_matches('\n'));
    Ok(())
}

/// Resolve the task and context, then run the agent.
pub(crate) fn execute(args: &RunArgs, generator: &dyn Generator) -> Result<String> {
    let task = read_task(args)?;
    let context = match &args.context {
        Some(path) => load_context(path)?,
        None => Map::new(),
    };

    run_with_agent(&args.agent, &task, &context, generator)
}

fn read_task(args: &RunArgs) -> Result<String> {
    let task = match (&args.task, &args.task_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
            AgentForgeError::UserError(format!(
                "failed to read task file '{}': {}",
                path.display(),
                e
            ))
        })?,
        (None, None) => {
            return Err(AgentForgeError::UserError(
                "either --task or --task-file is required".to_string(),
            ));
        }
    };

    if task.trim().is_empty() {
        return Err(AgentForgeError::UserError(
            "task must not be empty".to_string(),
        ));
    }

    Ok(task)
}

/// Load a context file, which must hold a single JSON object.
fn load_context(path: &Path) -> Result<Map<String, Value>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AgentForgeError::UserError(format!(
            "failed to read context file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let value: Value = serde_json::from_str(&content).map_err(|e| {
        AgentForgeError::UserError(format!(
            "context file '{}' is not valid JSON: {}",
            path.display(),
            e
        ))
    })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(AgentForgeError::UserError(format!(
            "context file '{}' must contain a JSON object",
            path.display()
        ))),
    }
}
