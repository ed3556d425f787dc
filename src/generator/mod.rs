//! Generation pipeline around the external generator.
//!
//! The generator is a single capability, [`Generator::generate`], that turns
//! a prompt into raw text. [`CodexGenerator`] provides it by running the
//! Codex CLI as a subprocess; tests substitute an in-memory implementation.
//!
//! Nothing here retries. A generator failure, timeout, or schema violation
//! ends the run and is returned to the caller unchanged.

mod codex;

pub use codex::CodexGenerator;

use crate::agent::{Agent, normalize_generation_output};
use crate::error::{AgentForgeError, Result};
use crate::prompt::{build_prompt, build_run_prompt};
use crate::repo::RepositoryMetadata;
use crate::spec::Specification;
use std::path::Path;
use std::time::Instant;

/// Something that turns a prompt into a raw text completion.
pub trait Generator {
    /// Produce a completion for `prompt`.
    ///
    /// Fails with `GenerationUnavailable`, `GenerationTimedOut`, or
    /// `GenerationFailed`.
    fn generate(&self, prompt: &str) -> Result<String>;
}

/// Build the prompt, invoke the generator once, and normalize its output.
pub fn generate_agents(
    spec: &Specification,
    repo: &RepositoryMetadata,
    generator: &dyn Generator,
) -> Result<Vec<Agent>> {
    let prompt = build_prompt(spec, repo)?;

    let start = Instant::now();
    let raw = generator.generate(&prompt)?;
    tracing::info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        output_bytes = raw.len(),
        "generator returned"
    );

    let agents = normalize_generation_output(&raw)?;
    tracing::info!(count = agents.len(), "generated agents");
    Ok(agents)
}

/// Run a task through a generated agent and return the generator's output.
///
/// `agent_path` may point at an `agent.md` file or at the agent directory
/// that contains one.
pub fn run_with_agent(
    agent_path: &Path,
    task: &str,
    context: &serde_json::Map<String, serde_json::Value>,
    generator: &dyn Generator,
) -> Result<String> {
    let document = if agent_path.is_dir() {
        agent_path.join(crate::agent::AGENT_DOCUMENT)
    } else {
        agent_path.to_path_buf()
    };

    let agent_text = std::fs::read_to_string(&document).map_err(|e| {
        AgentForgeError::UserError(format!(
            "failed to read agent definition '{}': {}",
            document.display(),
            e
        ))
    })?;

    let prompt = build_run_prompt(&agent_text, context, task)?;
    tracing::debug!(agent = %document.display(), bytes = prompt.len(), "running task");
    generator.generate(&prompt)
}
