//! Implementation of the `agentforge generate` command.

use super::codex_generator;
use crate::agent::materialize;
use crate::cli::GenerateArgs;
use crate::config::Config;
use crate::error::Result;
use crate::fs::atomic_write_file;
use crate::generator::{Generator, generate_agents};
use crate::json::canonical_json;
use crate::repo::analyze_repo;
use crate::spec::Specification;

/// Index of all generated agents, written at the output root.
pub const AGENTS_INDEX: &str = "agents.json";

/// Execute the `agentforge generate` command.
pub fn cmd_generate(args: GenerateArgs, config: &Config) -> Result<()> {
    let generator = codex_generator(&args.codex, config)?;
    print!("{}", execute(&args, &generator)?);
    Ok(())
}

/// Run the pipeline and return the text to print.
///
/// Without `--output-dir` this is the canonical JSON array of agents.
/// With it, the agents are written to disk and a summary is returned.
pub(crate) fn execute(args: &GenerateArgs, generator: &dyn Generator) -> Result<String> {
    let spec = Specification::load(&args.spec)?;
    let repo = analyze_repo(&args.repo)?;
    let agents = generate_agents(&spec, &repo, generator)?;
    let json = canonical_json(&agents)?;

    let Some(output_dir) = &args.output_dir else {
        return Ok(format!("{}\n", json));
    };

    let written = materialize(&agents, output_dir)?;
    let index_path = output_dir.join(AGENTS_INDEX);
    atomic_write_file(&index_path, &format!("{}\n", json))?;
    tracing::info!(count = written.len(), output = %output_dir.display(), "materialized agents");

    let mut summary = format!(
        "Wrote {} agent(s) to {}\n",
        written.len(),
        output_dir.display()
    );
    for agent in &written {
        summary.push_str(&format!("  {}\n", agent.path.display()));
    }
    summary.push_str(&format!("  {}\n", index_path.display()));
    Ok(summary)
}
