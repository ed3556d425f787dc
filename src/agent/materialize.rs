//! Rendering agents to files.
//!
//! Each agent gets its own directory under the output root, named by a slug
//! of the agent name that is unique within one call:
//!
//! ```text
//! out/
//!   test-agent/agent.md
//!   test-agent-2/agent.md
//! ```
//!
//! Writes are not transactional. If a write fails part-way through, the
//! directories already written are left in place.

use super::Agent;
use crate::error::{AgentForgeError, Result};
use crate::fs::atomic_write_file;
use crate::prompt::{render_template, vars};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// File name of the rendered document inside each agent directory.
pub const AGENT_DOCUMENT: &str = "agent.md";

/// Slug used when a name has no ASCII alphanumeric characters.
const FALLBACK_SLUG: &str = "agent";

const AGENT_TEMPLATE: &str = "# {agent_name}

Role: {role}

## Responsibilities
{responsibilities}

## Constraints
{constraints}

## Exclusions
{exclusions}

Communication style: {communication_style}
";

/// An agent written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedAgent {
    pub slug: String,
    /// Path to the rendered `agent.md`.
    pub path: PathBuf,
}

/// Derive a filesystem-safe slug from an agent name.
///
/// Lower-cases, collapses every run of characters outside `[a-z0-9]` into a
/// single hyphen, and trims hyphens from both ends. Falls back to `agent`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::new();
    let mut last_was_hyphen = true; // avoids a leading hyphen

    for c in name.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Return `base`, or `base-N` for the smallest `N >= 2` not yet used.
fn unique_slug(base: String, used: &HashSet<String>) -> String {
    if !used.contains(&base) {
        return base;
    }
    (2..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or(base)
}

fn format_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the markdown document for one agent.
///
/// Trailing whitespace is trimmed and exactly one trailing newline is kept.
pub fn render_agent(agent: &Agent) -> Result<String> {
    let variables = vars([
        ("agent_name", agent.name.clone()),
        ("role", agent.role.clone()),
        ("responsibilities", format_list(&agent.responsibilities)),
        ("constraints", format_list(&agent.constraints)),
        ("exclusions", format_list(&agent.exclusions)),
        ("communication_style", agent.communication_style.clone()),
    ]);

    let rendered = render_template(AGENT_TEMPLATE, &variables).map_err(|e| {
        AgentForgeError::UserError(format!("failed to render agent document: {}", e))
    })?;
    Ok(format!("{}\n", rendered.trim_end()))
}

/// Write one `<slug>/agent.md` per agent under `output_root`.
///
/// The output root is created if missing. Agents are processed in order and
/// colliding slugs get `-2`, `-3`, ... suffixes, so no agent overwrites
/// another within the same call.
pub fn materialize(agents: &[Agent], output_root: &Path) -> Result<Vec<MaterializedAgent>> {
    std::fs::create_dir_all(output_root).map_err(|e| {
        AgentForgeError::IoError(format!(
            "failed to create output directory '{}': {}",
            output_root.display(),
            e
        ))
    })?;

    let mut used: HashSet<String> = HashSet::new();
    let mut written = Vec::with_capacity(agents.len());

    for agent in agents {
        let slug = unique_slug(slugify(&agent.name), &used);
        used.insert(slug.clone());

        let agent_dir = output_root.join(&slug);
        std::fs::create_dir_all(&agent_dir).map_err(|e| {
            AgentForgeError::IoError(format!(
                "failed to create agent directory '{}': {}",
                agent_dir.display(),
                e
            ))
        })?;

        let path = agent_dir.join(AGENT_DOCUMENT);
        atomic_write_file(&path, &render_agent(agent)?)?;

        tracing::debug!(slug = %slug, path = %path.display(), "wrote agent document");
        written.push(MaterializedAgent { slug, path });
    }

    Ok(written)
}
