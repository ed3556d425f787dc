//! Prompt assembly for the external generator.
//!
//! - **Template**: `{variable}` substitution engine shared with agent documents
//! - **Generation prompt**: policy, schema contract, spec and repo metadata
//! - **Run prompt**: agent document, execution context, and task text
//!
//! Both prompts are pure functions of their inputs; equal inputs produce
//! byte-identical prompts.

mod template;

pub use template::{TemplateVars, render_template, vars};

use crate::agent::{OPTIONAL_FIELDS, REQUIRED_FIELDS};
use crate::error::{AgentForgeError, Result};
use crate::json::canonical_json;
use crate::repo::RepositoryMetadata;
use crate::spec::Specification;

const GENERATION_TEMPLATE: &str = r#"You are designing role-based AI agents.
You must not execute tasks, run commands, write files, or perform any actions.
Return structured JSON only.
Minimize the number of agents and ensure roles do not overlap.
Each agent must be actionable, reliable, and safe.
Responsibilities should be specific, outcome-focused, and non-overlapping.
Constraints should include quality checks, escalation or handoff rules, and scope limits.
Avoid vague phrases like 'assist' or 'help' without concrete scope.

Output schema:
{{
  "agents": [
    {{
      "name": "string",
      "role": "string",
      "responsibilities": ["string", "..."],
      "constraints": ["string", "..."],
      "exclusions": ["string", "..."],
      "communication_style": "string"
    }}
  ]
}}
Required fields: {required_fields}.
Optional fields: {optional_fields}.

Specification:
{specification}

Repository Metadata:
{repository}
"#;

const RUN_TEMPLATE: &str = "{agent}\n\nContext:\n{context}\n\nTask:\n{task}\n";

fn render_builtin(template: &str, variables: &TemplateVars) -> Result<String> {
    render_template(template, variables)
        .map_err(|e| AgentForgeError::UserError(format!("failed to render prompt: {}", e)))
}

/// Build the agent-generation prompt.
///
/// Layout: policy preamble, output schema with required/optional field
/// lists, the canonical JSON of the spec under `Specification:`, and the
/// canonical JSON of the repository metadata under `Repository Metadata:`.
pub fn build_prompt(spec: &Specification, repo: &RepositoryMetadata) -> Result<String> {
    let variables = vars([
        ("required_fields", REQUIRED_FIELDS.join(", ")),
        ("optional_fields", OPTIONAL_FIELDS.join(", ")),
        ("specification", canonical_json(spec)?),
        ("repository", canonical_json(repo)?),
    ]);
    let prompt = render_builtin(GENERATION_TEMPLATE, &variables)?;

    tracing::debug!(bytes = prompt.len(), "built generation prompt");
    Ok(prompt)
}

/// Build the prompt for running a task through a generated agent.
pub fn build_run_prompt(
    agent_text: &str,
    context: &serde_json::Map<String, serde_json::Value>,
    task: &str,
) -> Result<String> {
    let variables = vars([
        ("agent", agent_text.to_string()),
        ("context", canonical_json(context)?),
        ("task", task.to_string()),
    ]);
    render_builtin(RUN_TEMPLATE, &variables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::RepoSize;
    use serde_json::json;
    use std::collections::{BTreeMap, BTreeSet};

    fn sample_spec() -> Specification {
        Specification::parse("Build it.\n# Goals\nShip.\n# Constraints\nSafely.\n# Audience\nOps\n")
            .unwrap()
    }

    fn sample_repo() -> RepositoryMetadata {
        RepositoryMetadata {
            root: ".".to_string(),
            primary_languages: vec!["Rust".to_string(), "Python".to_string()],
            languages: BTreeMap::from([("Python".to_string(), 1), ("Rust".to_string(), 3)]),
            frameworks: BTreeSet::from(["FastAPI".to_string()]),
            tests: true,
            size: RepoSize::Small,
        }
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let first = build_prompt(&sample_spec(), &sample_repo()).unwrap();
        let second = build_prompt(&sample_spec(), &sample_repo()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_prompt_embeds_canonical_spec_and_repo() {
        let spec = sample_spec();
        let repo = sample_repo();
        let prompt = build_prompt(&spec, &repo).unwrap();

        let spec_json = canonical_json(&spec).unwrap();
        let repo_json = canonical_json(&repo).unwrap();
        assert!(prompt.contains(&format!("Specification:\n{}\n\n", spec_json)));
        assert!(prompt.ends_with(&format!("Repository Metadata:\n{}\n", repo_json)));
    }

    #[test]
    fn test_sections_appear_in_fixed_order() {
        let prompt = build_prompt(&sample_spec(), &sample_repo()).unwrap();

        let policy = prompt.find("Return structured JSON only.").unwrap();
        let schema = prompt.find("Output schema:").unwrap();
        let spec = prompt.find("Specification:").unwrap();
        let repo = prompt.find("Repository Metadata:").unwrap();
        assert!(policy < schema && schema < spec && spec < repo);
    }

    #[test]
    fn test_prompt_names_schema_fields() {
        let prompt = build_prompt(&sample_spec(), &sample_repo()).unwrap();

        assert!(prompt.contains("Required fields: name, role, responsibilities, constraints.\n"));
        assert!(prompt.contains("Optional fields: exclusions, communication_style.\n"));
        assert!(prompt.contains("{\n  \"agents\": [\n    {\n      \"name\": \"string\","));
    }

    #[test]
    fn test_spec_sections_serialize_sorted() {
        let prompt = build_prompt(&sample_spec(), &sample_repo()).unwrap();

        let audience = prompt.find("\"Audience\"").unwrap();
        let constraints = prompt.find("\"Constraints\"").unwrap();
        let goals = prompt.find("\"Goals\"").unwrap();
        assert!(audience < constraints && constraints < goals);
    }

    #[test]
    fn test_different_inputs_change_prompt() {
        let mut repo = sample_repo();
        let base = build_prompt(&sample_spec(), &repo).unwrap();
        repo.tests = false;
        assert_ne!(base, build_prompt(&sample_spec(), &repo).unwrap());
    }

    #[test]
    fn test_run_prompt_layout() {
        let context = json!({"env": "staging", "ticket": 42});
        let prompt = build_run_prompt(
            "# Ops\n\nRole: SRE",
            context.as_object().unwrap(),
            "Check the alerts.",
        )
        .unwrap();

        assert_eq!(
            prompt,
            "# Ops\n\nRole: SRE\n\nContext:\n{\n  \"env\": \"staging\",\n  \"ticket\": 42\n}\n\nTask:\nCheck the alerts.\n"
        );
    }

    #[test]
    fn test_run_prompt_with_empty_context() {
        let prompt = build_run_prompt("agent", &serde_json::Map::new(), "task").unwrap();
        assert_eq!(prompt, "agent\n\nContext:\n{}\n\nTask:\ntask\n");
    }
}
