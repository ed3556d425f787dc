//! Normalization of raw generator output into [`Agent`] values.
//!
//! The generator is free-text prone, so list fields are accepted either as a
//! JSON array of strings or as one string holding a bulleted list. Anything
//! else structurally unexpected (unknown fields, wrong types, empty required
//! values) rejects the whole batch.

use super::{Agent, OPTIONAL_FIELDS, REQUIRED_FIELDS};
use crate::error::{AgentForgeError, Result};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::LazyLock;

static BULLET_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*]\s+").expect("Invalid bullet regex"));

/// A list field as it arrived from the generator, resolved once at the
/// boundary.
#[derive(Debug)]
enum ListInput<'a> {
    /// Absent or `null`.
    Missing,
    /// A single string, read as a bulleted or line-delimited list.
    Text(&'a str),
    /// A JSON array with `null` elements already dropped.
    Items(Vec<&'a str>),
}

impl<'a> ListInput<'a> {
    fn resolve(field: &str, value: Option<&'a Value>) -> std::result::Result<Self, String> {
        match value {
            None | Some(Value::Null) => Ok(ListInput::Missing),
            Some(Value::String(text)) => Ok(ListInput::Text(text)),
            Some(Value::Array(elements)) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    match element {
                        Value::Null => continue,
                        Value::String(item) => items.push(item.as_str()),
                        _ => return Err(format!("field '{}' items must be strings", field)),
                    }
                }
                Ok(ListInput::Items(items))
            }
            Some(_) => Err(format!("field '{}' must be a list of strings", field)),
        }
    }

    fn into_items(self) -> Vec<String> {
        match self {
            ListInput::Missing => Vec::new(),
            ListInput::Text(text) => split_bulleted(text),
            ListInput::Items(items) => items
                .into_iter()
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Split a bulleted or line-delimited string into trimmed items.
///
/// A leading `-` or `*` followed by whitespace is stripped from each line;
/// blank lines are dropped.
pub(super) fn split_bulleted(text: &str) -> Vec<String> {
    let mut items: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| BULLET_PREFIX.replace(line, "").into_owned())
        .filter(|line| !line.is_empty())
        .collect();

    if items.is_empty() {
        let whole = text.trim();
        if !whole.is_empty() {
            items.push(whole.to_string());
        }
    }
    items
}

fn normalize_text_field(
    candidate: &Map<String, Value>,
    field: &str,
    required: bool,
) -> std::result::Result<String, String> {
    let text = match candidate.get(field) {
        None | Some(Value::Null) => "",
        Some(Value::String(text)) => text.trim(),
        Some(_) => return Err(format!("field '{}' must be a string", field)),
    };

    if required && text.is_empty() {
        return Err(format!("field '{}' must not be empty", field));
    }
    Ok(text.to_string())
}

fn normalize_list_field(
    candidate: &Map<String, Value>,
    field: &str,
    required: bool,
) -> std::result::Result<Vec<String>, String> {
    let items = ListInput::resolve(field, candidate.get(field))?.into_items();

    if required && items.is_empty() {
        return Err(format!("field '{}' must include at least one entry", field));
    }
    Ok(items)
}

/// Check field names against the schema, then normalize every field.
fn normalize_candidate(candidate: &Map<String, Value>) -> std::result::Result<Agent, String> {
    let present: BTreeSet<&str> = candidate.keys().map(String::as_str).collect();
    let required: BTreeSet<&str> = REQUIRED_FIELDS.into_iter().collect();
    let known: BTreeSet<&str> = REQUIRED_FIELDS
        .into_iter()
        .chain(OPTIONAL_FIELDS)
        .collect();

    let missing: Vec<&str> = required.difference(&present).copied().collect();
    if !missing.is_empty() {
        return Err(format!("missing required fields: {}", missing.join(", ")));
    }

    let unknown: Vec<&str> = present.difference(&known).copied().collect();
    if !unknown.is_empty() {
        return Err(format!("unknown fields: {}", unknown.join(", ")));
    }

    Ok(Agent {
        name: normalize_text_field(candidate, "name", true)?,
        role: normalize_text_field(candidate, "role", true)?,
        responsibilities: normalize_list_field(candidate, "responsibilities", true)?,
        constraints: normalize_list_field(candidate, "constraints", true)?,
        exclusions: normalize_list_field(candidate, "exclusions", false)?,
        communication_style: normalize_text_field(candidate, "communication_style", false)?,
    })
}

/// Parse raw generator output and normalize every agent candidate.
///
/// The output must be a JSON array of candidate objects or an object with an
/// `agents` array. One invalid candidate fails the whole batch; errors name
/// the candidate index and, for field-set violations, every offending field
/// in sorted order.
pub fn normalize_generation_output(raw: &str) -> Result<Vec<Agent>> {
    let parsed: Value = serde_json::from_str(raw).map_err(|e| {
        AgentForgeError::SchemaError(format!("generator output is not valid JSON: {}", e))
    })?;

    let candidates = match &parsed {
        Value::Array(items) => items,
        Value::Object(object) => match object.get("agents") {
            Some(Value::Array(items)) => items,
            _ => return Err(shape_error()),
        },
        _ => return Err(shape_error()),
    };

    let agents = candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| {
            let object = candidate.as_object().ok_or_else(|| {
                AgentForgeError::SchemaError(format!("agents[{}]: must be a JSON object", index))
            })?;
            normalize_candidate(object)
                .map_err(|msg| AgentForgeError::SchemaError(format!("agents[{}]: {}", index, msg)))
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(count = agents.len(), "normalized generator output");
    Ok(agents)
}

fn shape_error() -> AgentForgeError {
    AgentForgeError::SchemaError(
        "expected a JSON array of agents or an object with an 'agents' array".to_string(),
    )
}
