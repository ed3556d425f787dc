//! Specification document parsing.
//!
//! A specification is plain text split into sections by heading lines that
//! start with `# ` (hash, one space). Text before the first heading is the
//! preamble.
//!
//! ```text
//! Build a release pipeline for the service.
//!
//! # Goals
//! Ship weekly.
//!
//! # Constraints
//! No manual steps.
//! ```
//!
//! `Goals` and `Constraints` must both be present. Headings are unique and
//! case-sensitive; section order is the order of first appearance.

use crate::error::{AgentForgeError, Result};
use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};
use std::path::Path;

/// Sections every specification must contain.
pub const REQUIRED_SECTIONS: [&str; 2] = ["Goals", "Constraints"];

const HEADING_PREFIX: &str = "# ";

/// One heading-delimited section of a specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    /// Verbatim body text with trailing blank lines removed.
    pub body: String,
}

/// A parsed, validated specification document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specification {
    preamble: String,
    sections: Vec<Section>,
}

impl Specification {
    /// Load and parse a specification file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.is_dir() {
            return Err(AgentForgeError::SpecError(format!(
                "'{}' is a directory, expected a spec file",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AgentForgeError::SpecError(format!("spec file not found: '{}'", path.display()))
            } else {
                AgentForgeError::SpecError(format!(
                    "failed to read spec file '{}': {}",
                    path.display(),
                    e
                ))
            }
        })?;

        let spec = Self::parse(&content).map_err(|e| match e {
            AgentForgeError::SpecError(msg) => {
                AgentForgeError::SpecError(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })?;

        tracing::debug!(
            path = %path.display(),
            sections = spec.sections().len(),
            "parsed spec"
        );
        Ok(spec)
    }

    /// Parse specification text.
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(AgentForgeError::SpecError("spec file is empty".to_string()));
        }

        let mut preamble_lines: Vec<&str> = Vec::new();
        let mut sections: Vec<Section> = Vec::new();
        let mut current: Option<(String, Vec<&str>)> = None;

        for (index, line) in text.lines().enumerate() {
            let Some(rest) = line.strip_prefix(HEADING_PREFIX) else {
                match current.as_mut() {
                    Some((_, lines)) => lines.push(line),
                    None => preamble_lines.push(line),
                }
                continue;
            };

            let heading = rest.trim();
            if heading.is_empty() {
                return Err(AgentForgeError::SpecError(format!(
                    "empty section heading on line {}",
                    index + 1
                )));
            }

            let seen = sections.iter().any(|s| s.heading == heading)
                || current.as_ref().is_some_and(|(h, _)| h == heading);
            if seen {
                return Err(AgentForgeError::SpecError(format!(
                    "duplicate section heading '{}' on line {}",
                    heading,
                    index + 1
                )));
            }

            if let Some((heading, lines)) = current.take() {
                sections.push(Section {
                    heading,
                    body: join_trimmed(&lines),
                });
            }
            current = Some((heading.to_string(), Vec::new()));
        }

        if let Some((heading, lines)) = current {
            sections.push(Section {
                heading,
                body: join_trimmed(&lines),
            });
        }

        let missing: Vec<&str> = REQUIRED_SECTIONS
            .iter()
            .copied()
            .filter(|required| !sections.iter().any(|s| s.heading == *required))
            .collect();
        if !missing.is_empty() {
            return Err(AgentForgeError::SpecError(format!(
                "missing required sections: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            preamble: preamble_lines.join("\n").trim().to_string(),
            sections,
        })
    }

    /// Text preceding the first heading, trimmed.
    #[cfg(test)]
    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    /// Sections in order of first appearance.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Body of the section with the given heading, if present.
    #[cfg(test)]
    pub fn section(&self, heading: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.heading == heading)
            .map(|s| s.body.as_str())
    }
}

/// Join body lines and drop trailing blank lines.
fn join_trimmed(lines: &[&str]) -> String {
    let end = lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

struct SectionMap<'a>(&'a [Section]);

impl Serialize for SectionMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for section in self.0 {
            map.serialize_entry(&section.heading, &section.body)?;
        }
        map.end()
    }
}

impl Serialize for Specification {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Specification", 2)?;
        state.serialize_field("preamble", &self.preamble)?;
        state.serialize_field("sections", &SectionMap(&self.sections))?;
        state.end()
    }
}
