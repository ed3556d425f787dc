//! Repository metadata scanning.
//!
//! Produces a coarse description of a codebase (languages by file count,
//! detected frameworks, presence of tests, size class) that is embedded in
//! the generation prompt. Nothing here is validated beyond being
//! serializable.

mod manifests;

use crate::error::{AgentForgeError, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Directories that are never descended into.
const IGNORE_DIRS: &[&str] = &[
    ".git",
    "__pycache__",
    ".venv",
    "venv",
    "node_modules",
    "dist",
    "build",
    ".mypy_cache",
    ".pytest_cache",
    ".ruff_cache",
];

/// Directory names that indicate a test suite.
const TEST_DIRS: &[&str] = &["tests", "test", "__tests__"];

/// File name suffixes that indicate test files.
const TEST_FILE_SUFFIXES: &[&str] = &[
    "_test.py", ".spec.js", ".test.js", ".spec.ts", ".test.ts",
];

/// Coarse repository size by total file count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoSize {
    Small,
    Medium,
    Large,
}

impl RepoSize {
    /// Classify a repository by its total number of files.
    pub fn classify(total_files: usize) -> Self {
        if total_files < 50 {
            RepoSize::Small
        } else if total_files < 200 {
            RepoSize::Medium
        } else {
            RepoSize::Large
        }
    }
}

/// Metadata describing a scanned repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryMetadata {
    /// The root path as given to the scanner.
    pub root: String,
    /// Languages ordered by file count, ties broken by first-seen extension.
    pub primary_languages: Vec<String>,
    /// File count per language.
    pub languages: BTreeMap<String, usize>,
    pub frameworks: BTreeSet<String>,
    /// Whether test files or test directories were found.
    pub tests: bool,
    pub size: RepoSize,
}

/// Map a lowercase file extension (with leading dot) to a language name.
fn language_for_extension(ext: &str) -> Option<&'static str> {
    let language = match ext {
        ".py" | ".pyi" => "Python",
        ".js" | ".jsx" => "JavaScript",
        ".ts" | ".tsx" => "TypeScript",
        ".java" => "Java",
        ".kt" => "Kotlin",
        ".rb" => "Ruby",
        ".go" => "Go",
        ".rs" => "Rust",
        ".cs" => "C#",
        ".cpp" | ".cxx" | ".cc" => "C++",
        ".c" => "C",
        ".h" | ".hpp" => "C/C++",
        ".html" => "HTML",
        ".css" => "CSS",
        ".scss" => "SCSS",
        ".md" => "Markdown",
        ".json" => "JSON",
        ".yaml" | ".yml" => "YAML",
        _ => return None,
    };
    Some(language)
}

fn is_ignored(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| IGNORE_DIRS.contains(&name))
}

fn is_test_file(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.starts_with("test_") || TEST_FILE_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

fn is_test_dir(name: &str) -> bool {
    TEST_DIRS.contains(&name.to_lowercase().as_str())
}

/// Scan a repository and summarize its languages, frameworks, and tests.
pub fn analyze_repo<P: AsRef<Path>>(root: P) -> Result<RepositoryMetadata> {
    let root = root.as_ref();

    if !root.is_dir() {
        return Err(AgentForgeError::UserError(format!(
            "repository root '{}' is not a directory",
            root.display()
        )));
    }

    let mut total_files = 0usize;
    let mut tests = false;
    // Extension counts in first-seen order.
    let mut extension_counts: Vec<(String, usize)> = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_ignored(e));

    for entry in walker {
        let entry = entry.map_err(|e| {
            AgentForgeError::UserError(format!(
                "failed to scan repository '{}': {}",
                root.display(),
                e
            ))
        })?;
        let name = entry.file_name().to_string_lossy();

        if entry.file_type().is_dir() {
            if entry.depth() > 0 && is_test_dir(&name) {
                tests = true;
            }
            continue;
        }

        total_files += 1;
        if is_test_file(&name) {
            tests = true;
        }

        let Some(ext) = entry.path().extension().and_then(|e| e.to_str()) else {
            continue;
        };
        let ext = format!(".{}", ext.to_lowercase());
        if language_for_extension(&ext).is_none() {
            continue;
        }
        match extension_counts.iter_mut().find(|(e, _)| *e == ext) {
            Some((_, count)) => *count += 1,
            None => extension_counts.push((ext, 1)),
        }
    }

    let (primary_languages, languages) = rank_languages(&extension_counts);

    let mut frameworks = manifests::detect_from_marker_files(root);
    frameworks.extend(manifests::detect_from_dependencies(root)?);

    let metadata = RepositoryMetadata {
        root: root.display().to_string(),
        primary_languages,
        languages,
        frameworks,
        tests,
        size: RepoSize::classify(total_files),
    };

    tracing::debug!(
        root = %metadata.root,
        files = total_files,
        languages = ?metadata.primary_languages,
        frameworks = ?metadata.frameworks,
        "scanned repository"
    );
    Ok(metadata)
}

/// Fold per-extension counts into per-language counts.
///
/// Returns languages ordered by descending count; languages with equal counts
/// keep the order in which their first extension was encountered.
fn rank_languages(extension_counts: &[(String, usize)]) -> (Vec<String>, BTreeMap<String, usize>) {
    let mut ordered: Vec<(&'static str, usize)> = Vec::new();
    for (ext, count) in extension_counts {
        let Some(language) = language_for_extension(ext) else {
            continue;
        };
        match ordered.iter_mut().find(|(l, _)| *l == language) {
            Some((_, total)) => *total += count,
            None => ordered.push((language, *count)),
        }
    }

    // Stable sort keeps first-seen order among ties.
    ordered.sort_by(|a, b| b.1.cmp(&a.1));

    let languages = ordered
        .iter()
        .map(|(l, c)| (l.to_string(), *c))
        .collect();
    let primary = ordered.into_iter().map(|(l, _)| l.to_string()).collect();
    (primary, languages)
}
