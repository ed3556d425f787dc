//! Framework detection from marker files and dependency manifests.

use crate::error::{AgentForgeError, Result};
use std::collections::BTreeSet;
use std::path::Path;

/// Dependency names (lowercase) that identify a framework.
const FRAMEWORK_DEPENDENCIES: &[(&str, &str)] = &[
    ("fastapi", "FastAPI"),
    ("django", "Django"),
    ("flask", "Flask"),
    ("react", "React"),
    ("next", "Next.js"),
    ("vue", "Vue"),
    ("svelte", "Svelte"),
    ("express", "Express"),
];

/// Files whose presence at the repository root identifies a framework.
const MARKER_FILES: &[(&str, &str)] = &[
    ("manage.py", "Django"),
    ("next.config.js", "Next.js"),
    ("next.config.mjs", "Next.js"),
    ("vite.config.js", "Vite"),
    ("vite.config.ts", "Vite"),
];

const VERSION_SEPARATORS: &[&str] = &["==", ">=", "<=", "~=", ">", "<"];

pub(super) fn detect_from_marker_files(root: &Path) -> BTreeSet<String> {
    MARKER_FILES
        .iter()
        .filter(|(file, _)| root.join(file).exists())
        .map(|(_, framework)| framework.to_string())
        .collect()
}

pub(super) fn detect_from_dependencies(root: &Path) -> Result<BTreeSet<String>> {
    let mut names: BTreeSet<String> = BTreeSet::new();

    names.extend(read_requirements_txt(root)?);
    names.extend(read_pyproject(root)?);
    names.extend(read_setup_cfg(root)?);
    names.extend(read_setup_py(root)?);
    names.extend(read_pipfile(root)?);
    names.extend(read_package_json(root)?);

    Ok(names
        .iter()
        .filter_map(|name| framework_for_dependency(name))
        .map(str::to_string)
        .collect())
}

fn framework_for_dependency(name: &str) -> Option<&'static str> {
    let key = name.to_lowercase();
    FRAMEWORK_DEPENDENCIES
        .iter()
        .find(|(dep, _)| *dep == key)
        .map(|(_, framework)| *framework)
}

/// Read a manifest if it exists. `Ok(None)` means the file is absent.
fn read_manifest(root: &Path, name: &str) -> Result<Option<String>> {
    let path = root.join(name);
    if !path.is_file() {
        return Ok(None);
    }
    std::fs::read_to_string(&path).map(Some).map_err(|e| {
        AgentForgeError::UserError(format!("failed to read '{}': {}", path.display(), e))
    })
}

/// Strip environment markers, extras, and version specifiers from a requirement.
fn normalize_dep_name(raw: &str) -> String {
    let mut cleaned = raw.split(';').next().unwrap_or_default().trim();
    for sep in VERSION_SEPARATORS {
        if let Some((name, _)) = cleaned.split_once(sep) {
            cleaned = name.trim();
            break;
        }
    }
    cleaned
        .split('[')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn read_requirements_txt(root: &Path) -> Result<Vec<String>> {
    let Some(content) = read_manifest(root, "requirements.txt")? else {
        return Ok(Vec::new());
    };

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_whitespace().next())
        .map(normalize_dep_name)
        .filter(|name| !name.is_empty())
        .collect())
}

fn read_pyproject(root: &Path) -> Result<Vec<String>> {
    let Some(content) = read_manifest(root, "pyproject.toml")? else {
        return Ok(Vec::new());
    };

    let data: toml::Table = toml::from_str(&content).map_err(|e| {
        AgentForgeError::UserError(format!("failed to parse pyproject.toml: {}", e))
    })?;

    let mut deps = Vec::new();

    if let Some(items) = data
        .get("project")
        .and_then(|p| p.get("dependencies"))
        .and_then(|d| d.as_array())
    {
        deps.extend(items.iter().filter_map(|i| i.as_str()).map(normalize_dep_name));
    }

    let poetry = data.get("tool").and_then(|t| t.get("poetry"));
    if let Some(table) = poetry
        .and_then(|p| p.get("dependencies"))
        .and_then(|d| d.as_table())
    {
        deps.extend(table.keys().cloned());
    }
    if let Some(table) = poetry
        .and_then(|p| p.get("group"))
        .and_then(|g| g.get("dev"))
        .and_then(|d| d.get("dependencies"))
        .and_then(|d| d.as_table())
    {
        deps.extend(table.keys().cloned());
    }

    Ok(deps)
}

/// Collect `install_requires` and every extras list from `setup.cfg`.
fn read_setup_cfg(root: &Path) -> Result<Vec<String>> {
    let Some(content) = read_manifest(root, "setup.cfg")? else {
        return Ok(Vec::new());
    };

    let mut deps = Vec::new();
    let mut section = String::new();
    let mut collecting = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            section = trimmed[1..trimmed.len() - 1].trim().to_string();
            collecting = false;
            continue;
        }

        let is_continuation = line.starts_with(char::is_whitespace);
        if is_continuation {
            if collecting {
                deps.push(normalize_dep_name(trimmed));
            }
            continue;
        }

        let Some((key, value)) = trimmed.split_once('=') else {
            collecting = false;
            continue;
        };
        collecting = match section.as_str() {
            "options" => key.trim() == "install_requires",
            "options.extras_require" => true,
            _ => false,
        };
        if collecting && !value.trim().is_empty() {
            deps.push(normalize_dep_name(value));
        }
    }

    Ok(deps.into_iter().filter(|d| !d.is_empty()).collect())
}

/// `setup.py` is code, so only a substring match is attempted.
fn read_setup_py(root: &Path) -> Result<Vec<String>> {
    let Some(content) = read_manifest(root, "setup.py")? else {
        return Ok(Vec::new());
    };

    let lower = content.to_lowercase();
    Ok(FRAMEWORK_DEPENDENCIES
        .iter()
        .filter(|(dep, _)| lower.contains(dep))
        .map(|(dep, _)| dep.to_string())
        .collect())
}

fn read_pipfile(root: &Path) -> Result<Vec<String>> {
    let Some(content) = read_manifest(root, "Pipfile")? else {
        return Ok(Vec::new());
    };

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('[') && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(name, _)| name.trim().trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
        .collect())
}

fn read_package_json(root: &Path) -> Result<Vec<String>> {
    let Some(content) = read_manifest(root, "package.json")? else {
        return Ok(Vec::new());
    };

    let data: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
        AgentForgeError::UserError(format!("failed to parse package.json: {}", e))
    })?;

    let mut deps = Vec::new();
    for section in ["dependencies", "devDependencies", "peerDependencies"] {
        if let Some(map) = data.get(section).and_then(|s| s.as_object()) {
            deps.extend(map.keys().cloned());
        }
    }
    Ok(deps)
}
