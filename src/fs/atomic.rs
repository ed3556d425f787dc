//! Atomic file writes.
//!
//! Each file is written to a temporary sibling (`.{filename}.tmp`), synced,
//! and renamed over the target, so an interrupted run never leaves a
//! half-written `agent.md` or `agents.json` behind. Atomicity is per file
//! only; a run that fails part-way keeps the files it already wrote.

use crate::error::{AgentForgeError, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically write bytes to a file, creating parent directories as needed.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            AgentForgeError::IoError(format!(
                "failed to create parent directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let temp_path = temp_path_for(path)?;
    write_and_sync(&temp_path, content)?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        AgentForgeError::IoError(format!("failed to replace '{}': {}", path.display(), e))
    })?;

    Ok(())
}

/// Atomically write a string to a file.
pub fn atomic_write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

fn temp_path_for(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            AgentForgeError::IoError(format!("invalid file path '{}'", target.display()))
        })?;

    Ok(parent.join(format!(".{}.tmp", filename)))
}

fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| {
        AgentForgeError::IoError(format!(
            "failed to create temporary file '{}': {}",
            path.display(),
            e
        ))
    })?;

    file.write_all(content)
        .and_then(|()| file.sync_all())
        .map_err(|e| {
            let _ = fs::remove_file(path);
            AgentForgeError::IoError(format!("failed to write '{}': {}", path.display(), e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_writes_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("agents.json");

        atomic_write_file(&path, "[]\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[]\n");
    }

    #[test]
    fn test_replaces_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("agent.md");
        fs::write(&path, "# Old\n").unwrap();

        atomic_write_file(&path, "# New\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "# New\n");
    }

    #[test]
    fn test_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out").join("ops").join("agent.md");

        atomic_write(&path, b"# Ops\n").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"# Ops\n");
    }

    #[test]
    fn test_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("agent.md");

        atomic_write(&path, b"content").unwrap();

        assert!(!temp_dir.path().join(".agent.md.tmp").exists());
    }

    #[test]
    fn test_temp_path_is_hidden_sibling() {
        let temp = temp_path_for(Path::new("/out/ops/agent.md")).unwrap();
        assert_eq!(temp, Path::new("/out/ops/.agent.md.tmp"));
    }

    #[test]
    fn test_fails_when_target_is_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("agent.md");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("inner"), "x").unwrap();

        let err = atomic_write(&path, b"content").unwrap_err();
        assert!(matches!(err, AgentForgeError::IoError(_)));
        assert!(!temp_dir.path().join(".agent.md.tmp").exists());
    }
}
