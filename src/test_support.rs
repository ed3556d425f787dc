use crate::error::{AgentForgeError, Result};
use crate::generator::Generator;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};
use tempfile::TempDir;

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not thread-safe.
        // Lock it so tests don't race even if a #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// In-memory generator returning a canned response (or error) and recording
/// every prompt it receives.
pub(crate) struct ScriptedGenerator {
    response: std::result::Result<String, fn() -> AgentForgeError>,
    pub(crate) prompts: RefCell<Vec<String>>,
}

impl ScriptedGenerator {
    pub(crate) fn replying(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn failing(error: fn() -> AgentForgeError) -> Self {
        Self {
            response: Err(error),
            prompts: RefCell::new(Vec::new()),
        }
    }
}

impl Generator for ScriptedGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(make) => Err(make()),
        }
    }
}

pub(crate) const SAMPLE_SPEC: &str = "\
# Goals
Keep the payments API available.

# Constraints
No direct production writes.
";

/// Valid generator output describing two agents.
pub(crate) const SAMPLE_OUTPUT: &str = r#"{"agents": [
  {
    "name": "Ops",
    "role": "SRE",
    "responsibilities": "- Watch alerts\n- Page on-call",
    "constraints": ["No direct prod writes"]
  },
  {
    "name": "API Reviewer",
    "role": "Reviewer",
    "responsibilities": ["Review handlers"],
    "constraints": "Read-only access",
    "exclusions": ["Billing"],
    "communication_style": "Concise"
  }
]}"#;

/// Create a small Python/FastAPI project with tests and a spec file.
///
/// Returns the temp dir; the project lives in `repo/` and the spec at
/// `spec.md`.
pub(crate) fn create_test_project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let repo = root.join("repo");

    std::fs::create_dir_all(repo.join("app")).unwrap();
    std::fs::create_dir_all(repo.join("tests")).unwrap();
    std::fs::write(repo.join("app").join("main.py"), "from fastapi import FastAPI\n").unwrap();
    std::fs::write(repo.join("tests").join("test_main.py"), "def test_ok(): pass\n").unwrap();
    std::fs::write(repo.join("requirements.txt"), "fastapi>=0.110\nuvicorn\n").unwrap();
    std::fs::write(root.join("spec.md"), SAMPLE_SPEC).unwrap();

    temp_dir
}
