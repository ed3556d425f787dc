//! Codex CLI subprocess generator.
//!
//! The prompt is written to the child's stdin and stdout is returned as the
//! completion. The child is killed once the timeout elapses.
//!
//! Script executables are run through their interpreter:
//!
//! - `*.cmd`, `*.bat` - `cmd /c <path> <args>`
//! - `*.ps1` - `powershell -NoProfile -ExecutionPolicy Bypass -File <path> <args>`

use super::Generator;
use crate::config::CodexConfig;
use crate::error::{AgentForgeError, Result};
use std::io::{Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

/// Environment variable naming an alternate Codex executable.
pub const CODEX_PATH_ENV: &str = "AGENTFORGE_CODEX_PATH";

/// Executable resolved from `PATH` when no override is given.
pub const DEFAULT_EXECUTABLE: &str = "codex";

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs prompts through the Codex CLI.
#[derive(Debug, Clone)]
pub struct CodexGenerator {
    executable: String,
    args: Vec<String>,
    timeout_seconds: u64,
}

impl CodexGenerator {
    pub fn new(executable: impl Into<String>, args: Vec<String>, timeout_seconds: u64) -> Self {
        Self {
            executable: executable.into(),
            args,
            timeout_seconds,
        }
    }

    /// Resolve the executable, arguments, and timeout.
    ///
    /// Executable precedence: `cli_path`, then `AGENTFORGE_CODEX_PATH`, then
    /// the config file, then `codex` on `PATH`. Timeout precedence:
    /// `cli_timeout`, then the config file.
    pub fn resolve(
        cli_path: Option<&str>,
        cli_timeout: Option<u64>,
        config: &CodexConfig,
    ) -> Result<Self> {
        let env_path = std::env::var(CODEX_PATH_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty());

        let executable = cli_path
            .map(str::to_string)
            .or(env_path)
            .or_else(|| config.path.clone())
            .unwrap_or_else(|| DEFAULT_EXECUTABLE.to_string());

        let timeout_seconds = cli_timeout.unwrap_or(config.timeout_seconds);
        if timeout_seconds == 0 {
            return Err(AgentForgeError::UserError(
                "timeout must be at least 1 second".to_string(),
            ));
        }

        Ok(Self::new(executable, config.parsed_args()?, timeout_seconds))
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    /// Full argv, including any interpreter wrapper.
    pub fn command_line(&self) -> Vec<String> {
        let lower = self.executable.to_lowercase();
        let mut argv: Vec<String> = if lower.ends_with(".cmd") || lower.ends_with(".bat") {
            vec!["cmd".to_string(), "/c".to_string()]
        } else if lower.ends_with(".ps1") {
            ["powershell", "-NoProfile", "-ExecutionPolicy", "Bypass", "-File"]
                .into_iter()
                .map(String::from)
                .collect()
        } else {
            Vec::new()
        };
        argv.push(self.executable.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }

    fn not_found_message(&self) -> String {
        if self.executable == DEFAULT_EXECUTABLE {
            format!(
                "Codex executable not found on PATH.\n\
                 Fix: install the Codex CLI and ensure it is available in PATH, or set {}.",
                CODEX_PATH_ENV
            )
        } else {
            format!(
                "Codex executable not found at '{}'.\n\
                 Fix: update --codex-path or {}, or install the Codex CLI.",
                self.executable, CODEX_PATH_ENV
            )
        }
    }
}

impl Generator for CodexGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        let argv = self.command_line();
        tracing::debug!(command = ?argv, timeout_seconds = self.timeout_seconds, "invoking codex");

        let mut child = Command::new(&argv[0])
            .args(&argv[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AgentForgeError::GenerationUnavailable(self.not_found_message())
                } else {
                    AgentForgeError::GenerationUnavailable(format!(
                        "failed to start '{}': {}",
                        argv[0], e
                    ))
                }
            })?;

        // Stdin, stdout and stderr are serviced on their own threads so a
        // chatty child cannot block on a full pipe while we poll for exit.
        let stdin = child.stdin.take();
        let input = prompt.as_bytes().to_vec();
        thread::spawn(move || {
            if let Some(mut stdin) = stdin {
                // The child may exit without reading its input.
                let _ = stdin.write_all(&input);
            }
        });
        let (tx, rx) = mpsc::channel();
        spawn_reader(Stream::Stdout, child.stdout.take(), tx.clone());
        spawn_reader(Stream::Stderr, child.stderr.take(), tx);

        let deadline = Instant::now() + Duration::from_secs(self.timeout_seconds);
        let status = wait_until(&mut child, deadline)?;

        // Processes spawned by the child can hold the pipes open after it
        // exits, so draining shares the same deadline.
        let output =
            status.and_then(|status| drain_until(&rx, deadline).map(|output| (status, output)));
        let Some((status, (stdout, stderr))) = output else {
            tracing::warn!(timeout_seconds = self.timeout_seconds, "codex timed out");
            return Err(AgentForgeError::GenerationTimedOut(self.timeout_seconds));
        };

        if status.success() {
            return String::from_utf8(stdout).map_err(|e| {
                AgentForgeError::GenerationFailed(format!(
                    "codex output is not valid UTF-8: {}",
                    e.utf8_error()
                ))
            });
        }

        let stdout = String::from_utf8_lossy(&stdout);
        let stderr = String::from_utf8_lossy(&stderr);
        let detail = [stderr.trim(), stdout.trim()]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or("No output captured from codex.")
            .to_string();
        tracing::debug!(code = ?status.code(), "codex exited unsuccessfully");
        Err(AgentForgeError::GenerationFailed(detail))
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

fn spawn_reader<R: Read + Send + 'static>(
    stream: Stream,
    source: Option<R>,
    tx: Sender<(Stream, Vec<u8>)>,
) {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut source) = source {
            let _ = source.read_to_end(&mut buf);
        }
        let _ = tx.send((stream, buf));
    });
}

/// Collect both streams, giving up once `deadline` passes.
///
/// Returns `None` on timeout, otherwise `(stdout, stderr)`.
fn drain_until(
    rx: &Receiver<(Stream, Vec<u8>)>,
    deadline: Instant,
) -> Option<(Vec<u8>, Vec<u8>)> {
    let mut stdout = None;
    let mut stderr = None;

    while stdout.is_none() || stderr.is_none() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok((Stream::Stdout, buf)) => stdout = Some(buf),
            Ok((Stream::Stderr, buf)) => stderr = Some(buf),
            Err(RecvTimeoutError::Timeout) => return None,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    Some((stdout.unwrap_or_default(), stderr.unwrap_or_default()))
}

/// Wait for a child process, killing it once `deadline` passes.
///
/// Returns `None` if the process was killed.
fn wait_until(child: &mut Child, deadline: Instant) -> Result<Option<ExitStatus>> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) if Instant::now() >= deadline => {
                // SIGKILL on Unix, TerminateProcess on Windows.
                let _ = child.kill();
                let _ = child.wait();
                return Ok(None);
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                return Err(AgentForgeError::GenerationFailed(format!(
                    "failed to check codex process status: {}",
                    e
                )));
            }
        }
    }
}
