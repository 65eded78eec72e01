//! Queries against the ambient environment: the hook interpreter and git.
//!
//! Everything the installer needs to know about the machine it runs on goes
//! through the [`Environment`] trait, so the orchestration in [`preflight`]
//! can be exercised against a fake in tests.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::error::HooklinkError;
use crate::layout::HookLayout;

/// The interpreter that runs the tracked hooks.
///
/// Without an explicit name the probe uses `python3` (through
/// `/usr/bin/env`) on Unix and `python` on Windows, while stub scripts
/// always launch `python`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interpreter {
    name: Option<String>,
}

impl Interpreter {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name: name.filter(|n| !n.trim().is_empty()),
        }
    }

    /// Program name used for the availability probe.
    pub fn probe_program(&self) -> &str {
        match self.name.as_deref() {
            Some(name) => name,
            None if cfg!(windows) => "python",
            None => "python3",
        }
    }

    /// Program name written into stub scripts.
    pub fn stub_program(&self) -> &str {
        self.name.as_deref().unwrap_or("python")
    }
}

/// Environment lookups the installer depends on.
pub trait Environment {
    /// Runs the interpreter's `--version` query and returns what it printed.
    fn interpreter_version(&self, interpreter: &Interpreter) -> Result<String, HooklinkError>;

    /// Returns the top-level directory of the repository containing `start`.
    fn repo_toplevel(&self, start: &Path) -> Result<PathBuf, HooklinkError>;
}

/// The real environment: spawns processes on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnvironment;

impl SystemEnvironment {
    fn probe_command(program: &str) -> Command {
        // `/usr/bin/env` does not exist on Windows; `python` is expected on PATH there.
        let mut cmd = if cfg!(windows) {
            Command::new(program)
        } else {
            let mut cmd = Command::new("/usr/bin/env");
            cmd.arg(program);
            cmd
        };
        cmd.arg("--version");
        cmd
    }
}

impl Environment for SystemEnvironment {
    fn interpreter_version(&self, interpreter: &Interpreter) -> Result<String, HooklinkError> {
        let program = interpreter.probe_program();
        let output = Self::probe_command(program)
            .output()
            .map_err(|e| HooklinkError::InterpreterMissing(missing_interpreter_hint(program, &e)))?;

        if !output.status.success() {
            return Err(HooklinkError::InterpreterUnavailable {
                program: program.to_string(),
                detail: failure_detail(&output),
            });
        }

        // Python 2 printed its version on stderr.
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if stdout.is_empty() {
            Ok(String::from_utf8_lossy(&output.stderr).trim().to_string())
        } else {
            Ok(stdout)
        }
    }

    fn repo_toplevel(&self, start: &Path) -> Result<PathBuf, HooklinkError> {
        if !start.is_dir() {
            return Err(HooklinkError::NotARepository {
                start: start.to_path_buf(),
                detail: "directory does not exist".into(),
            });
        }

        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(start)
            .output()
            .map_err(HooklinkError::GitUnavailable)?;

        if !output.status.success() {
            return Err(HooklinkError::NotARepository {
                start: start.to_path_buf(),
                detail: failure_detail(&output),
            });
        }

        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if root.is_empty() {
            return Err(HooklinkError::Other(
                "git reported an empty repository root".into(),
            ));
        }
        Ok(PathBuf::from(root))
    }
}

fn failure_detail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.is_empty() {
        format!("exited with {}", output.status)
    } else {
        stderr
    }
}

fn missing_interpreter_hint(program: &str, err: &std::io::Error) -> String {
    if cfg!(windows) {
        format!(
            "'{program}' not found ({err}). Install it or add it to your PATH if it is \
             already installed. If you have just added it to your PATH, restart your \
             shell so the change takes effect."
        )
    } else {
        format!("'/usr/bin/env' command not found ({err})")
    }
}

/// Everything established before any hook is touched.
#[derive(Debug, Clone)]
pub struct Preflight {
    pub interpreter_version: String,
    pub root: PathBuf,
    pub layout: HookLayout,
}

/// Run the fatal precondition checks in order: interpreter, repository
/// root, hook directories. The first failure aborts.
pub fn preflight(
    env: &dyn Environment,
    interpreter: &Interpreter,
    start: &Path,
) -> Result<Preflight, HooklinkError> {
    let interpreter_version = env.interpreter_version(interpreter)?;
    let root = env.repo_toplevel(start)?;
    let layout = HookLayout::open(&root)?;

    Ok(Preflight {
        interpreter_version,
        root,
        layout,
    })
}
