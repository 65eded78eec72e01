//! Handler for the installation run.
//!
//! Preconditions (interpreter, repository root, hook directories) are fatal;
//! once enumeration starts every hook is reported on its own and the run
//! counts as completed.

use std::env;
use std::path::PathBuf;

use hooklink_core::{install_hooks, preflight, Environment, InstallOptions, Interpreter};

use crate::cli::ModeArg;
use crate::output::Reporter;

/// Settings for one installation run, as resolved from the command line.
pub struct InstallArgs {
    pub from: Option<PathBuf>,
    pub mode: ModeArg,
    pub interpreter: Option<String>,
    pub dry_run: bool,
}

/// Run the installer against `environment`.
///
/// Returns `true` when every hook was enumerated, even if some conflicted or
/// failed; `false` on any precondition failure.
pub fn run_install(args: &InstallArgs, environment: &dyn Environment, reporter: &mut Reporter) -> bool {
    let start = match &args.from {
        Some(dir) => dir.clone(),
        None => match env::current_dir() {
            Ok(c) => c,
            Err(e) => {
                reporter.error(&format!("Cannot get current directory: {e}"));
                return false;
            }
        },
    };

    let interpreter = Interpreter::new(args.interpreter.clone());
    let pre = match preflight(environment, &interpreter, &start) {
        Ok(p) => p,
        Err(e) => {
            reporter.error(&format!("{e}"));
            return false;
        }
    };

    reporter.info(&format!(
        "{} is available: {}",
        interpreter.probe_program(),
        pre.interpreter_version
    ));
    reporter.info(&format!("Git repository root: {}", pre.root.display()));

    let mut options = InstallOptions::new(args.mode.resolve(), interpreter);
    options.dry_run = args.dry_run;

    if args.dry_run {
        reporter.section(&format!("Planning git hooks ({}, dry-run)", options.mode));
    } else {
        reporter.section(&format!("Installing git hooks ({})", options.mode));
    }

    let report = match install_hooks(&pre.layout, &options) {
        Ok(r) => r,
        Err(e) => {
            reporter.error(&format!(
                "Failed to read {}: {e}",
                pre.layout.source_dir().display()
            ));
            return false;
        }
    };

    if report.entries.is_empty() {
        reporter.warning(&format!(
            "No hooks found in {}",
            pre.layout.source_dir().display()
        ));
    }

    for entry in &report.entries {
        reporter.hook(entry);
    }
    reporter.summary(&report.summary(), args.dry_run);

    true
}
