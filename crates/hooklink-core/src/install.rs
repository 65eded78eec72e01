//! Per-hook installation by symlink or stub script.
//!
//! Each hook is first planned against the current state of its target entry
//! and only then applied. An existing entry is either exactly what would be
//! installed (already installed) or a conflict; it is never replaced.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::env::Interpreter;
use crate::error::HooklinkError;
use crate::layout::{Hook, HookLayout};

/// How hooks are placed into git's hooks directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMode {
    /// Symbolic link to the tracked file.
    Symlink,
    /// Shell script that launches the interpreter on the tracked file.
    Stub,
}

impl InstallMode {
    /// Stubs on Windows, where symlinks need elevated rights; links elsewhere.
    pub fn for_current_platform() -> Self {
        if cfg!(windows) {
            InstallMode::Stub
        } else {
            InstallMode::Symlink
        }
    }

    pub fn name(&self) -> &str {
        match self {
            InstallMode::Symlink => "symlink",
            InstallMode::Stub => "stub",
        }
    }
}

impl std::fmt::Display for InstallMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Settings shared by every hook in one run.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub mode: InstallMode,
    pub interpreter: Interpreter,
    /// Plan only, never touch the filesystem.
    pub dry_run: bool,
}

impl InstallOptions {
    pub fn new(mode: InstallMode, interpreter: Interpreter) -> Self {
        Self {
            mode,
            interpreter,
            dry_run: false,
        }
    }
}

/// Whether the tracked file needed its owner-execute bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecNotice {
    AlreadyExecutable,
    MadeExecutable,
}

impl ExecNotice {
    pub fn describe(&self) -> &str {
        match self {
            ExecNotice::AlreadyExecutable => "already executable",
            ExecNotice::MadeExecutable => "updated to executable",
        }
    }
}

/// What a hook's target entry calls for, decided before any change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    AlreadyInstalled,
    Conflict,
    Install,
}

/// Result of processing one hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    AlreadyInstalled,
    Linked(ExecNotice),
    StubCreated,
    Conflict,
    Failed(String),
    /// Dry run: the hook would be installed.
    Planned(InstallMode),
}

/// Coarse classification of a [`HookOutcome`] for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Installed,
    AlreadyInstalled,
    Conflict,
    Failed,
    Planned,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Installed => "installed",
            OutcomeKind::AlreadyInstalled => "already-installed",
            OutcomeKind::Conflict => "conflict",
            OutcomeKind::Failed => "failed",
            OutcomeKind::Planned => "planned",
        }
    }
}

impl HookOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            HookOutcome::AlreadyInstalled => OutcomeKind::AlreadyInstalled,
            HookOutcome::Linked(_) | HookOutcome::StubCreated => OutcomeKind::Installed,
            HookOutcome::Conflict => OutcomeKind::Conflict,
            HookOutcome::Failed(_) => OutcomeKind::Failed,
            HookOutcome::Planned(_) => OutcomeKind::Planned,
        }
    }

    /// Human-readable status line for this outcome.
    pub fn message(&self) -> String {
        match self {
            HookOutcome::AlreadyInstalled => "Skipping: already installed".to_string(),
            HookOutcome::Linked(notice) => {
                format!("Symlink successfully installed ({})", notice.describe())
            }
            HookOutcome::StubCreated => "Indirection file successfully created".to_string(),
            HookOutcome::Conflict => {
                "Existing hook conflicts with the intended installation".to_string()
            }
            HookOutcome::Failed(reason) => format!("Failed to install: {reason}"),
            HookOutcome::Planned(mode) => format!("Would install ({mode})"),
        }
    }
}

/// Stub script body: a shell shebang and one line launching the interpreter
/// on the tracked file, forwarding all arguments. No trailing newline.
const STUB_TEMPLATE: &str = "#!/usr/bin/sh\n{interpreter} '{source}' $@";

/// Exact content of the stub installed for `source`.
pub fn stub_content(source: &Path, interpreter: &Interpreter) -> String {
    STUB_TEMPLATE
        .replace("{interpreter}", interpreter.stub_program())
        .replace("{source}", &source.display().to_string())
}

/// Classify a hook's target entry without modifying anything.
///
/// Existence is checked with `symlink_metadata`, so a dangling link counts
/// as an existing entry.
pub fn plan_hook(hook: &Hook, options: &InstallOptions) -> io::Result<Plan> {
    let meta = match fs::symlink_metadata(&hook.target) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Plan::Install),
        Err(e) => return Err(e),
    };

    let installed = match options.mode {
        InstallMode::Symlink => {
            meta.file_type().is_symlink() && fs::read_link(&hook.target)? == hook.source
        }
        InstallMode::Stub => {
            meta.is_file()
                && fs::read(&hook.target)?
                    == stub_content(&hook.source, &options.interpreter).into_bytes()
        }
    };

    Ok(if installed {
        Plan::AlreadyInstalled
    } else {
        Plan::Conflict
    })
}

/// Plan and, unless this is a dry run, apply a single hook.
///
/// Never fails as a whole: filesystem errors become [`HookOutcome::Failed`].
pub fn install_hook(hook: &Hook, options: &InstallOptions) -> HookOutcome {
    match plan_hook(hook, options) {
        Ok(Plan::AlreadyInstalled) => HookOutcome::AlreadyInstalled,
        Ok(Plan::Conflict) => HookOutcome::Conflict,
        Ok(Plan::Install) if options.dry_run => HookOutcome::Planned(options.mode),
        Ok(Plan::Install) => match apply(hook, options) {
            Ok(outcome) => outcome,
            Err(e) => HookOutcome::Failed(e.to_string()),
        },
        Err(e) => HookOutcome::Failed(e.to_string()),
    }
}

fn apply(hook: &Hook, options: &InstallOptions) -> io::Result<HookOutcome> {
    match options.mode {
        InstallMode::Symlink => {
            let notice = ensure_executable(&hook.source)?;
            create_symlink(&hook.source, &hook.target)?;
            Ok(HookOutcome::Linked(notice))
        }
        InstallMode::Stub => {
            write_stub(&hook.target, &stub_content(&hook.source, &options.interpreter))?;
            Ok(HookOutcome::StubCreated)
        }
    }
}

/// Add `u+x` to `path` if it lacks it.
#[cfg(unix)]
fn ensure_executable(path: &Path) -> io::Result<ExecNotice> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    if perms.mode() & 0o100 != 0 {
        return Ok(ExecNotice::AlreadyExecutable);
    }
    perms.set_mode(perms.mode() | 0o100);
    fs::set_permissions(path, perms)?;
    Ok(ExecNotice::MadeExecutable)
}

#[cfg(not(unix))]
fn ensure_executable(path: &Path) -> io::Result<ExecNotice> {
    fs::metadata(path)?;
    Ok(ExecNotice::AlreadyExecutable)
}

#[cfg(unix)]
fn create_symlink(source: &Path, target: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, target)
}

#[cfg(windows)]
fn create_symlink(source: &Path, target: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(source, target)
}

#[cfg(not(any(unix, windows)))]
fn create_symlink(_source: &Path, _target: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}

/// Write a new stub, refusing to replace anything created in the meantime.
fn write_stub(target: &Path, content: &str) -> io::Result<()> {
    create_new_with(target, |file| {
        file.write_all(content.as_bytes())?;

        // git only runs executable hooks on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(target, fs::Permissions::from_mode(0o755))?;
        }

        Ok(())
    })
}

/// Create `target` exclusively and hand it to `fill`. If `fill` fails the
/// half-written file is removed again, so it cannot turn into a conflict on
/// the next run.
fn create_new_with<F>(target: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut fs::File) -> io::Result<()>,
{
    let mut file = OpenOptions::new().write(true).create_new(true).open(target)?;
    if let Err(e) = fill(&mut file) {
        drop(file);
        let _ = fs::remove_file(target);
        return Err(e);
    }
    Ok(())
}

/// One processed hook.
#[derive(Debug, Clone)]
pub struct HookReport {
    pub hook: Hook,
    pub outcome: HookOutcome,
}

/// Per-kind totals of an [`InstallReport`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallSummary {
    pub installed: usize,
    pub already_installed: usize,
    pub conflicts: usize,
    pub failed: usize,
    pub planned: usize,
}

/// Outcomes of one run, in processing order.
#[derive(Debug, Clone, Default)]
pub struct InstallReport {
    pub entries: Vec<HookReport>,
}

impl InstallReport {
    pub fn summary(&self) -> InstallSummary {
        let mut summary = InstallSummary::default();
        for entry in &self.entries {
            match entry.outcome.kind() {
                OutcomeKind::Installed => summary.installed += 1,
                OutcomeKind::AlreadyInstalled => summary.already_installed += 1,
                OutcomeKind::Conflict => summary.conflicts += 1,
                OutcomeKind::Failed => summary.failed += 1,
                OutcomeKind::Planned => summary.planned += 1,
            }
        }
        summary
    }

    pub fn is_clean(&self) -> bool {
        let summary = self.summary();
        summary.conflicts == 0 && summary.failed == 0
    }
}

/// Install every hook of `layout`, one at a time in listing order.
///
/// A conflict or failure on one hook does not stop the others.
///
/// # Errors
///
/// Returns [`HooklinkError::Io`] only if the source directory cannot be
/// listed.
pub fn install_hooks(
    layout: &HookLayout,
    options: &InstallOptions,
) -> Result<InstallReport, HooklinkError> {
    let entries = layout
        .hooks()?
        .into_iter()
        .map(|hook| {
            let outcome = install_hook(&hook, options);
            HookReport { hook, outcome }
        })
        .collect();

    Ok(InstallReport { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup(tmp: &TempDir, hooks: &[&str]) -> HookLayout {
        let source = tmp.path().join("config").join("git").join("hooks");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(tmp.path().join(".git").join("hooks")).unwrap();
        for name in hooks {
            fs::write(source.join(name), format!("#!/usr/bin/env python3\n# {name}\n")).unwrap();
        }
        HookLayout::open(tmp.path()).unwrap()
    }

    fn hook(layout: &HookLayout, name: &str) -> Hook {
        Hook {
            name: name.to_string(),
            source: layout.source_dir().join(name),
            target: layout.target_dir().join(name),
        }
    }

    fn stub_options() -> InstallOptions {
        InstallOptions::new(InstallMode::Stub, Interpreter::default())
    }

    #[test]
    fn stub_content_matches_template() {
        let source = Path::new("/repo/config/git/hooks/pre-commit");
        let content = stub_content(source, &Interpreter::default());
        assert_eq!(
            content,
            "#!/usr/bin/sh\npython '/repo/config/git/hooks/pre-commit' $@"
        );
    }

    #[test]
    fn stub_content_uses_interpreter_override() {
        let interpreter = Interpreter::new(Some("py".into()));
        let content = stub_content(Path::new("/r/h"), &interpreter);
        assert_eq!(content, "#!/usr/bin/sh\npy '/r/h' $@");
    }

    #[test]
    fn install_mode_display() {
        assert_eq!(InstallMode::Symlink.to_string(), "symlink");
        assert_eq!(format!("{}", InstallMode::Stub), "stub");
    }

    #[test]
    fn platform_mode() {
        let expected = if cfg!(windows) {
            InstallMode::Stub
        } else {
            InstallMode::Symlink
        };
        assert_eq!(InstallMode::for_current_platform(), expected);
    }

    #[test]
    fn stub_installs_then_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let layout = setup(&tmp, &["pre-commit", "commit-msg"]);
        let options = stub_options();

        let first = install_hooks(&layout, &options).unwrap();
        assert_eq!(first.summary().installed, 2);
        for entry in &first.entries {
            assert_eq!(entry.outcome, HookOutcome::StubCreated);
            let written = fs::read_to_string(&entry.hook.target).unwrap();
            assert_eq!(written, stub_content(&entry.hook.source, &options.interpreter));
        }

        let second = install_hooks(&layout, &options).unwrap();
        assert_eq!(second.summary().already_installed, 2);
        assert!(second.is_clean());
    }

    #[test]
    fn stub_conflict_leaves_file_untouched() {
        let tmp = TempDir::new().unwrap();
        let layout = setup(&tmp, &["pre-commit"]);
        let h = hook(&layout, "pre-commit");
        fs::write(&h.target, b"#!/bin/sh\necho custom\n").unwrap();

        assert_eq!(install_hook(&h, &stub_options()), HookOutcome::Conflict);
        assert_eq!(fs::read(&h.target).unwrap(), b"#!/bin/sh\necho custom\n");
    }

    #[test]
    fn stub_with_trailing_newline_is_a_conflict() {
        let tmp = TempDir::new().unwrap();
        let layout = setup(&tmp, &["pre-commit"]);
        let h = hook(&layout, "pre-commit");
        let options = stub_options();
        let stub = stub_content(&h.source, &options.interpreter);
        fs::write(&h.target, format!("{stub}\n")).unwrap();

        assert_eq!(plan_hook(&h, &options).unwrap(), Plan::Conflict);
    }

    #[test]
    fn stub_directory_at_target_is_a_conflict() {
        let tmp = TempDir::new().unwrap();
        let layout = setup(&tmp, &["pre-commit"]);
        let h = hook(&layout, "pre-commit");
        fs::create_dir(&h.target).unwrap();

        assert_eq!(install_hook(&h, &stub_options()), HookOutcome::Conflict);
        assert!(h.target.is_dir());
    }

    #[test]
    fn dry_run_plans_without_writing() {
        let tmp = TempDir::new().unwrap();
        let layout = setup(&tmp, &["pre-commit"]);
        let mut options = stub_options();
        options.dry_run = true;

        let report = install_hooks(&layout, &options).unwrap();
        assert_eq!(report.entries[0].outcome, HookOutcome::Planned(InstallMode::Stub));
        assert_eq!(report.summary().planned, 1);
        assert!(!layout.target_dir().join("pre-commit").exists());
    }

    #[test]
    fn report_summary_counts_each_kind() {
        let tmp = TempDir::new().unwrap();
        let layout = setup(&tmp, &["a", "b", "c"]);
        let options = stub_options();
        install_hook(&hook(&layout, "a"), &options);
        fs::write(layout.target_dir().join("b"), "other").unwrap();

        let report = install_hooks(&layout, &options).unwrap();
        let summary = report.summary();
        assert_eq!(summary.already_installed, 1);
        assert_eq!(summary.conflicts, 1);
        assert_eq!(summary.installed, 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn outcome_messages() {
        assert_eq!(
            HookOutcome::Linked(ExecNotice::MadeExecutable).message(),
            "Symlink successfully installed (updated to executable)"
        );
        assert_eq!(
            HookOutcome::Linked(ExecNotice::AlreadyExecutable).message(),
            "Symlink successfully installed (already executable)"
        );
        assert_eq!(HookOutcome::AlreadyInstalled.kind().as_str(), "already-installed");
        assert_eq!(HookOutcome::Failed("x".into()).kind(), OutcomeKind::Failed);
    }

    #[test]
    fn failed_fill_removes_created_file() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("pre-commit");

        let err = create_new_with(&target, |file| {
            file.write_all(b"#!/usr/bin/sh\n")?;
            Err(io::Error::other("disk full"))
        })
        .unwrap_err();

        assert_eq!(err.to_string(), "disk full");
        assert!(fs::symlink_metadata(&target).is_err());
    }

    #[test]
    fn create_new_with_never_touches_existing_file() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("pre-commit");
        fs::write(&target, "mine").unwrap();

        let err = create_new_with(&target, |_| Ok(())).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&target).unwrap(), "mine");
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        fn symlink_options() -> InstallOptions {
            InstallOptions::new(InstallMode::Symlink, Interpreter::default())
        }

        fn set_mode(path: &Path, mode: u32) {
            fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
        }

        #[test]
        fn links_and_marks_executable() {
            let tmp = TempDir::new().unwrap();
            let layout = setup(&tmp, &["pre-commit"]);
            let h = hook(&layout, "pre-commit");
            set_mode(&h.source, 0o644);

            let outcome = install_hook(&h, &symlink_options());
            assert_eq!(outcome, HookOutcome::Linked(ExecNotice::MadeExecutable));
            assert_eq!(fs::read_link(&h.target).unwrap(), h.source);

            let mode = fs::metadata(&h.source).unwrap().permissions().mode();
            assert!(mode & 0o100 != 0, "source should be owner-executable");
        }

        #[test]
        fn reports_already_executable_source() {
            let tmp = TempDir::new().unwrap();
            let layout = setup(&tmp, &["pre-commit"]);
            let h = hook(&layout, "pre-commit");
            set_mode(&h.source, 0o755);

            assert_eq!(
                install_hook(&h, &symlink_options()),
                HookOutcome::Linked(ExecNotice::AlreadyExecutable)
            );
        }

        #[test]
        fn second_run_is_already_installed() {
            let tmp = TempDir::new().unwrap();
            let layout = setup(&tmp, &["pre-commit", "commit-msg"]);
            let options = symlink_options();

            let first = install_hooks(&layout, &options).unwrap();
            assert_eq!(first.summary().installed, 2);

            let second = install_hooks(&layout, &options).unwrap();
            assert_eq!(second.summary().already_installed, 2);
            for entry in &second.entries {
                assert_eq!(fs::read_link(&entry.hook.target).unwrap(), entry.hook.source);
            }
        }

        #[test]
        fn regular_file_at_target_is_a_conflict() {
            let tmp = TempDir::new().unwrap();
            let layout = setup(&tmp, &["pre-commit"]);
            let h = hook(&layout, "pre-commit");
            fs::write(&h.target, "custom hook").unwrap();

            assert_eq!(install_hook(&h, &symlink_options()), HookOutcome::Conflict);
            assert_eq!(fs::read_to_string(&h.target).unwrap(), "custom hook");
        }

        #[test]
        fn foreign_symlink_is_a_conflict() {
            let tmp = TempDir::new().unwrap();
            let layout = setup(&tmp, &["pre-commit"]);
            let h = hook(&layout, "pre-commit");
            let elsewhere = tmp.path().join("elsewhere");
            fs::write(&elsewhere, "").unwrap();
            std::os::unix::fs::symlink(&elsewhere, &h.target).unwrap();

            assert_eq!(install_hook(&h, &symlink_options()), HookOutcome::Conflict);
            assert_eq!(fs::read_link(&h.target).unwrap(), elsewhere);
        }

        #[test]
        fn dangling_symlink_is_a_conflict() {
            let tmp = TempDir::new().unwrap();
            let layout = setup(&tmp, &["pre-commit"]);
            let h = hook(&layout, "pre-commit");
            std::os::unix::fs::symlink(tmp.path().join("gone"), &h.target).unwrap();

            assert_eq!(install_hook(&h, &symlink_options()), HookOutcome::Conflict);
        }

        #[test]
        fn conflict_does_not_stop_other_hooks() {
            let tmp = TempDir::new().unwrap();
            let layout = setup(&tmp, &["pre-commit", "commit-msg"]);
            fs::write(layout.target_dir().join("pre-commit"), "mine").unwrap();

            let report = install_hooks(&layout, &symlink_options()).unwrap();
            let summary = report.summary();
            assert_eq!(summary.conflicts, 1);
            assert_eq!(summary.installed, 1);
            assert_eq!(
                fs::read_link(layout.target_dir().join("commit-msg")).unwrap(),
                layout.source_dir().join("commit-msg")
            );
        }

        #[test]
        fn unreadable_source_fails_without_stopping_others() {
            let tmp = TempDir::new().unwrap();
            let layout = setup(&tmp, &["pre-commit"]);
            std::os::unix::fs::symlink(
                tmp.path().join("missing"),
                layout.source_dir().join("broken"),
            )
            .unwrap();

            let report = install_hooks(&layout, &symlink_options()).unwrap();
            let summary = report.summary();
            assert_eq!(summary.failed, 1);
            assert_eq!(summary.installed, 1);

            let broken = report
                .entries
                .iter()
                .find(|e| e.hook.name == "broken")
                .unwrap();
            assert!(matches!(broken.outcome, HookOutcome::Failed(_)));
            assert!(fs::symlink_metadata(layout.target_dir().join("broken")).is_err());
            assert_eq!(
                fs::read_link(layout.target_dir().join("pre-commit")).unwrap(),
                layout.source_dir().join("pre-commit")
            );
        }

        #[test]
        fn stub_mode_symlink_at_target_is_a_conflict() {
            let tmp = TempDir::new().unwrap();
            let layout = setup(&tmp, &["pre-commit"]);
            let h = hook(&layout, "pre-commit");
            let options = stub_options();

            // Even a link to a file holding the exact stub is not a regular file.
            let lookalike = tmp.path().join("lookalike");
            fs::write(&lookalike, stub_content(&h.source, &options.interpreter)).unwrap();
            std::os::unix::fs::symlink(&lookalike, &h.target).unwrap();

            assert_eq!(install_hook(&h, &options), HookOutcome::Conflict);
            assert_eq!(fs::read_link(&h.target).unwrap(), lookalike);
        }

        #[test]
        fn stub_is_executable() {
            let tmp = TempDir::new().unwrap();
            let layout = setup(&tmp, &["pre-commit"]);
            let h = hook(&layout, "pre-commit");

            install_hook(&h, &stub_options());
            let mode = fs::metadata(&h.target).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }
}
