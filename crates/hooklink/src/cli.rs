use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use hooklink_core::InstallMode;

#[derive(Parser, Debug)]
#[command(
    name = "hooklink",
    version,
    about = "Install the repository's tracked git hooks into .git/hooks"
)]
pub struct Cli {
    /// Directory to discover the repository from (defaults to the current directory)
    #[arg(long, env = "HOOKLINK_FROM")]
    pub from: Option<PathBuf>,

    /// How hooks are installed
    #[arg(long, value_enum, env = "HOOKLINK_MODE", default_value = "auto")]
    pub mode: ModeArg,

    /// Interpreter to probe for and to launch from stub scripts
    #[arg(long, env = "HOOKLINK_INTERPRETER")]
    pub interpreter: Option<String>,

    /// Report what would be installed without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Output machine-readable JSON
    #[arg(long)]
    pub json: bool,

    /// Suppress everything except conflicts and errors
    #[arg(long)]
    pub quiet: bool,

    /// Color mode
    #[arg(long, default_value = "auto")]
    pub color: ColorMode,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Stub scripts on Windows, symlinks elsewhere
    Auto,
    Symlink,
    Stub,
}

impl ModeArg {
    pub fn resolve(self) -> InstallMode {
        match self {
            ModeArg::Auto => InstallMode::for_current_platform(),
            ModeArg::Symlink => InstallMode::Symlink,
            ModeArg::Stub => InstallMode::Stub,
        }
    }
}
