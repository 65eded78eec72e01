pub mod env;
pub mod error;
pub mod install;
pub mod layout;

pub use env::{preflight, Environment, Interpreter, Preflight, SystemEnvironment};
pub use error::HooklinkError;
pub use install::{
    install_hooks, stub_content, HookOutcome, InstallMode, InstallOptions, InstallReport,
    InstallSummary, OutcomeKind,
};
pub use layout::{Hook, HookLayout};
