mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::{Cli, ColorMode};
use commands::install::{run_install, InstallArgs};
use hooklink_core::SystemEnvironment;
use output::{OutputMode, Reporter};

fn main() {
    let cli = Cli::parse();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Human
    };

    match cli.color {
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Auto => {}
    }

    let mut reporter = Reporter::new(mode);

    let args = InstallArgs {
        from: cli.from,
        mode: cli.mode,
        interpreter: cli.interpreter,
        dry_run: cli.dry_run,
    };
    let success = run_install(&args, &SystemEnvironment, &mut reporter);

    reporter.finish();

    if !success {
        std::process::exit(1);
    }
}
