use colored::*;
use hooklink_core::install::{HookReport, InstallSummary, OutcomeKind};
use serde::Serialize;

/// Output mode for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Quiet,
}

/// Accumulated JSON result entry.
#[derive(Debug, Serialize, Clone)]
pub struct JsonResultEntry {
    #[serde(rename = "type")]
    pub result_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Accumulated JSON output.
#[derive(Debug, Serialize)]
pub struct JsonOutput {
    pub results: Vec<JsonResultEntry>,
}

/// Reporter handles all output formatting.
pub struct Reporter {
    mode: OutputMode,
    json_results: Vec<JsonResultEntry>,
}

impl Reporter {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            json_results: Vec::new(),
        }
    }

    fn push(&mut self, result_type: &str, message: &str, hook: Option<&str>, details: Option<String>) {
        self.json_results.push(JsonResultEntry {
            result_type: result_type.to_string(),
            message: message.to_string(),
            hook: hook.map(str::to_string),
            details,
        });
    }

    pub fn error(&mut self, message: &str) {
        match self.mode {
            OutputMode::Human | OutputMode::Quiet => {
                eprintln!("{} {}", "ERROR:".red(), message);
            }
            OutputMode::Json => self.push("error", message, None, None),
        }
    }

    pub fn warning(&mut self, message: &str) {
        match self.mode {
            OutputMode::Human => {
                eprintln!("{} {}", "WARNING:".yellow(), message);
            }
            OutputMode::Json => self.push("warning", message, None, None),
            OutputMode::Quiet => {}
        }
    }

    pub fn success(&mut self, message: &str) {
        match self.mode {
            OutputMode::Human => {
                println!("{} {}", "✓".green(), message);
            }
            OutputMode::Json => self.push("success", message, None, None),
            OutputMode::Quiet => {}
        }
    }

    pub fn info(&mut self, message: &str) {
        match self.mode {
            OutputMode::Human => {
                println!("{} {}", "INFO:".blue(), message);
            }
            OutputMode::Json => self.push("info", message, None, None),
            OutputMode::Quiet => {}
        }
    }

    pub fn section(&mut self, title: &str) {
        if self.mode == OutputMode::Human {
            println!("{}", format!("=== {title} ===").cyan());
        }
    }

    /// Report the outcome of a single hook.
    ///
    /// Conflicts and failures are shown even in quiet mode; a conflict also
    /// names the path the user has to remove.
    pub fn hook(&mut self, entry: &HookReport) {
        let kind = entry.outcome.kind();
        let message = entry.outcome.message();
        let name = entry.hook.name.as_str();
        let hint = (kind == OutcomeKind::Conflict).then(|| {
            format!("Remove {} and try again.", entry.hook.target.display())
        });

        match self.mode {
            OutputMode::Json => {
                let details = hint.or_else(|| Some(entry.hook.target.display().to_string()));
                self.push(kind.as_str(), &message, Some(name), details);
            }
            OutputMode::Human => {
                let marker = match kind {
                    OutcomeKind::Installed => "✓".green(),
                    OutcomeKind::AlreadyInstalled => "☑".blue(),
                    OutcomeKind::Planned => "→".cyan(),
                    OutcomeKind::Conflict | OutcomeKind::Failed => "✗".red(),
                };
                println!("- {name}: {marker} {message}");
                if let Some(hint) = hint {
                    println!("  {} {hint}", "Hint:".yellow());
                }
            }
            OutputMode::Quiet => {
                if matches!(kind, OutcomeKind::Conflict | OutcomeKind::Failed) {
                    eprintln!("{} {name}: {message}", "ERROR:".red());
                    if let Some(hint) = hint {
                        eprintln!("  {} {hint}", "Hint:".yellow());
                    }
                }
            }
        }
    }

    /// Closing line with per-kind totals.
    pub fn summary(&mut self, summary: &InstallSummary, dry_run: bool) {
        let mut parts = Vec::new();
        if dry_run {
            parts.push(format!("{} to install", summary.planned));
        } else {
            parts.push(format!("{} installed", summary.installed));
        }
        parts.push(format!("{} already installed", summary.already_installed));
        parts.push(format!("{} conflicting", summary.conflicts));
        parts.push(format!("{} failed", summary.failed));
        let line = parts.join(", ");

        if summary.conflicts + summary.failed == 0 {
            self.success(&line);
        } else {
            self.warning(&line);
        }
    }

    pub fn finish(&self) {
        if self.mode == OutputMode::Json {
            let output = JsonOutput {
                results: self.json_results.clone(),
            };
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                println!("{json}");
            }
        }
    }
}
