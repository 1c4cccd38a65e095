use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Spinner shown while an export runs. Falls back to structured log
/// events when stdout or stderr is not a terminal.
pub struct ExportUI {
    spinner: ProgressBar,
    interactive: bool,
}

impl ExportUI {
    pub fn new(quiet: bool) -> Self {
        let interactive = !quiet && is_interactive();

        let spinner = if interactive {
            let spinner = ProgressBar::new_spinner();
            let style = ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
            spinner.set_style(style);
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner
        } else {
            tracing::debug!(
                operation = "ui_init",
                mode = "non_interactive",
                "Running in non-interactive mode - spinner disabled, using structured logging"
            );
            ProgressBar::hidden()
        };

        Self { spinner, interactive }
    }

    pub fn set_message(&self, msg: String) {
        if self.interactive {
            self.spinner.set_message(msg);
        } else {
            tracing::info!(operation = "progress", message = %msg, "Progress update");
        }
    }

    pub fn finish(&self) {
        if self.interactive {
            self.spinner.finish_and_clear();
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
