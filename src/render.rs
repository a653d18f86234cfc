//! Terminal output for the CLI.
//!
//! Everything goes to stderr except the final outcome line, so scripts can
//! capture the result message from stdout.

use crossterm::style::{Color, Stylize};

use crate::types::UpdateOutcome;

const LABEL_OK: &str = "ok:";
const LABEL_ERROR: &str = "error:";
const LABEL_WARN: &str = "warning:";
const INDENT: &str = "  ";

/// Renders CLI messages with optional ANSI color.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// One `key: value` row of the pending-change summary.
    pub fn field(&self, key: &str, value: &str) {
        eprintln!("{}", self.field_line(key, value));
    }

    pub fn warn(&self, msg: &str) {
        eprintln!("{}", self.labeled(LABEL_WARN, Color::Yellow, msg));
    }

    pub fn error(&self, msg: &str) {
        eprintln!("{}", self.labeled(LABEL_ERROR, Color::Red, msg));
    }

    /// Final result: successes on stdout, failures on stderr.
    pub fn outcome(&self, outcome: &UpdateOutcome) {
        if outcome.succeeded {
            println!("{}", self.labeled(LABEL_OK, Color::Green, &outcome.message));
        } else {
            self.error(&outcome.message);
        }
    }

    /// Final result as one JSON line on stdout.
    pub fn outcome_json(&self, outcome: &UpdateOutcome) {
        match serde_json::to_string(outcome) {
            Ok(line) => println!("{line}"),
            Err(e) => self.error(&format!("failed to encode outcome: {e}")),
        }
    }

    fn field_line(&self, key: &str, value: &str) -> String {
        if self.color {
            format!(
                "{INDENT}{} {}",
                format!("{key}:").with(Color::DarkGrey),
                value.with(Color::White)
            )
        } else {
            format!("{INDENT}{key}: {value}")
        }
    }

    fn labeled(&self, label: &str, color: Color, msg: &str) -> String {
        if self.color {
            format!("{} {msg}", label.with(color).bold())
        } else {
            format!("{label} {msg}")
        }
    }
}
