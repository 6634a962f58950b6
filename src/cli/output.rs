//! Output handlers for CLI commands
//!
//! Supports console (pretty), JSON, and quiet output modes.

use crate::workflow::{OutcomeKind, RowOutcome};
use serde::{Deserialize, Serialize};

/// Output mode for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputMode {
    #[default]
    Console,
    Json,
    Quiet,
}

/// Events emitted while running a stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum OutputEvent {
    RunStart {
        stage: String,
        action: String,
        log_column: Option<String>,
        dry_run: bool,
    },
    Row {
        sheet_row: usize,
        status: String,
        entry: String,
    },
    RunComplete {
        stage: String,
        sent: usize,
        skipped: usize,
        failed: usize,
        saved: bool,
    },
    RunError {
        error: String,
    },
    Info {
        message: String,
    },
    Debug {
        message: String,
    },
}

impl OutputEvent {
    pub fn row(outcome: &RowOutcome) -> Self {
        let status = match outcome.kind {
            OutcomeKind::Sent => "sent",
            OutcomeKind::Skipped => "skipped",
            OutcomeKind::Error(_) => "error",
        };
        Self::Row {
            sheet_row: outcome.sheet_row,
            status: status.into(),
            entry: outcome.entry.clone(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::Info {
            message: message.into(),
        }
    }
}

/// Output handler trait
pub trait OutputHandler: Send + Sync {
    /// Emit an event
    fn emit(&self, event: OutputEvent);

    /// Write final result
    fn result(&self, success: bool, output: Option<&str>);
}

/// Console output handler
pub struct ConsoleHandler {
    debug: bool,
}

impl ConsoleHandler {
    /// Create a new console handler
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    fn status_mark(status: &str) -> &'static str {
        match status {
            "sent" => "✓",
            "skipped" => "-",
            _ => "✗",
        }
    }
}

impl OutputHandler for ConsoleHandler {
    fn emit(&self, event: OutputEvent) {
        match event {
            OutputEvent::RunStart {
                stage,
                action,
                log_column,
                dry_run,
            } => {
                let log = log_column
                    .map(|c| format!("logging to '{}'", c))
                    .unwrap_or_else(|| "no log column".into());
                let mode = if dry_run { " [dry run]" } else { "" };
                eprintln!("Running stage '{}' (action '{}', {}){}", stage, action, log, mode);
            }
            OutputEvent::Row {
                sheet_row,
                status,
                entry,
            } => {
                eprintln!("  {} row {}: {}", Self::status_mark(&status), sheet_row, entry);
            }
            OutputEvent::RunComplete {
                stage,
                sent,
                skipped,
                failed,
                saved,
            } => {
                eprintln!();
                let mark = if failed == 0 { "✓" } else { "✗" };
                eprintln!(
                    "{} Stage '{}': {} sent, {} skipped, {} failed{}",
                    mark,
                    stage,
                    sent,
                    skipped,
                    failed,
                    if saved { "" } else { " (log not saved)" }
                );
            }
            OutputEvent::RunError { error } => {
                eprintln!("Error: {}", error);
            }
            OutputEvent::Info { message } => {
                eprintln!("{}", message);
            }
            OutputEvent::Debug { message } => {
                if self.debug {
                    eprintln!("[debug] {}", message);
                }
            }
        }
    }

    fn result(&self, _success: bool, output: Option<&str>) {
        if let Some(out) = output {
            println!("{}", out);
        }
    }
}

/// JSON output handler
pub struct JsonHandler {
    pretty: bool,
}

impl JsonHandler {
    /// Create a new JSON handler
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn print_json<T: Serialize>(&self, value: &T) {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };

        if let Ok(s) = json {
            println!("{}", s);
        }
    }
}

impl OutputHandler for JsonHandler {
    fn emit(&self, event: OutputEvent) {
        self.print_json(&event);
    }

    fn result(&self, success: bool, output: Option<&str>) {
        #[derive(Serialize)]
        struct FinalResult<'a> {
            success: bool,
            output: Option<&'a str>,
        }

        self.print_json(&FinalResult { success, output });
    }
}

/// Quiet handler that emits nothing
pub struct QuietHandler;

impl OutputHandler for QuietHandler {
    fn emit(&self, _event: OutputEvent) {}
    fn result(&self, _success: bool, output: Option<&str>) {
        if let Some(out) = output {
            println!("{}", out);
        }
    }
}

/// Create an output handler based on mode
pub fn create_handler(mode: OutputMode, debug: bool) -> Box<dyn OutputHandler> {
    match mode {
        OutputMode::Console => Box::new(ConsoleHandler::new(debug)),
        OutputMode::Json => Box::new(JsonHandler::new(false)),
        OutputMode::Quiet => Box::new(QuietHandler),
    }
}
