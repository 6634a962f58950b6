//! Notification workflow for req-notifier
//!
//! One parameterized pipeline serves every stage:
//! - Load the data sheet and the template table
//! - Select rows whose Action matches and whose log cell is still empty
//! - For each row: resolve the template, fill placeholders, confirm, send
//! - Record `<Action>: <timestamp>` or `Error: <message>` per row
//! - Write the log column back in one call
//!
//! # Example
//!
//! ```ignore
//! use req_notifier::workflow::{ExecutionContext, RunRequest, RunSettings, WorkflowRunner};
//!
//! let ctx = ExecutionContext::new(&store, &renderer, &prompt, &mailer, &clock)
//!     .with_settings(RunSettings::from_config(&config));
//! let runner = WorkflowRunner::new(ctx);
//!
//! let request = RunRequest::new("assigned", "Assigned").with_log_column("Log Assigned");
//! let report = runner.run(&request).await?;
//! runner.persist(&report)?;
//! ```

mod executor;
mod outcome;
mod runner;
mod submission;

pub use executor::{ExecutionContext, RunSettings};
pub use outcome::{OutcomeKind, RowOutcome};
pub use runner::{RunRequest, WorkflowRunner};
pub use submission::send_notice;
