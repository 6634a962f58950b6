//! CLI module for req-notifier
//!
//! This module provides:
//! - Command implementations (run, notify-submission, templates, stages, doctor)
//! - Output handlers (console, JSON, quiet)
//!
//! # Example
//!
//! ```ignore
//! use req_notifier::cli::{commands, output};
//!
//! let handler = output::create_handler(output::OutputMode::Console, false);
//! let exit_code = commands::run_stage("assigned", &RunOptions::default(), &config, &*handler).await?;
//! ```

pub mod commands;
pub mod output;

pub use commands::RunOptions;
pub use output::{OutputMode, create_handler};
