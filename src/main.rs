mod cli;
mod clock;
mod config;
mod logging;
mod mail;
mod prompt;
mod sheet;
mod template;
mod workflow;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cli::{OutputMode, RunOptions, commands, create_handler};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "req-notifier")]
#[command(about = "Email requisitioners as procurement requests move through workflow stages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file applied after the user and project files
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Workbook directory (overrides [workbook] dir)
    #[arg(long, global = true)]
    workbook: Option<String>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Suppress normal output
    #[arg(long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputMode::Console)]
    output: OutputMode,

    /// Also write logs to a file; bare `--log-file` picks a timestamped one under the config dir
    #[arg(long, global = true, num_args = 0..=1, require_equals = true, value_name = "PATH")]
    log_file: Option<Option<PathBuf>>,
}

#[derive(Subcommand)]
enum Commands {
    /// Notify every pending row of a stage
    Run {
        /// Stage key or action name (assigned, approved, awarded, info, ...)
        stage: String,

        /// Template name to use instead of the stage's own
        #[arg(long)]
        template: Option<String>,

        /// Send without asking for confirmation
        #[arg(long)]
        yes: bool,

        /// Render and log messages without sending or saving
        #[arg(long)]
        dry_run: bool,
    },

    /// Send the new-submission notice to the distribution list
    NotifySubmission {
        /// Log the notice instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// List the template table
    Templates,

    /// List configured stages
    Stages,

    /// Check configuration, workbook and mail transport
    Doctor,
}

impl Commands {
    /// Name used for default log files
    fn log_name(&self) -> &str {
        match self {
            Commands::Run { stage, .. } => stage,
            Commands::NotifySubmission { .. } => "notify-submission",
            Commands::Templates => "templates",
            Commands::Stages => "stages",
            Commands::Doctor => "doctor",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        config::NotifierConfig::load(None, cli.config.as_deref()).context("loading configuration")?;
    if let Some(dir) = cli.workbook {
        config.workbook.dir = dir;
    }

    let quiet = cli.quiet || cli.output == OutputMode::Quiet;
    let log_file = match cli.log_file {
        Some(Some(path)) => Some(path),
        Some(None) => Some(logging::default_log_path(cli.command.log_name())?),
        None => config.log_file(),
    };
    logging::init_logging(cli.debug, quiet, log_file.as_deref())?;

    let mode = if cli.quiet { OutputMode::Quiet } else { cli.output };
    let handler = create_handler(mode, cli.debug);

    let outcome = match cli.command {
        Commands::Run {
            stage,
            template,
            yes,
            dry_run,
        } => {
            let options = RunOptions {
                template,
                yes,
                dry_run,
            };
            commands::run_stage(&stage, &options, &config, &*handler).await
        }
        Commands::NotifySubmission { dry_run } => {
            commands::notify_submission(&config, dry_run, &*handler).await
        }
        Commands::Templates => commands::list_templates(&config, &*handler),
        Commands::Stages => {
            commands::list_stages(&config, &*handler);
            Ok(0)
        }
        Commands::Doctor => Ok(commands::doctor(&config, &*handler).await),
    };

    match outcome {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
