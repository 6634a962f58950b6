use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn filter_directive(debug: bool, quiet: bool) -> &'static str {
    if debug {
        "req_notifier=debug"
    } else if quiet {
        "req_notifier=error"
    } else {
        "req_notifier=info"
    }
}

/// Initialize logging based on output mode and debug flag
pub fn init_logging(debug: bool, quiet: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::new(filter_directive(debug, quiet));

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(debug)
        .with_file(debug)
        .with_writer(std::io::stderr);

    if let Some(log_path) = log_file {
        let dir = log_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = log_path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("log file path has no file name: {}", log_path.display()))?;

        std::fs::create_dir_all(dir)?;
        let appender = tracing_appender::rolling::never(dir, name);

        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_writer(appender)
            .with_target(true)
            .with_line_number(true)
            .with_file(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
    }

    Ok(())
}

/// Get default log file path for a stage run
pub fn default_log_path(stage: &str) -> anyhow::Result<PathBuf> {
    let log_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("req-notifier")
        .join("logs");

    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let filename = format!("{}-{}.log", stage, timestamp);

    Ok(log_dir.join(filename))
}
