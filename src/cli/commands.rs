//! CLI command implementations

use super::output::{OutputEvent, OutputHandler};
use crate::clock::SystemClock;
use crate::config::{NotifierConfig, TransportKind};
use crate::mail::{LogTransport, MailTransport, create_transport};
use crate::prompt::{AutoConfirm, ConfirmationPrompt, TerminalPrompt};
use crate::sheet::{CsvStore, Dataset, TabularStore};
use crate::template::{DocumentFetcher, TemplateResolver, TemplateTable, suggest_correction};
use crate::workflow::{
    ExecutionContext, RunRequest, RunSettings, WorkflowRunner, send_notice,
};
use std::time::Duration;

/// Flags for `run`
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Template name instead of the stage's own
    pub template: Option<String>,
    /// Confirm every row without asking
    pub yes: bool,
    /// Render and log messages; send and save nothing
    pub dry_run: bool,
}

fn workbook_store(config: &NotifierConfig) -> CsvStore {
    CsvStore::new(config.workbook.resolved_dir())
}

/// Run one stage against the configured workbook
pub async fn run_stage(
    stage_name: &str,
    options: &RunOptions,
    config: &NotifierConfig,
    handler: &dyn OutputHandler,
) -> Result<i32, String> {
    let (key, stage) = config.get_stage(stage_name).ok_or_else(|| {
        let known: Vec<&str> = config.stages.keys().map(String::as_str).collect();
        match suggest_correction(&stage_name.to_lowercase(), &known) {
            Some(s) => format!("Unknown stage '{}'. Did you mean '{}'?", stage_name, s),
            None => format!(
                "Unknown stage '{}'. Known stages: {}",
                stage_name,
                known.join(", ")
            ),
        }
    })?;
    let request = RunRequest::from_stage(key, stage, options.template.as_deref());

    let store = workbook_store(config);
    let renderer = DocumentFetcher::new(
        config.workbook.resolved_dir(),
        Duration::from_secs(config.documents.timeout),
    )
    .map_err(|e| e.to_string())?
    .with_bearer_token(config.documents.token());

    let mailer: Box<dyn MailTransport> = if options.dry_run {
        Box::new(LogTransport)
    } else {
        create_transport(&config.mail).map_err(|e| format!("Mail transport: {}", e))?
    };
    let prompt: Box<dyn ConfirmationPrompt> = if options.yes || options.dry_run {
        Box::new(AutoConfirm::yes())
    } else {
        Box::new(TerminalPrompt::stdin())
    };
    let clock = SystemClock;

    let ctx = ExecutionContext::new(&store, &renderer, prompt.as_ref(), mailer.as_ref(), &clock)
        .with_settings(RunSettings::from_config(config));
    let runner = WorkflowRunner::new(ctx);

    execute_stage(&runner, &request, options.dry_run, handler).await
}

/// Run a request through `runner`, persist unless dry-running, and report
pub async fn execute_stage(
    runner: &WorkflowRunner<'_>,
    request: &RunRequest,
    dry_run: bool,
    handler: &dyn OutputHandler,
) -> Result<i32, String> {
    handler.emit(OutputEvent::RunStart {
        stage: request.stage.clone(),
        action: request.action.clone(),
        log_column: request.log_column.clone(),
        dry_run,
    });

    let report = match runner.run(request).await {
        Ok(report) => report,
        Err(e) => {
            handler.emit(OutputEvent::RunError {
                error: e.to_string(),
            });
            if e.is_configuration() {
                return Err(format!(
                    "Stage '{}' did not run, no messages were sent: {}",
                    request.stage, e
                ));
            }
            return Err(format!("Stage '{}' failed: {}", request.stage, e));
        }
    };

    for outcome in &report.outcomes {
        handler.emit(OutputEvent::row(outcome));
    }

    let saved = if dry_run {
        false
    } else {
        runner
            .persist(&report)
            .map_err(|e| format!("Failed to save log column: {}", e))?
    };

    handler.emit(OutputEvent::RunComplete {
        stage: report.stage.clone(),
        sent: report.sent(),
        skipped: report.skipped(),
        failed: report.failed(),
        saved,
    });

    let success = !report.has_errors();
    handler.result(success, None);

    Ok(if success { 0 } else { 1 })
}

/// Send the submission notice to the configured distribution list
pub async fn notify_submission(
    config: &NotifierConfig,
    dry_run: bool,
    handler: &dyn OutputHandler,
) -> Result<i32, String> {
    let mailer: Box<dyn MailTransport> = if dry_run {
        Box::new(LogTransport)
    } else {
        create_transport(&config.mail).map_err(|e| format!("Mail transport: {}", e))?
    };

    let message = send_notice(
        &config.submission_notice,
        config.workbook.url.as_deref(),
        mailer.as_ref(),
    )
    .await
    .map_err(|e| format!("Submission notice failed: {}", e))?;

    handler.emit(OutputEvent::info(format!(
        "✓ Submission notice sent to {}",
        message.to.join(", ")
    )));
    handler.result(true, None);
    Ok(0)
}

/// List the template table
pub fn list_templates(config: &NotifierConfig, handler: &dyn OutputHandler) -> Result<i32, String> {
    let store = workbook_store(config);
    let rows = store
        .read_all(&config.workbook.templates_sheet)
        .map_err(|e| e.to_string())?;
    let table = TemplateTable::from_rows(&rows);

    if table.is_empty() {
        handler.emit(OutputEvent::info("(no templates defined)"));
        return Ok(0);
    }

    for (name, reference) in table.iter() {
        handler.emit(OutputEvent::info(format!("{} → {}", name, reference)));
    }
    Ok(0)
}

/// List configured stages
pub fn list_stages(config: &NotifierConfig, handler: &dyn OutputHandler) {
    if config.stages.is_empty() {
        handler.emit(OutputEvent::info("(no stages configured)"));
        return;
    }

    for (key, stage) in &config.stages {
        let log = stage
            .log_column
            .as_deref()
            .map(|c| format!("log: {}", c))
            .unwrap_or_else(|| "no log column".into());
        handler.emit(OutputEvent::info(format!(
            "{} (action: {}, {}, template: {})",
            key,
            stage.action,
            log,
            stage.template_name(None)
        )));
        if !stage.description.is_empty() {
            handler.emit(OutputEvent::info(format!("  {}", stage.description)));
        }
    }
}

/// Check configuration, workbook layout, templates and mail transport
pub async fn doctor(config: &NotifierConfig, handler: &dyn OutputHandler) -> i32 {
    let store = workbook_store(config);
    let mut all_ok = store.dir().is_dir();
    handler.emit(OutputEvent::info(format!(
        "{} workbook: {}",
        if all_ok { "✓" } else { "✗" },
        store.dir().display()
    )));
    all_ok &= check_workbook(config, &store, handler);

    handler.emit(OutputEvent::info("\nChecking mail transport..."));
    match config.mail.transport {
        TransportKind::Command => {
            let check = tokio::process::Command::new("which")
                .arg(&config.mail.command)
                .output()
                .await;
            match check {
                Ok(out) if out.status.success() => {
                    handler.emit(OutputEvent::info(format!("✓ command: {}", config.mail.command)));
                }
                _ => {
                    all_ok = false;
                    handler.emit(OutputEvent::info(format!(
                        "✗ command: {} - not found",
                        config.mail.command
                    )));
                }
            }
        }
        TransportKind::Http => match config.mail.url {
            Some(ref url) => handler.emit(OutputEvent::info(format!("✓ http: {}", url))),
            None => {
                all_ok = false;
                handler.emit(OutputEvent::info("✗ http: no url configured"));
            }
        },
        TransportKind::Log => {
            handler.emit(OutputEvent::info("✓ log (messages are not sent)"));
        }
    }

    if all_ok { 0 } else { 1 }
}

/// Configuration and workbook checks shared by `doctor`
pub fn check_workbook(
    config: &NotifierConfig,
    store: &dyn TabularStore,
    handler: &dyn OutputHandler,
) -> bool {
    let mut all_ok = true;
    let mut report = |ok: bool, message: String| {
        all_ok &= ok;
        let mark = if ok { "✓" } else { "✗" };
        handler.emit(OutputEvent::info(format!("{} {}", mark, message)));
    };

    handler.emit(OutputEvent::info("Checking configuration..."));
    match config.validate() {
        Ok(()) => report(true, "configuration is valid".into()),
        Err(errors) => {
            for e in errors {
                report(false, e);
            }
        }
    }

    handler.emit(OutputEvent::info("\nChecking workbook..."));
    let data_sheet = &config.workbook.data_sheet;
    match store
        .read_all(data_sheet)
        .map_err(|e| e.to_string())
        .and_then(|m| Dataset::from_matrix(m).map_err(|e| e.to_string()))
    {
        Ok(dataset) => {
            report(
                true,
                format!("sheet '{}' ({} rows)", data_sheet, dataset.len()),
            );
            if dataset.is_empty() {
                handler.emit(OutputEvent::info("  (no data rows yet)"));
            }
            let fields = &config.fields;
            let mut columns = vec![
                fields.action.as_str(),
                fields.requisitioner.as_str(),
                fields.email.as_str(),
            ];
            columns.extend(config.stages.values().filter_map(|s| s.log_column.as_deref()));
            for column in columns {
                report(
                    dataset.column_index(column).is_some(),
                    format!("column '{}'", column),
                );
            }
        }
        Err(e) => report(false, e),
    }

    let templates_sheet = &config.workbook.templates_sheet;
    match store.read_all(templates_sheet) {
        Ok(rows) => {
            let table = TemplateTable::from_rows(&rows);
            report(
                true,
                format!("sheet '{}' ({} templates)", templates_sheet, table.len()),
            );
            for (key, stage) in &config.stages {
                let name = stage.template_name(None);
                match table.resolve(name) {
                    Ok(_) => report(true, format!("stage '{}' template '{}'", key, name)),
                    Err(e) => report(false, format!("stage '{}': {}", key, e)),
                }
            }
        }
        Err(e) => report(false, e.to_string()),
    }

    all_ok
}
