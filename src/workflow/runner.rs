//! Workflow runner - processes every candidate row of one stage

use super::executor::{ExecutionContext, execute_row};
use super::outcome::{LogColumnUpdate, RowOutcome, RunReport};
use crate::config::{DeclinePolicy, ErrorPolicy, StageConfig};
use crate::prompt::Decision;
use crate::sheet::{Dataset, DatasetError, StoreError};
use crate::template::{TemplateResolver, TemplateTable, suggest_correction};
use thiserror::Error;

/// Errors that abort a run before any row is processed, or while saving it
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(
        "configuration error: column '{column}' not found in sheet '{sheet}'{}",
        .suggestion.as_ref().map(|s| format!(" (did you mean '{}'?)", s)).unwrap_or_default()
    )]
    MissingColumn {
        sheet: String,
        column: String,
        suggestion: Option<String>,
    },

    #[error("configuration error: sheet '{sheet}' has no header row")]
    EmptySheet { sheet: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WorkflowError {
    /// True for mistakes in the workbook layout or settings
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingColumn { .. } | Self::EmptySheet { .. })
    }
}

/// One stage run: which rows to match and where to log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// Stage key, for logs and the subject context
    pub stage: String,
    /// Action value selecting candidate rows
    pub action: String,
    /// Log column guarding against repeat sends; `None` processes every match
    pub log_column: Option<String>,
    /// Template name to resolve
    pub template: String,
}

impl RunRequest {
    pub fn new(stage: impl Into<String>, action: impl Into<String>) -> Self {
        let action = action.into();
        Self {
            stage: stage.into(),
            template: action.clone(),
            action,
            log_column: None,
        }
    }

    /// Build from a configured stage, with an optional template override
    pub fn from_stage(key: &str, stage: &StageConfig, template: Option<&str>) -> Self {
        let request = Self::new(key, stage.action.clone())
            .with_template(stage.template_name(template));
        match stage.log_column {
            Some(ref column) => request.with_log_column(column.clone()),
            None => request,
        }
    }

    pub fn with_log_column(mut self, column: impl Into<String>) -> Self {
        self.log_column = Some(column.into());
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }
}

/// Runs notification stages against the workbook
pub struct WorkflowRunner<'a> {
    ctx: ExecutionContext<'a>,
}

impl<'a> WorkflowRunner<'a> {
    pub fn new(ctx: ExecutionContext<'a>) -> Self {
        Self { ctx }
    }

    /// Load the template table from the templates sheet
    pub fn load_templates(&self) -> Result<TemplateTable, WorkflowError> {
        let rows = self.ctx.store.read_all(&self.ctx.settings.templates_sheet)?;
        let table = TemplateTable::from_rows(&rows);
        tracing::debug!(
            sheet = %self.ctx.settings.templates_sheet,
            templates = table.len(),
            "Loaded template table"
        );
        Ok(table)
    }

    /// Load the data sheet
    pub fn load_dataset(&self) -> Result<Dataset, WorkflowError> {
        let sheet = &self.ctx.settings.data_sheet;
        let matrix = self.ctx.store.read_all(sheet)?;
        Dataset::from_matrix(matrix).map_err(|e| match e {
            DatasetError::MissingHeader => WorkflowError::EmptySheet {
                sheet: sheet.clone(),
            },
        })
    }

    /// Run a stage with the template table from the workbook
    pub async fn run(&self, request: &RunRequest) -> Result<RunReport, WorkflowError> {
        let templates = self.load_templates()?;
        self.run_with(request, &templates).await
    }

    /// Run a stage resolving templates through `templates`
    ///
    /// Nothing is written; pass the report to [`Self::persist`] to save the
    /// updated log column.
    pub async fn run_with(
        &self,
        request: &RunRequest,
        templates: &dyn TemplateResolver,
    ) -> Result<RunReport, WorkflowError> {
        let dataset = self.load_dataset()?;
        let fields = &self.ctx.settings.fields;

        let action_col = self.require_column(&dataset, &fields.action)?;
        self.require_column(&dataset, &fields.requisitioner)?;
        if dataset.column_index(&fields.email).is_none() {
            tracing::warn!(
                column = %fields.email,
                "Email column not found, messages go out without cc"
            );
        }

        let mut log_column = match request.log_column {
            Some(ref name) => {
                let index = self.require_column(&dataset, name)?;
                Some(LogColumnUpdate {
                    name: name.clone(),
                    index,
                    values: dataset.column(index),
                })
            }
            None => None,
        };

        let candidates: Vec<_> = dataset
            .rows()
            .filter(|row| row.cell(action_col) == request.action)
            .filter(|row| {
                log_column
                    .as_ref()
                    .is_none_or(|log| self.is_unprocessed(&log.values[row.index()]))
            })
            .collect();

        tracing::info!(
            stage = %request.stage,
            action = %request.action,
            rows = dataset.len(),
            candidates = candidates.len(),
            "Starting stage"
        );

        let mut outcomes = Vec::with_capacity(candidates.len());
        for row in &candidates {
            let outcome = match execute_row(
                &self.ctx,
                row,
                &request.stage,
                &request.template,
                templates,
            )
            .await
            {
                Ok(Decision::Yes) => RowOutcome::sent(row, self.entry(&request.action)),
                Ok(Decision::No) => RowOutcome::skipped(row, self.decline_entry(&request.action)),
                Err(e) => {
                    tracing::warn!(row = row.sheet_row(), error = %e, "Row failed");
                    RowOutcome::error(row, e.to_string())
                }
            };

            tracing::info!(row = outcome.sheet_row, entry = %outcome.entry, "Row processed");

            if let Some(ref mut log) = log_column {
                log.values[row.index()] = outcome.entry.clone();
            }
            outcomes.push(outcome);
        }

        Ok(RunReport {
            stage: request.stage.clone(),
            action: request.action.clone(),
            total_rows: dataset.len(),
            log_column,
            outcomes,
        })
    }

    /// Write the report's log column back in a single call
    ///
    /// Returns whether anything was written; a run with no processed rows
    /// or no log column leaves the sheet alone.
    pub fn persist(&self, report: &RunReport) -> Result<bool, WorkflowError> {
        let Some(ref log) = report.log_column else {
            return Ok(false);
        };
        if report.outcomes.is_empty() {
            return Ok(false);
        }

        self.ctx
            .store
            .write_column(&self.ctx.settings.data_sheet, log.index, 1, &log.values)?;

        tracing::info!(
            sheet = %self.ctx.settings.data_sheet,
            column = %log.name,
            updated = report.outcomes.len(),
            "Saved log column"
        );
        Ok(true)
    }

    /// Run then persist
    #[cfg(test)]
    pub async fn run_and_persist(&self, request: &RunRequest) -> Result<RunReport, WorkflowError> {
        let report = self.run(request).await?;
        self.persist(&report)?;
        Ok(report)
    }

    fn require_column(&self, dataset: &Dataset, name: &str) -> Result<usize, WorkflowError> {
        dataset
            .column_index(name)
            .ok_or_else(|| WorkflowError::MissingColumn {
                sheet: self.ctx.settings.data_sheet.clone(),
                column: name.to_string(),
                suggestion: suggest_correction(
                    name,
                    &dataset.headers().iter().map(String::as_str).collect::<Vec<_>>(),
                ),
            })
    }

    fn is_unprocessed(&self, cell: &str) -> bool {
        let cell = cell.trim();
        cell.is_empty()
            || (self.ctx.settings.notify.on_error == ErrorPolicy::RetryErrors
                && cell.starts_with("Error:"))
    }

    fn entry(&self, action: &str) -> String {
        format!("{}: {}", action, self.ctx.timestamp())
    }

    fn decline_entry(&self, action: &str) -> String {
        match self.ctx.settings.notify.on_decline {
            DeclinePolicy::RecordAsSent => self.entry(action),
            DeclinePolicy::RecordSkipped => self.entry("Skipped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::mail::{MailError, MailMessage, MailTransport};
    use crate::prompt::{ConfirmationPrompt, PromptError};
    use crate::sheet::memory::MemoryStore;
    use crate::template::{DocumentRenderer, RenderError};
    use crate::workflow::{ExecutionContext, OutcomeKind, RunSettings};
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::path::PathBuf;
    use std::sync::Mutex;

    const NOW: &str = "2026-10-16T09:30:00-04:00";
    const STAMP: &str = "Fri Oct 16 2026 09:30:00 GMT-0400";

    /// Renders references from a fixed map; unknown references fail
    struct MapRenderer(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl DocumentRenderer for MapRenderer {
        async fn render_as_html(&self, reference: &str) -> Result<String, RenderError> {
            self.0
                .get(reference)
                .map(|s| s.to_string())
                .ok_or_else(|| RenderError::NotFound {
                    path: PathBuf::from(reference),
                })
        }
    }

    /// Answers from a script, defaulting to yes, and counts questions
    #[derive(Default)]
    struct ScriptedPrompt {
        answers: Mutex<VecDeque<Decision>>,
        asked: Mutex<usize>,
    }

    impl ScriptedPrompt {
        fn answering(answers: &[Decision]) -> Self {
            Self {
                answers: Mutex::new(answers.iter().copied().collect()),
                asked: Mutex::new(0),
            }
        }

        fn asked(&self) -> usize {
            *self.asked.lock().unwrap()
        }
    }

    #[async_trait]
    impl ConfirmationPrompt for ScriptedPrompt {
        async fn ask(&self, _title: &str, _message: &str) -> Result<Decision, PromptError> {
            *self.asked.lock().unwrap() += 1;
            Ok(self.answers.lock().unwrap().pop_front().unwrap_or(Decision::Yes))
        }
    }

    /// Records sent messages; fails for one recipient
    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<MailMessage>>,
        reject: Option<&'static str>,
    }

    impl RecordingMailer {
        fn sent(&self) -> Vec<MailMessage> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MailTransport for RecordingMailer {
        async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
            if self.reject.is_some_and(|r| message.to.iter().any(|t| t == r)) {
                return Err(MailError::network("connection refused"));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn renderer() -> MapRenderer {
        MapRenderer(HashMap::from([
            ("doc-assigned", "<p>Hi {{REQUISITIONER}}, {{ITEM}} is assigned</p>"),
            ("doc-assigned-v2", "<p>v2 {{ITEM}}</p>"),
            ("doc-info", "<p>FYI {{ITEM}}</p>"),
        ]))
    }

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert(
            "Requests",
            vec![
                vec!["Action", "Requisitioner", "Email Address", "Item", "Log Assigned"],
                vec!["Assigned", "amy@example.gov", "ops@example.gov", "Laptops", ""],
                vec!["Approved", "bob@example.gov", "", "Chairs", ""],
                vec!["Assigned", "cal@example.gov", "", "Desks", "Assigned: earlier"],
                vec!["Assigned", "dee@example.gov", "", "Lamps", "  "],
            ],
        );
        store.insert(
            "Templates",
            vec![
                vec!["Assigned", "doc-assigned"],
                vec!["Info", "doc-info"],
            ],
        );
        store
    }

    fn log_column(store: &MemoryStore) -> Vec<String> {
        store
            .sheet("Requests")
            .iter()
            .skip(1)
            .map(|r| r.get(4).cloned().unwrap_or_default())
            .collect()
    }

    fn assigned() -> RunRequest {
        RunRequest::new("assigned", "Assigned").with_log_column("Log Assigned")
    }

    #[tokio::test]
    async fn test_processes_only_unlogged_matching_rows() {
        let store = store();
        let renderer = renderer();
        let prompt = ScriptedPrompt::default();
        let mailer = RecordingMailer::default();
        let clock = FixedClock::parse(NOW).unwrap();
        let runner = WorkflowRunner::new(ExecutionContext::new(
            &store, &renderer, &prompt, &mailer, &clock,
        ));

        let report = runner.run_and_persist(&assigned()).await.unwrap();

        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.outcomes[0].row_index, 0);
        assert_eq!(report.outcomes[0].sheet_row, 2);
        assert_eq!(report.outcomes[1].row_index, 3);
        assert_eq!(report.sent(), 2);

        let expected = format!("Assigned: {}", STAMP);
        assert_eq!(
            log_column(&store),
            vec![expected.clone(), "".into(), "Assigned: earlier".into(), expected]
        );
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_message_fields() {
        let store = store();
        let renderer = renderer();
        let prompt = ScriptedPrompt::default();
        let mailer = RecordingMailer::default();
        let clock = FixedClock::parse(NOW).unwrap();
        let runner = WorkflowRunner::new(ExecutionContext::new(
            &store, &renderer, &prompt, &mailer, &clock,
        ));

        runner.run(&assigned()).await.unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, vec!["amy@example.gov"]);
        assert_eq!(sent[0].cc, vec!["ops@example.gov"]);
        assert_eq!(sent[0].subject, "Purchase Notification: Assigned");
        assert_eq!(
            sent[0].body.content(),
            "<p>Hi amy@example.gov, Laptops is assigned</p>"
        );
        assert!(sent[1].cc.is_empty());
    }

    #[tokio::test]
    async fn test_second_run_processes_nothing() {
        let store = store();
        let renderer = renderer();
        let prompt = ScriptedPrompt::default();
        let mailer = RecordingMailer::default();
        let clock = FixedClock::parse(NOW).unwrap();
        let runner = WorkflowRunner::new(ExecutionContext::new(
            &store, &renderer, &prompt, &mailer, &clock,
        ));

        runner.run_and_persist(&assigned()).await.unwrap();
        let second = runner.run_and_persist(&assigned()).await.unwrap();

        assert!(second.outcomes.is_empty());
        assert_eq!(prompt.asked(), 2);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_run_does_not_write() {
        let store = store();
        let renderer = renderer();
        let prompt = ScriptedPrompt::default();
        let mailer = RecordingMailer::default();
        let clock = FixedClock::parse(NOW).unwrap();
        let runner = WorkflowRunner::new(ExecutionContext::new(
            &store, &renderer, &prompt, &mailer, &clock,
        ));

        let report = runner.run(&assigned()).await.unwrap();
        assert_eq!(store.write_count(), 0);

        let log = report.log_column.unwrap();
        assert_eq!(log.index, 4);
        assert_eq!(log.values[1], "");
        assert_eq!(log.values[2], "Assigned: earlier");
    }

    #[tokio::test]
    async fn test_missing_template_does_not_stop_later_rows() {
        let store = store();
        store.insert("Templates", vec![vec!["Info", "doc-info"]]);
        let renderer = renderer();
        let prompt = ScriptedPrompt::default();
        let mailer = RecordingMailer::default();
        let clock = FixedClock::parse(NOW).unwrap();
        let runner = WorkflowRunner::new(ExecutionContext::new(
            &store, &renderer, &prompt, &mailer, &clock,
        ));

        let report = runner.run_and_persist(&assigned()).await.unwrap();

        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.failed(), 2);
        assert_eq!(
            report.outcomes[1].entry,
            "Error: template 'Assigned' not found"
        );
        assert_eq!(prompt.asked(), 0);
        assert_eq!(log_column(&store)[3], "Error: template 'Assigned' not found");
    }

    #[tokio::test]
    async fn test_send_failure_is_isolated() {
        let store = store();
        let renderer = renderer();
        let prompt = ScriptedPrompt::default();
        let mailer = RecordingMailer {
            reject: Some("amy@example.gov"),
            ..Default::default()
        };
        let clock = FixedClock::parse(NOW).unwrap();
        let runner = WorkflowRunner::new(ExecutionContext::new(
            &store, &renderer, &prompt, &mailer, &clock,
        ));

        let report = runner.run_and_persist(&assigned()).await.unwrap();

        assert!(report.outcomes[0].is_error());
        assert!(report.outcomes[0].entry.starts_with("Error: "));
        assert!(report.outcomes[0].entry.contains("connection refused"));
        assert_eq!(report.outcomes[1].kind, OutcomeKind::Sent);
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_errors_are_terminal_by_default() {
        let store = store();
        store.insert("Templates", vec![]);
        let renderer = renderer();
        let prompt = ScriptedPrompt::default();
        let mailer = RecordingMailer::default();
        let clock = FixedClock::parse(NOW).unwrap();
        let runner = WorkflowRunner::new(ExecutionContext::new(
            &store, &renderer, &prompt, &mailer, &clock,
        ));

        runner.run_and_persist(&assigned()).await.unwrap();
        store.insert("Templates", vec![vec!["Assigned", "doc-assigned"]]);

        let second = runner.run_and_persist(&assigned()).await.unwrap();
        assert!(second.outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_retry_errors_policy() {
        let store = store();
        store.insert("Templates", vec![]);
        let renderer = renderer();
        let prompt = ScriptedPrompt::default();
        let mailer = RecordingMailer::default();
        let clock = FixedClock::parse(NOW).unwrap();
        let mut settings = RunSettings::default();
        settings.notify.on_error = ErrorPolicy::RetryErrors;
        let runner = WorkflowRunner::new(
            ExecutionContext::new(&store, &renderer, &prompt, &mailer, &clock)
                .with_settings(settings),
        );

        runner.run_and_persist(&assigned()).await.unwrap();
        store.insert("Templates", vec![vec!["Assigned", "doc-assigned"]]);

        let second = runner.run_and_persist(&assigned()).await.unwrap();
        assert_eq!(second.sent(), 2);
        assert_eq!(log_column(&store)[2], "Assigned: earlier");
    }

    #[tokio::test]
    async fn test_decline_recorded_as_sent_by_default() {
        let store = store();
        let renderer = renderer();
        let prompt = ScriptedPrompt::answering(&[Decision::No, Decision::Yes]);
        let mailer = RecordingMailer::default();
        let clock = FixedClock::parse(NOW).unwrap();
        let runner = WorkflowRunner::new(ExecutionContext::new(
            &store, &renderer, &prompt, &mailer, &clock,
        ));

        let report = runner.run_and_persist(&assigned()).await.unwrap();

        assert_eq!(report.outcomes[0].kind, OutcomeKind::Skipped);
        assert_eq!(report.outcomes[0].entry, format!("Assigned: {}", STAMP));
        assert_eq!(mailer.sent().len(), 1);
        assert_eq!(mailer.sent()[0].to, vec!["dee@example.gov"]);
    }

    #[tokio::test]
    async fn test_decline_recorded_as_skipped() {
        let store = store();
        let renderer = renderer();
        let prompt = ScriptedPrompt::answering(&[Decision::No]);
        let mailer = RecordingMailer::default();
        let clock = FixedClock::parse(NOW).unwrap();
        let mut settings = RunSettings::default();
        settings.notify.on_decline = DeclinePolicy::RecordSkipped;
        let runner = WorkflowRunner::new(
            ExecutionContext::new(&store, &renderer, &prompt, &mailer, &clock)
                .with_settings(settings),
        );

        runner.run_and_persist(&assigned()).await.unwrap();
        assert_eq!(log_column(&store)[0], format!("Skipped: {}", STAMP));
    }

    #[tokio::test]
    async fn test_last_duplicate_template_wins() {
        let store = store();
        store.insert(
            "Templates",
            vec![
                vec!["Assigned", "doc-assigned"],
                vec!["Assigned", "doc-assigned-v2"],
            ],
        );
        let renderer = renderer();
        let prompt = ScriptedPrompt::default();
        let mailer = RecordingMailer::default();
        let clock = FixedClock::parse(NOW).unwrap();
        let runner = WorkflowRunner::new(ExecutionContext::new(
            &store, &renderer, &prompt, &mailer, &clock,
        ));

        runner.run(&assigned()).await.unwrap();
        assert_eq!(mailer.sent()[0].body.content(), "<p>v2 Laptops</p>");
    }

    #[tokio::test]
    async fn test_template_override() {
        let store = store();
        store.insert(
            "Templates",
            vec![vec!["Assigned", "doc-assigned"], vec!["Assigned v2", "doc-assigned-v2"]],
        );
        let renderer = renderer();
        let prompt = ScriptedPrompt::default();
        let mailer = RecordingMailer::default();
        let clock = FixedClock::parse(NOW).unwrap();
        let runner = WorkflowRunner::new(ExecutionContext::new(
            &store, &renderer, &prompt, &mailer, &clock,
        ));

        runner
            .run(&assigned().with_template("Assigned v2"))
            .await
            .unwrap();
        assert_eq!(mailer.sent()[0].body.content(), "<p>v2 Laptops</p>");
    }

    #[tokio::test]
    async fn test_stage_without_log_column_runs_every_match() {
        let store = store();
        store.insert(
            "Requests",
            vec![
                vec!["Action", "Requisitioner", "Email Address", "Item"],
                vec!["Info", "amy@example.gov", "", "Laptops"],
                vec!["Assigned", "bob@example.gov", "", "Chairs"],
                vec!["Info", "cal@example.gov", "", "Desks"],
            ],
        );
        let renderer = renderer();
        let prompt = ScriptedPrompt::default();
        let mailer = RecordingMailer::default();
        let clock = FixedClock::parse(NOW).unwrap();
        let runner = WorkflowRunner::new(ExecutionContext::new(
            &store, &renderer, &prompt, &mailer, &clock,
        ));
        let request = RunRequest::new("info", "Info");

        let first = runner.run_and_persist(&request).await.unwrap();
        let second = runner.run_and_persist(&request).await.unwrap();

        assert_eq!(first.outcomes.len(), 2);
        assert_eq!(second.outcomes.len(), 2);
        assert!(first.log_column.is_none());
        assert_eq!(store.write_count(), 0);
        assert_eq!(mailer.sent().len(), 4);
    }

    #[tokio::test]
    async fn test_missing_log_column_fails_before_prompting() {
        let store = store();
        let renderer = renderer();
        let prompt = ScriptedPrompt::default();
        let mailer = RecordingMailer::default();
        let clock = FixedClock::parse(NOW).unwrap();
        let runner = WorkflowRunner::new(ExecutionContext::new(
            &store, &renderer, &prompt, &mailer, &clock,
        ));
        let request = RunRequest::new("approved", "Approved").with_log_column("Log Approvd");

        let err = runner.run_and_persist(&request).await.unwrap_err();

        assert!(err.is_configuration());
        assert!(err.to_string().contains("'Log Approvd' not found"));
        assert_eq!(prompt.asked(), 0);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_column_suggests_header() {
        let store = store();
        let renderer = renderer();
        let prompt = ScriptedPrompt::default();
        let mailer = RecordingMailer::default();
        let clock = FixedClock::parse(NOW).unwrap();
        let runner = WorkflowRunner::new(ExecutionContext::new(
            &store, &renderer, &prompt, &mailer, &clock,
        ));

        let err = runner
            .run(&RunRequest::new("assigned", "Assigned").with_log_column("Log Asigned"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("did you mean 'Log Assigned'?"));
    }

    #[tokio::test]
    async fn test_empty_data_sheet() {
        let store = store();
        store.insert("Requests", vec![]);
        let renderer = renderer();
        let prompt = ScriptedPrompt::default();
        let mailer = RecordingMailer::default();
        let clock = FixedClock::parse(NOW).unwrap();
        let runner = WorkflowRunner::new(ExecutionContext::new(
            &store, &renderer, &prompt, &mailer, &clock,
        ));

        let err = runner.run(&assigned()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::EmptySheet { .. }));
    }

    #[tokio::test]
    async fn test_missing_sheet_is_store_error() {
        let store = MemoryStore::new();
        let renderer = renderer();
        let prompt = ScriptedPrompt::default();
        let mailer = RecordingMailer::default();
        let clock = FixedClock::parse(NOW).unwrap();
        let runner = WorkflowRunner::new(ExecutionContext::new(
            &store, &renderer, &prompt, &mailer, &clock,
        ));

        let err = runner.run(&assigned()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Store(_)));
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_request_from_stage() {
        let mut stage = StageConfig::new("Awarded", Some("Log Awarded"));
        stage.template = Some("Award Letter".into());

        let request = RunRequest::from_stage("awarded", &stage, None);
        assert_eq!(request.action, "Awarded");
        assert_eq!(request.log_column.as_deref(), Some("Log Awarded"));
        assert_eq!(request.template, "Award Letter");

        let request = RunRequest::from_stage("awarded", &stage, Some("Other"));
        assert_eq!(request.template, "Other");
    }
}
