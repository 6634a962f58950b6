//! Per-row delivery: resolve, fetch, fill, confirm, send

use crate::clock::Clock;
use crate::config::{FieldsConfig, NotifierConfig, NotifyConfig, PromptConfig};
use crate::mail::{MailError, MailMessage, MailTransport, parse_addresses};
use crate::prompt::{ConfirmationPrompt, Decision, PromptError};
use crate::sheet::{Row, TabularStore};
use crate::template::{
    DocumentRenderer, MessageContext, RenderError, TemplateEngine, TemplateError,
    TemplateNotFound, TemplateResolver, substitute, unmatched_placeholders,
};
use std::fmt::Write;
use thiserror::Error;

/// Failure confined to one row; recorded in its log cell
#[derive(Debug, Error)]
pub enum RowError {
    #[error(transparent)]
    TemplateNotFound(#[from] TemplateNotFound),

    #[error(transparent)]
    Fetch(#[from] RenderError),

    #[error("subject template: {0}")]
    Subject(#[from] TemplateError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Send(#[from] MailError),
}

/// Sheet names and field mappings the runner works with
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub data_sheet: String,
    pub templates_sheet: String,
    pub fields: FieldsConfig,
    pub notify: NotifyConfig,
    pub prompt: PromptConfig,
}

impl RunSettings {
    pub fn from_config(config: &NotifierConfig) -> Self {
        Self {
            data_sheet: config.workbook.data_sheet.clone(),
            templates_sheet: config.workbook.templates_sheet.clone(),
            fields: config.fields.clone(),
            notify: config.notify.clone(),
            prompt: config.prompt.clone(),
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self::from_config(&NotifierConfig::default())
    }
}

/// Collaborators shared by every row of a run
pub struct ExecutionContext<'a> {
    pub store: &'a dyn TabularStore,
    pub renderer: &'a dyn DocumentRenderer,
    pub prompt: &'a dyn ConfirmationPrompt,
    pub mailer: &'a dyn MailTransport,
    pub clock: &'a dyn Clock,
    pub settings: RunSettings,
    pub template_engine: TemplateEngine,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(
        store: &'a dyn TabularStore,
        renderer: &'a dyn DocumentRenderer,
        prompt: &'a dyn ConfirmationPrompt,
        mailer: &'a dyn MailTransport,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            store,
            renderer,
            prompt,
            mailer,
            clock,
            settings: RunSettings::default(),
            template_engine: TemplateEngine::new(),
        }
    }

    pub fn with_settings(mut self, settings: RunSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Current time in the configured log-cell format
    ///
    /// A format string chrono cannot render falls back to RFC 3339.
    pub fn timestamp(&self) -> String {
        let now = self.clock.now();
        let mut stamp = String::new();
        if write!(stamp, "{}", now.format(&self.settings.notify.timestamp_format)).is_err() {
            tracing::warn!(
                format = %self.settings.notify.timestamp_format,
                "Invalid timestamp format, using RFC 3339"
            );
            return now.to_rfc3339();
        }
        stamp
    }
}

/// Deliver one row's notification
///
/// Returns the operator's decision; the message is only sent on `Yes`.
pub async fn execute_row(
    ctx: &ExecutionContext<'_>,
    row: &Row<'_>,
    stage: &str,
    template_name: &str,
    templates: &dyn TemplateResolver,
) -> Result<Decision, RowError> {
    let fields = &ctx.settings.fields;

    let reference = templates.resolve(template_name)?;
    tracing::debug!(row = row.sheet_row(), template = template_name, %reference, "Resolved template");

    let html = ctx.renderer.render_as_html(&reference).await?;
    let body = substitute(&html, row);

    let leftovers = unmatched_placeholders(&body);
    if !leftovers.is_empty() {
        tracing::warn!(
            row = row.sheet_row(),
            placeholders = ?leftovers,
            "Template has placeholders with no matching column"
        );
    }

    let message_ctx = MessageContext::for_row(row, &fields.action, stage);
    let subject = ctx
        .template_engine
        .render(&ctx.settings.notify.subject, &message_ctx)?;

    let to = parse_addresses(row.value(&fields.requisitioner));
    let cc = parse_addresses(row.value(&fields.email));
    tracing::info!(
        row = row.sheet_row(),
        to = %to.join(", "),
        cc = %cc.join(", "),
        subject = %subject,
        "Ready to send"
    );

    let decision = ctx
        .prompt
        .ask(&ctx.settings.prompt.title, &ctx.settings.prompt.message)
        .await?;

    if decision == Decision::Yes {
        let message = MailMessage::html(to, subject, body).with_cc(cc);
        ctx.mailer.send(&message).await?;
        tracing::debug!(row = row.sheet_row(), transport = ctx.mailer.name(), "Message sent");
    }

    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::mail::LogTransport;
    use crate::prompt::AutoConfirm;
    use crate::sheet::Dataset;
    use crate::sheet::memory::MemoryStore;
    use crate::template::TemplateTable;
    use async_trait::async_trait;

    struct StaticRenderer(&'static str);

    #[async_trait]
    impl DocumentRenderer for StaticRenderer {
        async fn render_as_html(&self, _reference: &str) -> Result<String, RenderError> {
            Ok(self.0.to_string())
        }
    }

    fn dataset() -> Dataset {
        Dataset::from_matrix(vec![
            vec![
                "Action".into(),
                "Requisitioner".into(),
                "Email Address".into(),
                "Item".into(),
            ],
            vec![
                "Assigned".into(),
                "amy@example.gov".into(),
                "ops@example.gov".into(),
                "Laptops".into(),
            ],
        ])
        .unwrap()
    }

    #[test]
    fn test_timestamp_format() {
        let store = MemoryStore::new();
        let renderer = StaticRenderer("");
        let prompt = AutoConfirm::yes();
        let mailer = LogTransport;
        let clock = FixedClock::parse("2026-10-16T09:30:00-04:00").unwrap();
        let ctx = ExecutionContext::new(&store, &renderer, &prompt, &mailer, &clock);

        assert_eq!(ctx.timestamp(), "Fri Oct 16 2026 09:30:00 GMT-0400");

        let mut settings = RunSettings::default();
        settings.notify.timestamp_format = "%Y-%m-%d".into();
        let ctx = ctx.with_settings(settings);
        assert_eq!(ctx.timestamp(), "2026-10-16");
    }

    #[tokio::test]
    async fn test_execute_row_declined_does_not_fail() {
        let store = MemoryStore::new();
        let renderer = StaticRenderer("<p>{{ITEM}}</p>");
        let prompt = AutoConfirm(Decision::No);
        let mailer = LogTransport;
        let clock = FixedClock::parse("2026-10-16T09:30:00-04:00").unwrap();
        let ctx = ExecutionContext::new(&store, &renderer, &prompt, &mailer, &clock);

        let mut table = TemplateTable::default();
        table.insert("Assigned", "doc-1");
        let ds = dataset();
        let row = ds.row(0).unwrap();

        let decision = execute_row(&ctx, &row, "assigned", "Assigned", &table)
            .await
            .unwrap();
        assert_eq!(decision, Decision::No);
    }

    #[tokio::test]
    async fn test_execute_row_missing_template() {
        let store = MemoryStore::new();
        let renderer = StaticRenderer("");
        let prompt = AutoConfirm::yes();
        let mailer = LogTransport;
        let clock = FixedClock::parse("2026-10-16T09:30:00-04:00").unwrap();
        let ctx = ExecutionContext::new(&store, &renderer, &prompt, &mailer, &clock);

        let ds = dataset();
        let row = ds.row(0).unwrap();
        let err = execute_row(&ctx, &row, "assigned", "Assigned", &TemplateTable::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RowError::TemplateNotFound(_)));
        assert_eq!(err.to_string(), "template 'Assigned' not found");
    }
}
