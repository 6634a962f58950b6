//! Notice to the distribution list when a new request is submitted

use crate::config::SubmissionNoticeConfig;
use crate::mail::{MailError, MailMessage, MailTransport, parse_addresses};
use crate::template::{MessageContext, TemplateEngine, TemplateError};
use thiserror::Error;

/// Errors sending the submission notice
#[derive(Debug, Error)]
pub enum NoticeError {
    #[error("configuration error: submission_notice.to has no recipients")]
    NoRecipients,

    #[error("submission notice template: {0}")]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Send(#[from] MailError),
}

/// Build the notice message without sending it
pub fn build_notice(
    config: &SubmissionNoticeConfig,
    workbook_url: Option<&str>,
) -> Result<MailMessage, NoticeError> {
    let to: Vec<String> = config.to.iter().flat_map(|t| parse_addresses(t)).collect();
    if to.is_empty() {
        return Err(NoticeError::NoRecipients);
    }

    let engine = TemplateEngine::new();
    let ctx = MessageContext::new().with_workbook_url(workbook_url.map(String::from));
    let subject = engine.render(&config.subject, &ctx)?;
    let body = engine.render(&config.body, &ctx)?;

    Ok(MailMessage::text(to, subject, body))
}

/// Send the submission notice through `mailer`
pub async fn send_notice(
    config: &SubmissionNoticeConfig,
    workbook_url: Option<&str>,
    mailer: &dyn MailTransport,
) -> Result<MailMessage, NoticeError> {
    let message = build_notice(config, workbook_url)?;
    mailer.send(&message).await?;
    tracing::info!(
        recipients = message.to.len(),
        transport = mailer.name(),
        "Sent submission notice"
    );
    Ok(message)
}
