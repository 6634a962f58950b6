//! Transport that only logs

use super::types::{MailError, MailMessage, MailTransport};
use async_trait::async_trait;

/// Transport for dry runs: validates and logs each message, sends nothing
#[derive(Debug, Clone, Default)]
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        message.validate()?;
        tracing::info!(
            to = %message.to.join(", "),
            cc = %message.cc.join(", "),
            subject = %message.subject,
            bytes = message.body.content().len(),
            "Dry run: message not sent"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
