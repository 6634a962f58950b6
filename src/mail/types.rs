//! Core types and traits for sending mail

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Error types that can occur while sending
#[derive(Debug, Clone, Error)]
pub enum MailError {
    /// Recipient list empty or malformed
    #[error("invalid recipient: {message}")]
    InvalidRecipient { message: String },

    /// Header value would break the message framing
    #[error("invalid header {header}: contains a line break")]
    InvalidHeader { header: String },

    /// Send took too long
    #[error("timeout after {elapsed:?}")]
    Timeout { elapsed: Duration },

    /// Mail command could not be started
    #[error("failed to run '{command}': {message}")]
    Spawn { command: String, message: String },

    /// Mail command exited with failure
    #[error("mail command failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    /// Mail API rejected our credentials
    #[error("authentication failed: {message}")]
    Auth { message: String },

    /// Mail API is throttling us
    #[error("rate limited by mail API")]
    RateLimit,

    /// Mail API returned an error status
    #[error("mail API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Network error
    #[error("network error: {message}")]
    Network { message: String },

    /// Transport misconfigured
    #[error("invalid mail configuration: {message}")]
    Config { message: String },
}

impl MailError {
    pub fn invalid_recipient(message: impl Into<String>) -> Self {
        Self::InvalidRecipient {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Message body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum Body {
    Html(String),
    Text(String),
}

impl Body {
    pub fn content(&self) -> &str {
        match self {
            Body::Html(s) | Body::Text(s) => s,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Body::Html(_) => "text/html; charset=utf-8",
            Body::Text(_) => "text/plain; charset=utf-8",
        }
    }
}

/// An outgoing email
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub body: Body,
}

impl MailMessage {
    /// Create a message with an HTML body
    pub fn html(to: Vec<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to,
            cc: Vec::new(),
            subject: subject.into(),
            body: Body::Html(body.into()),
        }
    }

    /// Create a message with a plain text body
    pub fn text(to: Vec<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to,
            cc: Vec::new(),
            subject: subject.into(),
            body: Body::Text(body.into()),
        }
    }

    /// Add carbon-copy recipients
    pub fn with_cc(mut self, cc: Vec<String>) -> Self {
        self.cc = cc;
        self
    }

    /// Check recipients and header values before handing off to a transport
    pub fn validate(&self) -> Result<(), MailError> {
        if self.to.is_empty() {
            return Err(MailError::invalid_recipient("no 'to' address"));
        }
        for addr in self.to.iter().chain(&self.cc) {
            if !addr.contains('@') {
                return Err(MailError::invalid_recipient(format!(
                    "'{}' is not an email address",
                    addr
                )));
            }
            if has_line_break(addr) {
                return Err(MailError::InvalidHeader {
                    header: "To/Cc".into(),
                });
            }
        }
        if has_line_break(&self.subject) {
            return Err(MailError::InvalidHeader {
                header: "Subject".into(),
            });
        }
        Ok(())
    }
}

fn has_line_break(s: &str) -> bool {
    s.contains('\r') || s.contains('\n')
}

/// Split a spreadsheet cell into addresses (comma or semicolon separated)
pub fn parse_addresses(cell: &str) -> Vec<String> {
    cell.split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Trait for mail transports
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send one message
    async fn send(&self, message: &MailMessage) -> Result<(), MailError>;

    /// Transport name for logs
    fn name(&self) -> &str;
}

/// Implement MailTransport for Box<dyn MailTransport>
#[async_trait]
impl MailTransport for Box<dyn MailTransport> {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        (**self).send(message).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
