//! JSON mail API transport

use super::types::{Body, MailError, MailMessage, MailTransport};
use crate::config::MailConfig;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Transport that POSTs messages to an HTTP mail API
///
/// Request body:
/// `{"from": ..., "to": [...], "cc": [...], "subject": ..., "html": ...}`
/// with `text` in place of `html` for plain text messages.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    url: String,
    api_key: Option<String>,
    from: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<&'a str>,
    to: &'a [String],
    #[serde(skip_serializing_if = "no_addresses")]
    cc: &'a [String],
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

fn no_addresses(addrs: &&[String]) -> bool {
    addrs.is_empty()
}

impl<'a> SendRequest<'a> {
    fn new(message: &'a MailMessage, from: Option<&'a str>) -> Self {
        let (html, text) = match &message.body {
            Body::Html(s) => (Some(s.as_str()), None),
            Body::Text(s) => (None, Some(s.as_str())),
        };
        Self {
            from,
            to: &message.to,
            cc: &message.cc,
            subject: &message.subject,
            html,
            text,
        }
    }
}

impl HttpTransport {
    /// Create an HTTP transport from config
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        let url = config
            .url
            .clone()
            .ok_or_else(|| MailError::config("http transport requires 'url'"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| MailError::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url,
            api_key: config.api_key(),
            from: config.from.clone(),
            client,
        })
    }

    /// Map HTTP status to MailError
    fn map_http_error(status: reqwest::StatusCode, body: &str) -> MailError {
        match status.as_u16() {
            401 | 403 => MailError::Auth {
                message: format!("HTTP {}: {}", status, body),
            },
            429 => MailError::RateLimit,
            code => MailError::Http {
                status: code,
                body: body.chars().take(200).collect(),
            },
        }
    }
}

#[async_trait]
impl MailTransport for HttpTransport {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        message.validate()?;

        let payload = SendRequest::new(message, self.from.as_deref());
        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        tracing::debug!(url = %self.url, to = ?message.to, "Posting message to mail API");

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                MailError::Timeout {
                    elapsed: Duration::ZERO,
                }
            } else {
                MailError::network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_http_error(status, &body));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "http"
    }
}
