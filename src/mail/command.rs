//! Sendmail-style command transport

use super::types::{MailError, MailMessage, MailTransport};
use crate::config::MailConfig;
use async_trait::async_trait;
use base64::prelude::*;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Transport that pipes an RFC 5322 message into a command's stdin
///
/// The default is `sendmail -t -i`, which reads recipients from the headers.
#[derive(Debug, Clone)]
pub struct CommandTransport {
    command: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
    from: Option<String>,
    timeout: Duration,
}

impl CommandTransport {
    /// Create a command transport from config
    pub fn from_config(config: &MailConfig) -> Self {
        let mut transport = Self::new(config.command.clone(), config.args.clone())
            .with_timeout(Duration::from_secs(config.timeout));
        transport.env = config
            .env
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        transport.from = config.from.clone();
        transport
    }

    /// Create a command transport with explicit parameters
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            env: Vec::new(),
            from: None,
            timeout: Duration::from_secs(60),
        }
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the command with arguments
    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        cmd
    }
}

/// Bytes of UTF-8 per encoded word; keeps each word within 75 characters
const ENCODED_WORD_BYTES: usize = 45;

/// Header value as RFC 2047 encoded words unless it is plain printable ASCII
fn encode_header(value: &str) -> String {
    if value.bytes().all(|b| (b' '..=b'~').contains(&b)) {
        return value.to_string();
    }

    let mut words = Vec::new();
    let mut chunk = String::new();
    for c in value.chars() {
        if chunk.len() + c.len_utf8() > ENCODED_WORD_BYTES {
            words.push(encoded_word(&chunk));
            chunk.clear();
        }
        chunk.push(c);
    }
    if !chunk.is_empty() {
        words.push(encoded_word(&chunk));
    }
    words.join("\r\n ")
}

fn encoded_word(text: &str) -> String {
    format!("=?utf-8?B?{}?=", BASE64_STANDARD.encode(text))
}

/// Serialize a message with headers for sendmail
pub fn format_message(message: &MailMessage, from: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(from) = from {
        out.push_str(&format!("From: {}\r\n", from));
    }
    out.push_str(&format!("To: {}\r\n", message.to.join(", ")));
    if !message.cc.is_empty() {
        out.push_str(&format!("Cc: {}\r\n", message.cc.join(", ")));
    }
    out.push_str(&format!("Subject: {}\r\n", encode_header(&message.subject)));
    out.push_str("MIME-Version: 1.0\r\n");
    out.push_str(&format!("Content-Type: {}\r\n", message.body.content_type()));
    out.push_str("Content-Transfer-Encoding: 8bit\r\n");
    out.push_str("\r\n");
    out.push_str(message.body.content());
    if !out.ends_with('\n') {
        out.push_str("\r\n");
    }
    out
}

#[async_trait]
impl MailTransport for CommandTransport {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        message.validate()?;
        let start = Instant::now();
        let payload = format_message(message, self.from.as_deref());

        tracing::debug!(
            command = %self.command,
            args = ?self.args,
            bytes = payload.len(),
            "Spawning mail command"
        );

        let mut child = self.build_command().spawn().map_err(|e| MailError::Spawn {
            command: self.command.clone(),
            message: e.to_string(),
        })?;

        // Feed stdin while draining stdout and stderr, all under one deadline,
        // so a command that stops reading cannot wedge the write
        let stdin = child.stdin.take();
        let write = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(payload.as_bytes()).await?;
                // Dropping stdin closes the pipe so the command sees EOF
            }
            Ok::<_, std::io::Error>(())
        };
        let exchange = async { tokio::join!(write, child.wait_with_output()) };

        let (written, output) = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(pair) => pair,
            Err(_) => {
                return Err(MailError::Timeout {
                    elapsed: start.elapsed(),
                });
            }
        };
        let output = output.map_err(|e| MailError::Spawn {
            command: self.command.clone(),
            message: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(MailError::ExecutionFailed {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        written.map_err(|e| MailError::Spawn {
            command: self.command.clone(),
            message: format!("writing message: {}", e),
        })?;

        tracing::debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Mail command finished"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        &self.command
    }
}
