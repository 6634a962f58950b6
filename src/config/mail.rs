//! Mail transport configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How outgoing mail leaves the machine
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Pipe the message to a sendmail-compatible command
    #[default]
    Command,
    /// POST the message to a JSON mail API
    Http,
    /// Log the message and send nothing
    Log,
}

/// Configuration for the mail transport
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MailConfig {
    /// Transport to use
    #[serde(default)]
    pub transport: TransportKind,

    /// Command to run (command transport)
    #[serde(default = "default_command")]
    pub command: String,

    /// Arguments to pass to the command
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Additional environment variables for the command
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Endpoint URL (http transport)
    pub url: Option<String>,

    /// Environment variable holding the API key (http transport)
    pub api_key_env: Option<String>,

    /// Sender address
    pub from: Option<String>,

    /// Timeout in seconds for one send
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_command() -> String {
    "sendmail".into()
}

fn default_args() -> Vec<String> {
    vec!["-t".into(), "-i".into()]
}

fn default_timeout() -> u64 {
    60
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::default(),
            command: default_command(),
            args: default_args(),
            env: HashMap::new(),
            url: None,
            api_key_env: None,
            from: None,
            timeout: default_timeout(),
        }
    }
}

impl MailConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        self.api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.is_empty())
    }
}
