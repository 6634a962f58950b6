//! Notification, prompt and submission-notice settings

use serde::{Deserialize, Serialize};

/// What to record when the operator declines to send
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DeclinePolicy {
    /// Write the same `<Action>: <timestamp>` entry as a sent row
    #[default]
    RecordAsSent,
    /// Write `Skipped: <timestamp>`
    RecordSkipped,
}

/// Whether a row whose log cell holds an error is picked up again
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Any non-empty log cell, error text included, marks the row done
    #[default]
    ErrorIsTerminal,
    /// Log cells starting with `Error:` count as not yet processed
    RetryErrors,
}

/// Per-row notification settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NotifyConfig {
    /// Subject line template (minijinja; `action`, `stage`, `row` available)
    #[serde(default = "default_subject")]
    pub subject: String,

    /// chrono format string for log-cell timestamps
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,

    #[serde(default)]
    pub on_decline: DeclinePolicy,

    #[serde(default)]
    pub on_error: ErrorPolicy,
}

fn default_subject() -> String {
    "Purchase Notification: {{ action }}".into()
}

fn default_timestamp_format() -> String {
    "%a %b %d %Y %H:%M:%S GMT%z".into()
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            subject: default_subject(),
            timestamp_format: default_timestamp_format(),
            on_decline: DeclinePolicy::default(),
            on_error: ErrorPolicy::default(),
        }
    }
}

/// Confirmation shown before every send
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PromptConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_message")]
    pub message: String,
}

fn default_title() -> String {
    "Hold Up!".into()
}

fn default_message() -> String {
    "Are you sure you want to send the email?".into()
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            message: default_message(),
        }
    }
}

/// Email sent to a fixed list whenever a new request is submitted
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SubmissionNoticeConfig {
    /// Distribution list
    #[serde(default)]
    pub to: Vec<String>,

    /// Subject template (minijinja)
    #[serde(default = "default_notice_subject")]
    pub subject: String,

    /// Plain text body template (minijinja; `workbook_url` available)
    #[serde(default = "default_notice_body")]
    pub body: String,
}

fn default_notice_subject() -> String {
    "NOTIFICATION: Req Submission".into()
}

fn default_notice_body() -> String {
    "Hello,\n\nPlease review the Req Log for submission:\n\n{{ workbook_url }}".into()
}

impl Default for SubmissionNoticeConfig {
    fn default() -> Self {
        Self {
            to: Vec::new(),
            subject: default_notice_subject(),
            body: default_notice_body(),
        }
    }
}
