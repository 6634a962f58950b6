//! Workbook location and field names

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the request log lives
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WorkbookConfig {
    /// Workbook directory holding one CSV per sheet (`~` is expanded)
    #[serde(default = "default_dir")]
    pub dir: String,

    /// Sheet with one row per purchase request
    #[serde(default = "default_data_sheet")]
    pub data_sheet: String,

    /// Sheet of (template name, document reference) pairs
    #[serde(default = "default_templates_sheet")]
    pub templates_sheet: String,

    /// Link to the request log, offered to templates as `workbook_url`
    pub url: Option<String>,
}

fn default_dir() -> String {
    ".".into()
}

fn default_data_sheet() -> String {
    "Requests".into()
}

fn default_templates_sheet() -> String {
    "Templates".into()
}

impl Default for WorkbookConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            data_sheet: default_data_sheet(),
            templates_sheet: default_templates_sheet(),
            url: None,
        }
    }
}

impl WorkbookConfig {
    /// Workbook directory with `~` expanded
    pub fn resolved_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.dir).as_ref())
    }
}

/// Header names of the fields the workflow reads
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FieldsConfig {
    /// Column holding the current workflow stage
    #[serde(default = "default_action")]
    pub action: String,

    /// Column holding the primary recipient address
    #[serde(default = "default_requisitioner")]
    pub requisitioner: String,

    /// Column holding the carbon-copy address
    #[serde(default = "default_email")]
    pub email: String,
}

fn default_action() -> String {
    "Action".into()
}

fn default_requisitioner() -> String {
    "Requisitioner".into()
}

fn default_email() -> String {
    "Email Address".into()
}

impl Default for FieldsConfig {
    fn default() -> Self {
        Self {
            action: default_action(),
            requisitioner: default_requisitioner(),
            email: default_email(),
        }
    }
}

/// Fetching template documents
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DocumentsConfig {
    /// Timeout in seconds for one web fetch
    #[serde(default = "default_fetch_timeout")]
    pub timeout: u64,

    /// Environment variable holding the bearer token for web documents
    pub token_env: Option<String>,
}

fn default_fetch_timeout() -> u64 {
    60
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            timeout: default_fetch_timeout(),
            token_env: None,
        }
    }
}

impl DocumentsConfig {
    /// Read the bearer token from the configured environment variable
    pub fn token(&self) -> Option<String> {
        self.token_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|token| !token.is_empty())
    }
}
