//! Configuration loading with multi-layer merge

use super::stage::builtin_stages;
use super::{
    DocumentsConfig, FieldsConfig, MailConfig, NotifyConfig, PromptConfig, StageConfig,
    SubmissionNoticeConfig, TransportKind, WorkbookConfig,
};
use crate::template::TemplateEngine;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Top-level req-notifier configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotifierConfig {
    #[serde(default)]
    pub workbook: WorkbookConfig,

    #[serde(default)]
    pub fields: FieldsConfig,

    #[serde(default)]
    pub notify: NotifyConfig,

    #[serde(default)]
    pub prompt: PromptConfig,

    #[serde(default)]
    pub mail: MailConfig,

    #[serde(default)]
    pub documents: DocumentsConfig,

    /// Stage definitions, keyed by the name used on the command line
    #[serde(default = "builtin_stages")]
    pub stages: BTreeMap<String, StageConfig>,

    #[serde(default)]
    pub submission_notice: SubmissionNoticeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Log file settings
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Append logs to this file in addition to stderr (`~` is expanded)
    pub file: Option<String>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            workbook: WorkbookConfig::default(),
            fields: FieldsConfig::default(),
            notify: NotifyConfig::default(),
            prompt: PromptConfig::default(),
            mail: MailConfig::default(),
            documents: DocumentsConfig::default(),
            stages: builtin_stages(),
            submission_notice: SubmissionNoticeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Fold `layer` into `base`: nested tables merge key by key, anything else replaces
fn merge_tables(base: &mut toml::Table, layer: toml::Table) {
    for (key, value) in layer {
        if let toml::Value::Table(incoming) = value {
            if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, incoming);
                continue;
            }
            base.insert(key, toml::Value::Table(incoming));
        } else {
            base.insert(key, value);
        }
    }
}

impl NotifierConfig {
    /// Load configuration from the standard hierarchy
    ///
    /// Load order (later overrides earlier):
    /// 1. Built-in defaults
    /// 2. ~/.config/req-notifier/config.toml
    /// 3. .req-notifier/config.toml (project)
    /// 4. An explicit `--config` file
    ///
    /// Layers are merged as TOML tables before deserializing, so a layer
    /// only overrides the keys it actually contains.
    pub fn load(project_dir: Option<&Path>, explicit: Option<&Path>) -> Result<Self> {
        let mut layers = Vec::new();

        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                layers.push(Self::read_layer(&user_config_path)?);
            }
        }

        let project_config_path = project_dir
            .map(|p| p.join(".req-notifier/config.toml"))
            .unwrap_or_else(|| PathBuf::from(".req-notifier/config.toml"));

        if project_config_path.exists() {
            layers.push(Self::read_layer(&project_config_path)?);
        }

        if let Some(path) = explicit {
            layers.push(Self::read_layer(path)?);
        }

        Self::from_layers(layers)
    }

    /// Load configuration from a specific file over the built-in defaults
    pub fn load_file(path: &Path) -> Result<Self> {
        Self::from_layers([Self::read_layer(path)?])
    }

    fn read_layer(path: &Path) -> Result<toml::Table> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    /// Build a configuration from layers, later layers winning key by key
    pub fn from_layers(layers: impl IntoIterator<Item = toml::Table>) -> Result<Self> {
        let mut merged = toml::Table::new();
        merged.insert(
            "stages".into(),
            toml::Value::try_from(builtin_stages()).context("encoding built-in stages")?,
        );
        for layer in layers {
            merge_tables(&mut merged, layer);
        }

        toml::Value::Table(merged)
            .try_into()
            .context("invalid configuration")
    }

    /// Get the user config path (~/.config/req-notifier/config.toml)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("req-notifier/config.toml"))
    }

    /// Look up a stage by key, or by action name (case-insensitive)
    pub fn get_stage(&self, name: &str) -> Option<(&str, &StageConfig)> {
        let lower = name.to_lowercase();
        self.stages
            .get_key_value(&lower)
            .or_else(|| {
                self.stages
                    .iter()
                    .find(|(_, stage)| stage.action.eq_ignore_ascii_case(name))
            })
            .map(|(key, stage)| (key.as_str(), stage))
    }

    /// Log file path with `~` expanded
    pub fn log_file(&self) -> Option<PathBuf> {
        self.logging
            .file
            .as_deref()
            .map(|f| PathBuf::from(shellexpand::tilde(f).as_ref()))
    }

    /// Check the configuration for mistakes that would only surface mid-run
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let engine = TemplateEngine::new();

        if let Err(e) = engine.validate(&self.notify.subject) {
            errors.push(format!("notify.subject: {}", e));
        }
        if self.notify.timestamp_format.trim().is_empty() {
            errors.push("notify.timestamp_format must not be empty".into());
        }
        if let Err(e) = engine.validate(&self.submission_notice.subject) {
            errors.push(format!("submission_notice.subject: {}", e));
        }
        if let Err(e) = engine.validate(&self.submission_notice.body) {
            errors.push(format!("submission_notice.body: {}", e));
        }

        for (key, stage) in &self.stages {
            if stage.action.trim().is_empty() {
                errors.push(format!("stages.{}: action must not be empty", key));
            }
            if let Some(ref column) = stage.log_column {
                if column == &self.fields.action {
                    errors.push(format!(
                        "stages.{}: log_column must not be the action column '{}'",
                        key, column
                    ));
                }
            }
        }

        if self.mail.transport == TransportKind::Http && self.mail.url.is_none() {
            errors.push("mail.url is required for the http transport".into());
        }
        if self.mail.transport == TransportKind::Command && self.mail.command.trim().is_empty() {
            errors.push("mail.command must not be empty".into());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
