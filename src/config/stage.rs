//! Workflow stage definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One notification stage: which rows it matches and where it logs
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StageConfig {
    /// Value of the Action field that selects a row
    pub action: String,

    /// Column recording that the notification went out
    ///
    /// Without one the stage has no idempotence guard and every matching
    /// row is processed on every run.
    pub log_column: Option<String>,

    /// Template name to use instead of the action name
    pub template: Option<String>,

    /// Human-readable description
    #[serde(default)]
    pub description: String,
}

impl StageConfig {
    pub fn new(action: impl Into<String>, log_column: Option<&str>) -> Self {
        Self {
            action: action.into(),
            log_column: log_column.map(String::from),
            template: None,
            description: String::new(),
        }
    }

    /// Template name this stage looks up in the template table
    pub fn template_name<'a>(&'a self, explicit: Option<&'a str>) -> &'a str {
        explicit
            .or(self.template.as_deref())
            .unwrap_or(&self.action)
    }
}

/// The four stages of the procurement request log
pub fn builtin_stages() -> BTreeMap<String, StageConfig> {
    let mut stages = BTreeMap::new();

    let mut assigned = StageConfig::new("Assigned", Some("Log Assigned"));
    assigned.description = "Request assigned to a buyer".into();
    stages.insert("assigned".into(), assigned);

    let mut approved = StageConfig::new("Approved", Some("Log Approved"));
    approved.description = "Request approved".into();
    stages.insert("approved".into(), approved);

    let mut awarded = StageConfig::new("Awarded", Some("Log Awarded"));
    awarded.description = "Contract awarded".into();
    stages.insert("awarded".into(), awarded);

    let mut info = StageConfig::new("Info", None);
    info.description = "Informational email, sent on every run".into();
    stages.insert("info".into(), info);

    stages
}
