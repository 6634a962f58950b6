//! Variables available to configured message templates

use crate::sheet::Row;
use minijinja::value::Value;
use std::collections::BTreeMap;

/// Context for rendering subject lines and the submission notice
///
/// Available variables:
/// - `action`: the row's Action field value
/// - `stage`: the stage key being run (`assigned`, `info`, ...)
/// - `row`: every field of the row, keyed by header name
/// - `workbook_url`: link to the request log, when configured
#[derive(Debug, Clone, Default)]
pub struct MessageContext {
    pub action: Option<String>,
    pub stage: Option<String>,
    pub row: BTreeMap<String, String>,
    pub workbook_url: Option<String>,
}

impl MessageContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context for one data row
    pub fn for_row(row: &Row<'_>, action_field: &str, stage: &str) -> Self {
        let fields = row
            .fields()
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();

        Self {
            action: Some(row.value(action_field).to_string()),
            stage: Some(stage.to_string()),
            row: fields,
            workbook_url: None,
        }
    }

    /// Attach the workbook link
    pub fn with_workbook_url(mut self, url: Option<String>) -> Self {
        self.workbook_url = url;
        self
    }

    /// Convert to a minijinja Value for rendering
    pub fn to_value(&self) -> Value {
        let mut root: BTreeMap<&str, Value> = BTreeMap::new();

        if let Some(ref action) = self.action {
            root.insert("action", Value::from(action.as_str()));
        }
        if let Some(ref stage) = self.stage {
            root.insert("stage", Value::from(stage.as_str()));
        }
        if let Some(ref url) = self.workbook_url {
            root.insert("workbook_url", Value::from(url.as_str()));
        }
        root.insert("row", Value::from_serialize(&self.row));

        Value::from_serialize(&root)
    }

    /// Top-level variable names, used for typo suggestions
    pub fn known_variables(&self) -> Vec<&str> {
        let mut vars = vec!["row"];
        if self.action.is_some() {
            vars.push("action");
        }
        if self.stage.is_some() {
            vars.push("stage");
        }
        if self.workbook_url.is_some() {
            vars.push("workbook_url");
        }
        vars
    }
}
