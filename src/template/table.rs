//! Template name → document reference lookup

use std::collections::HashMap;
use thiserror::Error;

/// Template name missing from the template table
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("template '{name}' not found")]
pub struct TemplateNotFound {
    pub name: String,
}

/// Resolves a template name to a renderable document reference
pub trait TemplateResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Result<String, TemplateNotFound>;
}

/// Template table built from the templates sheet
///
/// Each sheet row is a `(name, reference)` pair. Every row counts, there is
/// no header row, and a later row with the same name replaces an earlier
/// one.
#[derive(Debug, Clone, Default)]
pub struct TemplateTable {
    entries: HashMap<String, String>,
    order: Vec<String>,
}

impl TemplateTable {
    /// Build from raw sheet rows
    pub fn from_rows(rows: &[Vec<String>]) -> Self {
        let mut table = Self::default();
        for row in rows {
            let name = row.first().map(|s| s.trim()).unwrap_or("");
            if name.is_empty() {
                continue;
            }
            let reference = row.get(1).map(|s| s.trim()).unwrap_or("");
            table.insert(name, reference);
        }
        table
    }

    /// Insert or replace an entry
    pub fn insert(&mut self, name: impl Into<String>, reference: impl Into<String>) {
        let name = name.into();
        if self.entries.insert(name.clone(), reference.into()).is_none() {
            self.order.push(name);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .filter_map(|name| self.entries.get(name).map(|r| (name.as_str(), r.as_str())))
    }
}

impl TemplateResolver for TemplateTable {
    fn resolve(&self, name: &str) -> Result<String, TemplateNotFound> {
        match self.entries.get(name) {
            Some(reference) if !reference.is_empty() => Ok(reference.clone()),
            _ => Err(TemplateNotFound {
                name: name.to_string(),
            }),
        }
    }
}
