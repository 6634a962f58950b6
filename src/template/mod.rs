//! Templates for req-notifier
//!
//! Two kinds of templating live here:
//!
//! - Email bodies come from template documents (HTML) named in the templates
//!   sheet. They use literal `{{UPPERCASED HEADER}}` placeholders filled from
//!   the row, see [`placeholder`].
//! - Subject lines and the submission notice come from configuration and
//!   are rendered with minijinja, see [`TemplateEngine`].
//!
//! # Example
//!
//! ```ignore
//! use req_notifier::template::{TemplateTable, TemplateResolver, substitute};
//!
//! let table = TemplateTable::from_rows(&store.read_all("Templates")?);
//! let reference = table.resolve("Assigned")?;
//! let html = fetcher.render_as_html(&reference).await?;
//! let body = substitute(&html, &row);
//! ```

mod context;
mod engine;
mod errors;
pub mod placeholder;
mod renderer;
mod table;

pub use context::MessageContext;
pub use engine::TemplateEngine;
pub use errors::{TemplateError, suggest_correction};
pub use placeholder::{substitute, unmatched_placeholders};
pub use renderer::{DocumentFetcher, DocumentRenderer, RenderError};
pub use table::{TemplateNotFound, TemplateResolver, TemplateTable};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::Dataset;

    #[test]
    fn test_body_and_subject_together() {
        let ds = Dataset::from_matrix(vec![
            vec!["Action".into(), "Name".into(), "Req".into()],
            vec!["Approved".into(), "Amy".into(), "R-12".into()],
        ])
        .unwrap();
        let row = ds.row(0).unwrap();

        let body = substitute("<p>{{NAME}}: {{REQ}} is {{ACTION}}</p>", &row);
        assert_eq!(body, "<p>Amy: R-12 is Approved</p>");

        let engine = TemplateEngine::new();
        let ctx = MessageContext::for_row(&row, "Action", "approved");
        let subject = engine
            .render("Purchase Notification: {{ action }} ({{ row.Req }})", &ctx)
            .unwrap();
        assert_eq!(subject, "Purchase Notification: Approved (R-12)");
    }
}
