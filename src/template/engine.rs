//! Template engine for subject lines and notices

use super::context::MessageContext;
use super::errors::TemplateError;
use minijinja::Environment;

/// Template rendering engine
///
/// Wraps minijinja with strict undefined handling, so a misspelled variable
/// in a configured subject fails loudly instead of rendering blank.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    /// Create a new template engine with default configuration
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
        Self { env }
    }

    /// Render a template string with the given context
    pub fn render(&self, template: &str, ctx: &MessageContext) -> Result<String, TemplateError> {
        let mut env = self.env.clone();
        env.add_template_owned("__render__", template.to_string())
            .map_err(|e| TemplateError::syntax(e.to_string(), e.line().unwrap_or(0)))?;

        let tmpl = env.get_template("__render__")?;

        tmpl.render(ctx.to_value())
            .map_err(|e| convert_minijinja_error(e, ctx))
    }

    /// Check if a template is syntactically valid
    pub fn validate(&self, template: &str) -> Result<(), TemplateError> {
        let mut env = self.env.clone();
        env.add_template_owned("__validate__", template.to_string())
            .map_err(|e| TemplateError::syntax(e.to_string(), e.line().unwrap_or(0)))?;
        Ok(())
    }
}

/// Convert a minijinja error to our TemplateError type
fn convert_minijinja_error(err: minijinja::Error, ctx: &MessageContext) -> TemplateError {
    let msg = err.to_string();
    let line = err.line().unwrap_or(0);

    if matches!(err.kind(), minijinja::ErrorKind::UndefinedError) || msg.contains("undefined") {
        let var_name = extract_var_from_error(&msg);
        return TemplateError::undefined_variable(var_name, line, &ctx.known_variables());
    }

    TemplateError::Internal(err)
}

/// Extract variable name from minijinja error message
fn extract_var_from_error(msg: &str) -> String {
    // Messages look like: "undefined value (in <string>:1): variable is `foo`"
    if let Some(start) = msg.find('`') {
        if let Some(end) = msg[start + 1..].find('`') {
            return msg[start + 1..start + 1 + end].to_string();
        }
    }
    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> MessageContext {
        let mut ctx = MessageContext::new();
        ctx.action = Some("Awarded".into());
        ctx.stage = Some("awarded".into());
        ctx.row.insert("Req".into(), "R-104".into());
        ctx
    }

    #[test]
    fn test_simple_render() {
        let engine = TemplateEngine::new();
        let result = engine.render("Hello, world!", &MessageContext::new()).unwrap();
        assert_eq!(result, "Hello, world!");
    }

    #[test]
    fn test_render_default_subject() {
        let engine = TemplateEngine::new();
        let result = engine
            .render("Purchase Notification: {{ action }}", &ctx())
            .unwrap();
        assert_eq!(result, "Purchase Notification: Awarded");
    }

    #[test]
    fn test_render_row_field_with_space() {
        let engine = TemplateEngine::new();
        let mut ctx = ctx();
        ctx.row.insert("Contract PO Number".into(), "PO-9".into());

        let result = engine
            .render("{{ action }} ({{ row['Contract PO Number'] }})", &ctx)
            .unwrap();
        assert_eq!(result, "Awarded (PO-9)");
    }

    #[test]
    fn test_undefined_variable_error() {
        let engine = TemplateEngine::new();
        let result = engine.render("{{ acton }}", &ctx());
        assert!(matches!(
            result.unwrap_err(),
            TemplateError::UndefinedVariable { .. }
        ));
    }

    #[test]
    fn test_syntax_error() {
        let engine = TemplateEngine::new();
        assert!(engine.render("{{ invalid syntax {{", &ctx()).is_err());
    }

    #[test]
    fn test_validate() {
        let engine = TemplateEngine::new();
        assert!(engine.validate("Purchase Notification: {{ action }}").is_ok());
        assert!(engine.validate("Purchase Notification: {{ action }").is_err());
    }

    #[test]
    fn test_conditional() {
        let engine = TemplateEngine::new();
        let result = engine
            .render("{% if stage == 'awarded' %}Award{% else %}Update{% endif %}", &ctx())
            .unwrap();
        assert_eq!(result, "Award");
    }
}
