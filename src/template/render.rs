use std::collections::HashMap;
use std::sync::LazyLock;

use minijinja::{Environment, UndefinedBehavior, Value};

use crate::config::types::PromptTemplate;
use crate::error::PrPilotError;

/// Shared minijinja environment with strict undefined behavior.
static JINJA_ENV: LazyLock<Environment<'static>> = LazyLock::new(|| {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env
});

/// Rendered prompt pair ready for the AI model.
#[derive(Debug, Clone)]
pub struct RenderedPrompt {
    pub system: String,
    pub user: String,
}

/// Render a prompt template pair with the given variables.
///
/// Takes ownership of `vars`; the context Value is built once and shared
/// across both template renders via cheap Arc clone.
pub fn render_prompt(
    template: &PromptTemplate,
    vars: HashMap<String, Value>,
) -> Result<RenderedPrompt, PrPilotError> {
    let env = &*JINJA_ENV;
    let ctx = Value::from_iter(vars);

    let system = render_template(env, "system", &template.system, &ctx)?;
    let user = render_template(env, "user", &template.user, &ctx)?;

    Ok(RenderedPrompt { system, user })
}

/// Render a single template string with a pre-built context.
fn render_template(
    env: &Environment,
    name: &str,
    template_str: &str,
    ctx: &Value,
) -> Result<String, PrPilotError> {
    let tmpl = env
        .template_from_str(template_str)
        .map_err(|e| PrPilotError::Other(format!("failed to parse {name} template: {e}")))?;

    tmpl.render(ctx.clone())
        .map_err(|e| PrPilotError::Other(format!("failed to render {name} template: {e}")))
}
