//! Prompt builder for rendering answer prompts.

use crate::types::{BuiltPrompt, PromptDefinition};
use grounded_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Render the first-attempt answer prompt.
///
/// # Example
/// ```no_run
/// use grounded_prompt::{build_answer_prompt, PromptDefinition};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = PromptDefinition::builtin_answer();
/// let built = build_answer_prompt(&def, "What is ISCM?", "SOURCE [doc1:c0001] (page=1): ...")?;
/// println!("{}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_answer_prompt(
    definition: &PromptDefinition,
    question: &str,
    sources: &str,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let mut variables = HashMap::new();
    variables.insert("question".to_string(), question.to_string());
    variables.insert("sources".to_string(), sources.to_string());

    let user = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt {
        system: Some(definition.system.clone()),
        user,
        prompt_id: definition.id.clone(),
    })
}

/// Render the length-retry prompt on top of a first-attempt prompt.
pub fn build_retry_prompt(
    definition: &PromptDefinition,
    first: &BuiltPrompt,
    min_words: usize,
) -> AppResult<BuiltPrompt> {
    let mut variables = HashMap::new();
    variables.insert("prompt".to_string(), first.user.clone());
    variables.insert("minWords".to_string(), min_words.to_string());

    let user = render_template(&definition.retry_template, &variables)?;

    Ok(BuiltPrompt {
        system: first.system.clone(),
        user,
        prompt_id: first.prompt_id.clone(),
    })
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Sources are plain text, never HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}
