//! Prompt loader for YAML prompt overrides.

use crate::types::PromptDefinition;
use docent_core::{AppError, AppResult};
use std::path::Path;

/// Identifier of the answer prompt; its override lives at `answer.yml`.
pub const ANSWER_PROMPT_ID: &str = "answer";

/// Load a prompt definition by ID from a prompts directory.
///
/// Looks for `<id>.yml` in `prompts_dir`.
///
/// # Example
/// ```no_run
/// use docent_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new(".docent/prompts"), "answer")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(prompts_dir: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir.join(format!("{}.yml", prompt_id));

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// Load the answer prompt, falling back to the built-in definition.
pub fn load_answer_prompt(prompts_dir: &Path) -> AppResult<PromptDefinition> {
    if prompts_dir.join(format!("{}.yml", ANSWER_PROMPT_ID)).exists() {
        load_prompt(prompts_dir, ANSWER_PROMPT_ID)
    } else {
        tracing::debug!("No answer prompt override, using built-in definition");
        Ok(PromptDefinition::grounded_default())
    }
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.api_version.is_empty() || !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: '{}'. Expected format: 'x.y'",
            def.api_version
        )));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if def.unknown_answer.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt unknownAnswer cannot be empty".to_string(),
        ));
    }

    // A grounded prompt is useless without both slots.
    for variable in ["context", "question"] {
        if !references_variable(&def.template, variable) {
            return Err(AppError::Prompt(format!(
                "Prompt template must reference {{{{{}}}}}",
                variable
            )));
        }
    }

    Ok(())
}

fn references_variable(template: &str, variable: &str) -> bool {
    template.match_indices("{{").any(|(start, _)| {
        let rest = template[start..].trim_start_matches('{');
        match rest.find("}}") {
            Some(end) => rest[..end].trim() == variable,
            None => false,
        }
    })
}
