//! Prompt types for docent.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sentinel the model is told to emit when the context lacks the answer.
pub const UNKNOWN_ANSWER: &str = "I don't know";

const GROUNDED_TEMPLATE: &str = r#"You are an assistant that answers ONLY using the given context.
If the answer is not present, say "{{unknown}}".

Context:
{{context}}

Question:
{{question}}

Answer:
"#;

/// A prompt definition, built in or loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Template string with Handlebars syntax.
    ///
    /// Available variables: `context`, `question`, `unknown`.
    pub template: String,

    /// Phrase the model must answer with when the context is insufficient
    #[serde(rename = "unknownAnswer", default = "default_unknown_answer")]
    pub unknown_answer: String,
}

fn default_unknown_answer() -> String {
    UNKNOWN_ANSWER.to_string()
}

impl PromptDefinition {
    /// The built-in grounded-answer prompt.
    pub fn grounded_default() -> Self {
        Self {
            id: "answer".to_string(),
            title: "Grounded answer".to_string(),
            api_version: "1.0".to_string(),
            template: GROUNDED_TEMPLATE.to_string(),
            unknown_answer: default_unknown_answer(),
        }
    }
}

impl Default for PromptDefinition {
    fn default() -> Self {
        Self::grounded_default()
    }
}

/// A fully rendered prompt ready for a single model call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// Rendered prompt text
    pub text: String,

    /// Metadata about the rendered prompt
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    /// Source prompt ID
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,

    /// Characters of context injected into the prompt
    #[serde(rename = "contextChars")]
    pub context_chars: usize,

    /// Template variables that were resolved
    #[serde(rename = "resolvedVariables")]
    pub resolved_variables: HashMap<String, String>,
}
