//! Grounded answer generation.
//!
//! Each call is a single independent exchange with the language model: the
//! prompt carries the retrieved chunks and the question, nothing else.

use crate::rag::types::{Answer, RetrievalResult};
use docent_core::{AppConfig, AppResult};
use docent_llm::{LlmClient, LlmRequest};
use docent_prompt::{build_prompt, PromptDefinition};

/// Separator placed between chunks in the prompt context.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Builds grounded prompts and asks the language model for an answer.
#[derive(Debug, Clone)]
pub struct AnswerGenerator {
    prompt: PromptDefinition,
    model: String,
    max_tokens: u32,
    temperature: Option<f32>,
}

impl AnswerGenerator {
    pub fn new(prompt: PromptDefinition, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            prompt,
            model: model.into(),
            max_tokens,
            temperature: None,
        }
    }

    /// Configure from settings with an explicit prompt definition.
    pub fn with_prompt(config: &AppConfig, prompt: PromptDefinition) -> Self {
        let mut generator = Self::new(prompt, config.llm.model.clone(), config.rag.max_tokens);
        generator.temperature = config.llm.temperature;
        generator
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Answer `query` from the retrieved chunks.
    ///
    /// # Errors
    /// * `AppError::Prompt` - If the prompt cannot be rendered
    /// * `AppError::Llm` - If the model call fails
    pub async fn answer(
        &self,
        llm: &dyn LlmClient,
        query: &str,
        retrieval: RetrievalResult,
    ) -> AppResult<Answer> {
        let context = retrieval.texts().join(CONTEXT_SEPARATOR);
        let built = build_prompt(&self.prompt, &context, query)?;

        let mut request = LlmRequest::new(built.text, &self.model).with_max_tokens(self.max_tokens);
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }

        tracing::info!(
            provider = llm.provider_name(),
            model = %self.model,
            chunks = retrieval.len(),
            context_chars = built.metadata.context_chars,
            "Generating answer"
        );

        let response = llm.complete(&request).await?;

        tracing::debug!(
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "Model response received"
        );
        if !response.done {
            tracing::warn!(
                "Answer reached the {} token limit and may be cut off",
                self.max_tokens
            );
        }

        Ok(Answer {
            text: response.content.trim().to_string(),
            used_chunks: retrieval.hits,
            unknown_answer: self.prompt.unknown_answer.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::types::RetrievedChunk;
    use docent_llm::LlmResponse;
    use docent_llm::LlmUsage;
    use std::sync::Mutex;

    /// Records the last request and replies with a fixed completion.
    struct ScriptedLlm {
        reply: AppResult<String>,
        last_request: Mutex<Option<LlmRequest>>,
    }

    impl ScriptedLlm {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                last_request: Mutex::new(None),
            }
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for ScriptedLlm {
        fn provider_name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            match &self.reply {
                Ok(content) => Ok(LlmResponse {
                    content: content.clone(),
                    model: request.model.clone(),
                    usage: LlmUsage::new(10, 2),
                    done: true,
                }),
                Err(e) => Err(docent_core::AppError::Llm(e.to_string())),
            }
        }
    }

    fn retrieval(texts: &[&str]) -> RetrievalResult {
        RetrievalResult {
            hits: texts
                .iter()
                .enumerate()
                .map(|(i, t)| RetrievedChunk {
                    position: i,
                    text: t.to_string(),
                    distance: i as f32,
                })
                .collect(),
        }
    }

    fn generator() -> AnswerGenerator {
        AnswerGenerator::new(PromptDefinition::grounded_default(), "orca-mini:3b", 300)
    }

    #[tokio::test]
    async fn test_prompt_carries_context_and_query() {
        let llm = ScriptedLlm::replying("  Blue.\n");
        let hits = retrieval(&["The sky is blue.", "Grass is green."]);
        let answer = generator()
            .answer(&llm, "What color is the sky?", hits)
            .await
            .unwrap();

        assert_eq!(answer.text, "Blue.");
        assert_eq!(answer.used_chunks.len(), 2);
        assert!(!answer.is_unknown());

        let request = llm.last_request.lock().unwrap().clone().unwrap();
        assert!(request
            .prompt
            .contains("Context:\nThe sky is blue.\n\nGrass is green.\n"));
        assert!(request.prompt.contains("Question:\nWhat color is the sky?"));
        assert_eq!(request.max_tokens, Some(300));
        assert_eq!(request.model, "orca-mini:3b");
        assert!(request.temperature.is_none());
    }

    #[tokio::test]
    async fn test_unknown_reply_is_detected() {
        let llm = ScriptedLlm::replying("I don't know.");
        let answer = generator()
            .answer(&llm, "Who won the 1930 World Cup?", retrieval(&["Grass is green."]))
            .await
            .unwrap();

        assert!(answer.is_unknown());
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let llm = ScriptedLlm {
            reply: Err(docent_core::AppError::Llm("model crashed".to_string())),
            last_request: Mutex::new(None),
        };

        let result = generator()
            .with_temperature(0.2)
            .answer(&llm, "q", retrieval(&["ctx"]))
            .await;

        assert!(matches!(result, Err(docent_core::AppError::Llm(_))));
        let request = llm.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.temperature, Some(0.2));
    }
}
