//! Text-generation capability abstraction
//!
//! Mirrors the embeddings module: a trait seam, an OpenAI-compatible chat
//! completions client, and a deterministic mock that composes an answer from
//! the supplied contexts. An empty `api_key` selects the mock so the whole
//! pipeline runs offline.

use crate::config::GenerationConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Trait for answer generation
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate an answer for `prompt` grounded in the numbered `contexts`.
    ///
    /// Contexts are passed pre-numbered so the generator can emit `[n]`
    /// markers that line up with citation ids.
    async fn generate(&self, prompt: &str, contexts: &[String]) -> Result<String>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// OpenAI-compatible chat completions client
pub struct OpenAiGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

const SYSTEM_PROMPT: &str = "You are a research assistant. Answer using only the numbered \
context passages provided. Cite supporting passages inline with bracketed numbers like [1]. \
If the context does not contain the answer, say so.";

impl OpenAiGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(AppError::Config {
                message: "generation api_key is required for the remote generator".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    fn build_user_message(prompt: &str, contexts: &[String]) -> String {
        let mut message = String::new();
        if !contexts.is_empty() {
            message.push_str("Context passages:\n");
            for (i, context) in contexts.iter().enumerate() {
                message.push_str(&format!("[{}] {}\n", i + 1, context));
            }
            message.push('\n');
        }
        message.push_str(prompt);
        message
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    async fn generate(&self, prompt: &str, contexts: &[String]) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::build_user_message(prompt, contexts),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Generation {
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Generation {
                message: format!("API error {}: {}", status, body),
            });
        }

        let result: ChatCompletionResponse =
            response.json().await.map_err(|e| AppError::Generation {
                message: format!("Failed to parse response: {}", e),
            })?;

        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::Generation {
                message: "Empty response".to_string(),
            })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Deterministic mock generator.
///
/// Produces an answer that references each supplied context with a `[n]`
/// marker, which exercises the citation pipeline without a remote model.
pub struct MockGenerator;

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, prompt: &str, contexts: &[String]) -> Result<String> {
        if contexts.is_empty() {
            return Ok(format!(
                "No supporting material was found for \"{}\". \
                 The indexed collection does not cover this topic.",
                prompt.trim()
            ));
        }

        let mut answer = format!("Regarding \"{}\":\n\n", prompt.trim());
        for (i, context) in contexts.iter().enumerate() {
            let excerpt: String = context.chars().take(160).collect();
            answer.push_str(&format!("- {} [{}]\n", excerpt.trim(), i + 1));
        }
        Ok(answer)
    }

    fn model_name(&self) -> &str {
        "mock-generation"
    }
}

/// Create a generator based on configuration.
///
/// An empty api_key selects the mock rather than erroring, so local
/// development and tests need no credentials.
pub fn create_generator(config: &GenerationConfig) -> Result<Arc<dyn Generator>> {
    if config.api_key.is_empty() {
        tracing::info!("No generation api_key configured, using mock generator");
        Ok(Arc::new(MockGenerator))
    } else {
        Ok(Arc::new(OpenAiGenerator::new(config)?))
    }
}
