//! Cloud backend speaking the OpenAI chat-completions wire format.
//!
//! Any server exposing `POST /v1/chat/completions` works: OpenAI itself, a
//! vLLM or LM Studio instance, or the GoodBoy cloud relay. The prompt built by
//! the personas is sent as a single user message.

use crate::goodboy::client_wrapper::{store_usage, ClientWrapper, TokenUsage};
use crate::goodboy::clients::common::post_json;
use crate::goodboy::error::GoodBoyError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}

/// Client for an OpenAI-compatible endpoint.
pub struct OpenAIClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
    token_usage: Mutex<Option<TokenUsage>>,
}

impl OpenAIClient {
    pub fn new(base_url: &str, model: &str) -> Self {
        OpenAIClient {
            base_url: base_url.to_string(),
            api_key: None,
            model: model.to_string(),
            timeout: Duration::from_secs(120),
            token_usage: Mutex::new(None),
        }
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl ClientWrapper for OpenAIClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        prompt: &str,
        max_tokens: usize,
        temperature: f32,
    ) -> Result<String, GoodBoyError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            temperature,
        };

        let response: ChatCompletionResponse = post_json(
            &self.base_url,
            "/v1/chat/completions",
            &request,
            self.api_key.as_deref(),
            self.timeout,
        )
        .await?;

        if let Some(usage) = response.usage {
            store_usage(
                &self.token_usage,
                TokenUsage {
                    input_tokens: usage.prompt_tokens,
                    output_tokens: usage.completion_tokens,
                    total_tokens: usage.total_tokens,
                },
            );
        }

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| {
                GoodBoyError::BackendUnavailable(format!(
                    "{} returned no choices",
                    self.base_url
                ))
            })
    }

    fn usage_slot(&self) -> Option<&Mutex<Option<TokenUsage>>> {
        Some(&self.token_usage)
    }
}
