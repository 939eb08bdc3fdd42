use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::provider::{LLMError, LLMProvider, LLMStream, Result};
use crate::types::AssistantReply;
use agent_core::{Message, ToolSchema};

use super::common::openai_compat::{build_openai_compat_body, parse_openai_compat_completion};
use super::common::sse::llm_stream_from_bytes;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Chat-completions client for any OpenAI-compatible endpoint.
pub struct OpenAICompatProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAICompatProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn post(&self, body: &serde_json::Value) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await?;
            return Err(LLMError::Api(format!("HTTP {}: {}", status, text)));
        }

        Ok(response)
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatProvider {
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        model: &str,
    ) -> Result<AssistantReply> {
        log::debug!(
            "Requesting completion from '{}' with {} messages and {} tools",
            model,
            messages.len(),
            tools.len()
        );

        let body = build_openai_compat_body(model, messages, tools, false);
        let response = self.post(&body).await?;
        let text = response.text().await?;

        parse_openai_compat_completion(&text)
    }

    async fn chat_stream(&self, messages: &[Message], model: &str) -> Result<LLMStream> {
        log::debug!(
            "Opening streamed completion from '{}' with {} messages",
            model,
            messages.len()
        );

        let body = build_openai_compat_body(model, messages, &[], true);
        let response = self.post(&body).await?;

        Ok(llm_stream_from_bytes(response.bytes_stream()))
    }
}
