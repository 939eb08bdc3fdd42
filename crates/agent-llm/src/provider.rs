use crate::types::{AssistantReply, LLMChunk};
use agent_core::{Message, ToolSchema};
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LLMError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("API error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, LLMError>;

pub type LLMStream = Pin<Box<dyn Stream<Item = Result<LLMChunk>> + Send>>;

#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Non-streamed chat completion.
    ///
    /// When `tools` is non-empty they are attached with `tool_choice = "auto"`.
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        model: &str,
    ) -> Result<AssistantReply>;

    /// Streamed chat completion without tools.
    async fn chat_stream(&self, messages: &[Message], model: &str) -> Result<LLMStream>;
}
