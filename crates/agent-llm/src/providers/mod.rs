//! LLM Providers

pub mod common;
pub mod openai;

pub use openai::OpenAICompatProvider;
