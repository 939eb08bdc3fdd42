//! Shared helpers for provider implementations.

pub mod chunk_parser;
pub mod openai_compat;
pub mod sse;
