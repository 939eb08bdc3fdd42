//! Remote tool providers for the conversational agent.
//!
//! A tool provider is an independently deployed HTTP service exposing
//! `GET /tools`, `POST /tools/call` and `GET /health`. This crate wraps each
//! one in a retrying client and fans invocations out across all of them.

pub mod client;
pub mod config;
pub mod error;
pub mod registry;
pub mod types;

pub use client::{HttpToolProvider, ToolProvider};
pub use config::{DispatchPolicy, ProviderConfig, ProvidersConfig};
pub use error::{RegistryError, Result, ToolProviderError};
pub use registry::ToolRegistry;
pub use types::{CallContext, ProviderHealth, ToolCallRequest, ToolCallResponse};
