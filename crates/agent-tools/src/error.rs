use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ToolProviderError {
    #[error("Discovery failed for provider '{provider}': {message}")]
    Discovery { provider: String, message: String },

    #[error("Invocation of '{tool}' on provider '{provider}' failed after {attempts} attempts: {message}")]
    Invocation {
        provider: String,
        tool: String,
        attempts: u32,
        message: String,
    },

    #[error("Request error: {0}")]
    Request(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for ToolProviderError {
    fn from(e: reqwest::Error) -> Self {
        ToolProviderError::Request(e.to_string())
    }
}

impl From<serde_json::Error> for ToolProviderError {
    fn from(e: serde_json::Error) -> Self {
        ToolProviderError::Request(format!("Invalid response body: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, ToolProviderError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Malformed arguments for '{tool}': {message}")]
    MalformedArguments { tool: String, message: String },

    #[error("no provider could execute {0}")]
    ToolExecution(String),
}
