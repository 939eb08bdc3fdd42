use serde::{Deserialize, Serialize};

/// Root tool-provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProvidersConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    /// How an invocation is spread across providers
    #[serde(default)]
    pub dispatch: DispatchPolicy,
    /// Providers in registration order
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

fn default_version() -> u32 {
    1
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            version: 1,
            dispatch: DispatchPolicy::default(),
            providers: Vec::new(),
        }
    }
}

/// Strategy for choosing which provider executes a tool call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicy {
    /// Try providers one at a time in registration order; first success wins.
    #[default]
    SequentialFallback,
    /// Invoke every provider at once; first success wins.
    Race,
}

/// Single tool provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderConfig {
    /// Unique identifier for this provider
    pub id: String,
    /// Human-readable name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Whether this provider is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Base address, e.g. `http://localhost:3001`
    pub base_url: String,
    /// Maximum invocation attempts
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// Delay before the second attempt; doubles on every further attempt
    #[serde(default = "default_backoff_base")]
    pub backoff_base_ms: u64,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
    /// Bearer token used when a call carries no credential of its own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_retries() -> u32 {
    3
}

fn default_backoff_base() -> u64 {
    1000 // 1 second
}

fn default_request_timeout() -> u64 {
    30000 // 30 seconds
}

impl ProviderConfig {
    pub fn new(id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            enabled: true,
            base_url: base_url.into(),
            retries: default_retries(),
            backoff_base_ms: default_backoff_base(),
            request_timeout_ms: default_request_timeout(),
            credential: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}
