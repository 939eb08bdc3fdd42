use std::time::Duration;

use agent_core::ToolDescriptor;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ProviderConfig;
use crate::error::{Result, ToolProviderError};
use crate::types::{CallContext, ToolCallRequest, ToolCallResponse};

/// A service that can list and execute tools.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    fn id(&self) -> &str;

    /// Tools currently offered. Failure means "zero tools right now", not a fatal error.
    async fn list_tools(&self, ctx: &CallContext) -> Result<Vec<ToolDescriptor>>;

    /// Execute `name`, returning the provider's raw payload on the first 2xx response.
    async fn invoke(
        &self,
        name: &str,
        arguments: &Value,
        ctx: &CallContext,
    ) -> Result<ToolCallResponse>;

    /// Never fails; any problem reads as unhealthy.
    async fn health_check(&self) -> bool;
}

/// `GET /tools` may return a bare array or `{"tools": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ToolListing {
    Bare(Vec<ToolDescriptor>),
    Wrapped { tools: Vec<ToolDescriptor> },
}

impl From<ToolListing> for Vec<ToolDescriptor> {
    fn from(listing: ToolListing) -> Self {
        match listing {
            ToolListing::Bare(tools) | ToolListing::Wrapped { tools } => tools,
        }
    }
}

/// HTTP client for one tool provider.
pub struct HttpToolProvider {
    config: ProviderConfig,
    client: Client,
}

impl HttpToolProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(ToolProviderError::InvalidConfig(format!(
                "provider '{}' has an empty base_url",
                config.id
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn max_attempts(&self) -> u32 {
        self.config.retries.max(1)
    }

    /// Delay slept after failed attempt `attempt` (1-based): `base * 2^(attempt - 1)`.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.config.backoff_base_ms).saturating_mul(factor)
    }

    fn authorize(&self, request: RequestBuilder, ctx: &CallContext) -> RequestBuilder {
        match ctx
            .credential
            .as_deref()
            .or(self.config.credential.as_deref())
        {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn invoke_once(&self, body: &ToolCallRequest, ctx: &CallContext) -> Result<ToolCallResponse> {
        let response = self
            .authorize(self.client.post(self.url("/tools/call")), ctx)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ToolProviderError::Request(format!("HTTP {}: {}", status, text)));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl ToolProvider for HttpToolProvider {
    fn id(&self) -> &str {
        &self.config.id
    }

    async fn list_tools(&self, ctx: &CallContext) -> Result<Vec<ToolDescriptor>> {
        let discovery_error = |message: String| ToolProviderError::Discovery {
            provider: self.config.id.clone(),
            message,
        };

        let response = self
            .authorize(self.client.get(self.url("/tools")), ctx)
            .send()
            .await
            .map_err(|e| discovery_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(discovery_error(format!("HTTP {}", response.status())));
        }

        let listing: ToolListing = response
            .json()
            .await
            .map_err(|e| discovery_error(e.to_string()))?;
        let tools: Vec<ToolDescriptor> = listing.into();

        info!(
            "Provider '{}' offers {} tools",
            self.config.display_name(),
            tools.len()
        );
        Ok(tools)
    }

    async fn invoke(
        &self,
        name: &str,
        arguments: &Value,
        ctx: &CallContext,
    ) -> Result<ToolCallResponse> {
        let body = ToolCallRequest {
            name: name.to_string(),
            arguments: arguments.clone(),
        };
        let attempts = self.max_attempts();
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            debug!(
                "Invoking '{}' on provider '{}' (attempt {}/{})",
                name, self.config.id, attempt, attempts
            );

            match self.invoke_once(&body, ctx).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    warn!(
                        "Attempt {}/{} of '{}' on provider '{}' failed: {}",
                        attempt, attempts, name, self.config.id, e
                    );
                    last_error = e.to_string();

                    if attempt < attempts {
                        tokio::time::sleep(self.backoff_delay(attempt)).await;
                    }
                }
            }
        }

        Err(ToolProviderError::Invocation {
            provider: self.config.id.clone(),
            tool: name.to_string(),
            attempts,
            message: last_error,
        })
    }

    async fn health_check(&self) -> bool {
        match self.client.get(self.url("/health")).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Health check for provider '{}' failed: {}", self.config.id, e);
                false
            }
        }
    }
}
