use std::sync::Arc;

use agent_core::{ToolCall, ToolDescriptor, ToolSchema};
use futures::future::{join_all, select_ok};
use futures::FutureExt;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::{HttpToolProvider, ToolProvider};
use crate::config::{DispatchPolicy, ProvidersConfig};
use crate::error::{RegistryError, ToolProviderError};
use crate::types::{CallContext, ProviderHealth};

/// Ordered set of tool providers with a shared tool catalogue.
pub struct ToolRegistry {
    providers: Vec<Arc<dyn ToolProvider>>,
    policy: DispatchPolicy,
    catalogue: RwLock<Vec<ToolDescriptor>>,
}

impl ToolRegistry {
    pub fn new(providers: Vec<Arc<dyn ToolProvider>>, policy: DispatchPolicy) -> Self {
        Self {
            providers,
            policy,
            catalogue: RwLock::new(Vec::new()),
        }
    }

    /// Builds HTTP providers for every enabled entry. Invalid entries are skipped.
    pub fn from_config(config: &ProvidersConfig) -> Self {
        let providers = config
            .providers
            .iter()
            .filter(|p| p.enabled)
            .filter_map(|p| match HttpToolProvider::new(p.clone()) {
                Ok(provider) => Some(Arc::new(provider) as Arc<dyn ToolProvider>),
                Err(e) => {
                    warn!("Skipping provider '{}': {}", p.id, e);
                    None
                }
            })
            .collect();

        Self::new(providers, config.dispatch)
    }

    pub fn policy(&self) -> DispatchPolicy {
        self.policy
    }

    pub fn provider_ids(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.id().to_string()).collect()
    }

    /// Queries every provider concurrently and replaces the catalogue.
    ///
    /// Tools keep provider registration order. A provider that fails to list
    /// contributes nothing; duplicate names are kept as-is.
    pub async fn discover_all(&self, ctx: &CallContext) -> Vec<ToolDescriptor> {
        let listings = join_all(self.providers.iter().map(|p| p.list_tools(ctx))).await;

        let mut tools = Vec::new();
        for (provider, listing) in self.providers.iter().zip(listings) {
            match listing {
                Ok(mut found) => tools.append(&mut found),
                Err(e) => warn!("Discovery skipped provider '{}': {}", provider.id(), e),
            }
        }

        info!(
            "Discovered {} tools across {} providers",
            tools.len(),
            self.providers.len()
        );
        *self.catalogue.write() = tools.clone();
        tools
    }

    pub fn catalogue(&self) -> Vec<ToolDescriptor> {
        self.catalogue.read().clone()
    }

    /// Catalogue in the function-calling shape the chat model expects.
    pub fn tool_schemas(&self) -> Vec<ToolSchema> {
        self.catalogue.read().iter().map(|t| t.to_schema()).collect()
    }

    /// Executes a model-issued tool call, returning the first successful result.
    ///
    /// Arguments are parsed before any provider is contacted. A response whose
    /// `error` field is set counts as a failure for that provider.
    pub async fn invoke_by_name(
        &self,
        call: &ToolCall,
        ctx: &CallContext,
    ) -> Result<Value, RegistryError> {
        let name = call.name();
        let arguments = call
            .parse_arguments()
            .map_err(|e| RegistryError::MalformedArguments {
                tool: name.to_string(),
                message: e.to_string(),
            })?;

        if self.providers.is_empty() {
            warn!("No tool providers registered for '{}'", name);
            return Err(RegistryError::ToolExecution(name.to_string()));
        }

        match self.policy {
            DispatchPolicy::SequentialFallback => self.invoke_sequential(name, &arguments, ctx).await,
            DispatchPolicy::Race => self.invoke_race(name, &arguments, ctx).await,
        }
    }

    async fn invoke_sequential(
        &self,
        name: &str,
        arguments: &Value,
        ctx: &CallContext,
    ) -> Result<Value, RegistryError> {
        for provider in &self.providers {
            match invoke_provider(provider.as_ref(), name, arguments, ctx).await {
                Ok(value) => {
                    debug!("Tool '{}' served by provider '{}'", name, provider.id());
                    return Ok(value);
                }
                Err(e) => warn!("Provider '{}' could not run '{}': {}", provider.id(), name, e),
            }
        }

        Err(RegistryError::ToolExecution(name.to_string()))
    }

    async fn invoke_race(
        &self,
        name: &str,
        arguments: &Value,
        ctx: &CallContext,
    ) -> Result<Value, RegistryError> {
        let attempts = self
            .providers
            .iter()
            .map(|p| invoke_provider(p.as_ref(), name, arguments, ctx).boxed());

        match select_ok(attempts).await {
            Ok((value, _remaining)) => Ok(value),
            Err(e) => {
                warn!("Every provider failed to run '{}'; last error: {}", name, e);
                Err(RegistryError::ToolExecution(name.to_string()))
            }
        }
    }

    /// Probes every provider concurrently.
    pub async fn health(&self) -> Vec<ProviderHealth> {
        let checks = join_all(self.providers.iter().map(|p| p.health_check())).await;

        self.providers
            .iter()
            .zip(checks)
            .map(|(provider, healthy)| ProviderHealth {
                id: provider.id().to_string(),
                healthy,
            })
            .collect()
    }
}

async fn invoke_provider(
    provider: &dyn ToolProvider,
    name: &str,
    arguments: &Value,
    ctx: &CallContext,
) -> Result<Value, ToolProviderError> {
    let response = provider.invoke(name, arguments, ctx).await?;

    if let Some(message) = response.error_message() {
        return Err(ToolProviderError::Invocation {
            provider: provider.id().to_string(),
            tool: name.to_string(),
            attempts: 1,
            message,
        });
    }

    Ok(response.result.unwrap_or(Value::Null))
}
