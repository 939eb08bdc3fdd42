use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use agent_core::ConversationHistoryStore;
use agent_llm::{LLMProvider, OpenAICompatProvider};
use agent_loop::{ModelPair, OrchestratorConfig, StreamOrchestrator, ToolOrchestrator};
use agent_tools::{CallContext, ProvidersConfig, ToolRegistry};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Settings resolved from the command line.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub llm_base_url: String,
    pub api_key: String,
    pub models: ModelPair,
    pub providers_config: PathBuf,
}

/// Cancellation handle of one streamed turn. The id tells apart turns that
/// share a conversation key.
#[derive(Debug, Clone)]
pub struct StreamRegistration {
    pub id: Uuid,
    pub token: CancellationToken,
}

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ToolOrchestrator>,
    pub streamer: Arc<StreamOrchestrator>,
    pub history: Arc<ConversationHistoryStore>,
    pub tools: Arc<ToolRegistry>,
    /// In-flight streamed turns by conversation key.
    pub cancel_tokens: Arc<RwLock<HashMap<String, StreamRegistration>>>,
}

impl AppState {
    pub fn new(
        llm: Arc<dyn LLMProvider>,
        tools: Arc<ToolRegistry>,
        config: OrchestratorConfig,
    ) -> Self {
        let history = Arc::new(ConversationHistoryStore::new());
        let orchestrator = Arc::new(ToolOrchestrator::new(
            llm,
            tools.clone(),
            history.clone(),
            config,
        ));
        let streamer = Arc::new(StreamOrchestrator::new(orchestrator.clone()));

        Self {
            orchestrator,
            streamer,
            history,
            tools,
            cancel_tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Builds the upstream client and tool registry, then runs initial discovery.
    pub async fn from_config(config: &ServerConfig) -> Self {
        log::info!(
            "Creating LLM provider with base URL: {}",
            config.llm_base_url
        );
        let llm: Arc<dyn LLMProvider> = Arc::new(
            OpenAICompatProvider::new(config.api_key.clone())
                .with_base_url(config.llm_base_url.clone()),
        );

        let providers = load_providers_config(&config.providers_config).await;
        let tools = Arc::new(ToolRegistry::from_config(&providers));
        let discovered = tools.discover_all(&CallContext::default()).await;
        log::info!(
            "Loaded {} tool providers exposing {} tools",
            tools.provider_ids().len(),
            discovered.len()
        );

        Self::new(
            llm,
            tools,
            OrchestratorConfig::with_models(config.models.clone()),
        )
    }

    /// Registers a fresh cancellation token for `key`, replacing any previous one.
    pub async fn register_cancel_token(&self, key: &str) -> StreamRegistration {
        let registration = StreamRegistration {
            id: Uuid::new_v4(),
            token: CancellationToken::new(),
        };
        let mut tokens = self.cancel_tokens.write().await;
        tokens.insert(key.to_string(), registration.clone());
        registration
    }

    /// Forgets `registration` unless a newer turn on the same key has replaced it.
    pub async fn release_cancel_token(&self, key: &str, registration: &StreamRegistration) {
        let mut tokens = self.cancel_tokens.write().await;
        if tokens.get(key).is_some_and(|current| current.id == registration.id) {
            tokens.remove(key);
        }
    }

    /// Cancels the in-flight streamed turn for `key`. Returns whether one existed.
    pub async fn cancel(&self, key: &str) -> bool {
        let mut tokens = self.cancel_tokens.write().await;
        match tokens.remove(key) {
            Some(registration) => {
                registration.token.cancel();
                true
            }
            None => false,
        }
    }
}

/// Loads the tool-provider file. A missing or unreadable file means no providers.
pub async fn load_providers_config(path: &Path) -> ProvidersConfig {
    if !path.exists() {
        log::info!(
            "No providers config found at {:?}, starting without tool providers",
            path
        );
        return ProvidersConfig::default();
    }

    match tokio::fs::read_to_string(path).await {
        Ok(content) => match serde_json::from_str::<ProvidersConfig>(&content) {
            Ok(config) => {
                log::info!(
                    "Loaded providers config with {} providers",
                    config.providers.len()
                );
                config
            }
            Err(e) => {
                log::error!("Failed to parse providers config: {}", e);
                ProvidersConfig::default()
            }
        },
        Err(e) => {
            log::error!("Failed to read providers config: {}", e);
            ProvidersConfig::default()
        }
    }
}
