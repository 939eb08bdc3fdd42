use std::time::Duration;

use crate::watchdog::Phase;

const DEFAULT_ROUTER_PROMPT: &str = "You are a helpful real-estate assistant. \
Decide whether one of the available tools is needed to answer the user's request. \
If a tool is needed, call exactly one tool with well-formed JSON arguments. \
If no tool is needed, answer the user directly.";

const DEFAULT_RESPONDER_PROMPT: &str = "You are a helpful real-estate assistant. \
Answer the user's request clearly and concisely. When tool results are provided, \
base your answer on them and never invent data that is not present.";

/// Named router/responder model pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPair {
    /// Non-streamed model that decides whether a tool is needed.
    pub router: String,
    /// Model that writes the user-facing answer.
    pub responder: String,
}

impl ModelPair {
    pub fn new(router: impl Into<String>, responder: impl Into<String>) -> Self {
        Self {
            router: router.into(),
            responder: responder.into(),
        }
    }
}

impl Default for ModelPair {
    fn default() -> Self {
        Self::new("gpt-4o-mini", "gpt-4o")
    }
}

/// Configuration shared by the blocking and streamed orchestrators.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub models: ModelPair,
    /// Prior messages shown to the router.
    pub router_history_window: usize,
    /// Prior messages shown to the responder.
    pub responder_history_window: usize,
    /// Watchdog window before the router has answered.
    pub request_timeout: Duration,
    /// Watchdog window during tool execution and generation, renewed on progress.
    pub generation_timeout: Duration,
    /// Minimum gap between lazy discovery attempts while the catalogue is empty.
    pub discovery_retry_interval: Duration,
    pub router_system_prompt: String,
    pub responder_system_prompt: String,
}

impl OrchestratorConfig {
    pub fn with_models(models: ModelPair) -> Self {
        Self {
            models,
            ..Default::default()
        }
    }

    pub fn window(&self, phase: Phase) -> Duration {
        match phase {
            Phase::AwaitingRouter => self.request_timeout,
            Phase::ToolExecution | Phase::Generating => self.generation_timeout,
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            models: ModelPair::default(),
            router_history_window: 5,
            responder_history_window: 3,
            request_timeout: Duration::from_secs(60),
            generation_timeout: Duration::from_secs(120),
            discovery_retry_interval: Duration::from_secs(300),
            router_system_prompt: DEFAULT_ROUTER_PROMPT.to_string(),
            responder_system_prompt: DEFAULT_RESPONDER_PROMPT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_windows() {
        let config = OrchestratorConfig::default();

        assert_eq!(config.models, ModelPair::new("gpt-4o-mini", "gpt-4o"));
        assert_eq!(config.router_history_window, 5);
        assert_eq!(config.responder_history_window, 3);
        assert_eq!(config.window(Phase::AwaitingRouter), Duration::from_secs(60));
        assert_eq!(config.window(Phase::ToolExecution), Duration::from_secs(120));
        assert_eq!(config.window(Phase::Generating), Duration::from_secs(120));
        assert_eq!(config.discovery_retry_interval, Duration::from_secs(300));
    }

    #[test]
    fn with_models_keeps_other_defaults() {
        let config = OrchestratorConfig::with_models(ModelPair::new("small", "large"));

        assert_eq!(config.models.router, "small");
        assert_eq!(config.models.responder, "large");
        assert_eq!(config.router_history_window, 5);
    }
}
