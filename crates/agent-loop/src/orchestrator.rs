use std::sync::Arc;

use agent_core::{
    build_tool_context_message, AgentError, ConversationHistoryStore, Message, ToolCall,
    ToolSchema,
};
use agent_llm::LLMProvider;
use agent_tools::{CallContext, RegistryError, ToolRegistry};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::time::Instant;

use crate::config::OrchestratorConfig;

/// Reply returned when a turn fails for any reason.
pub const ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// Reply used when the responder produces no content.
pub const EMPTY_REPLY: &str = "I'm sorry, I couldn't generate a response.";

pub type Result<T> = std::result::Result<T, AgentError>;

/// History windows captured before the user message is appended.
#[derive(Debug, Clone, Default)]
pub(crate) struct TurnContext {
    pub router_window: Vec<Message>,
    pub responder_window: Vec<Message>,
}

/// Runs the two-phase router/responder turn and returns the answer in one piece.
pub struct ToolOrchestrator {
    llm: Arc<dyn LLMProvider>,
    tools: Arc<ToolRegistry>,
    history: Arc<ConversationHistoryStore>,
    config: OrchestratorConfig,
    last_discovery: Mutex<Option<Instant>>,
}

impl ToolOrchestrator {
    pub fn new(
        llm: Arc<dyn LLMProvider>,
        tools: Arc<ToolRegistry>,
        history: Arc<ConversationHistoryStore>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            llm,
            tools,
            history,
            config,
            last_discovery: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn history(&self) -> &Arc<ConversationHistoryStore> {
        &self.history
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    pub(crate) fn llm(&self) -> &Arc<dyn LLMProvider> {
        &self.llm
    }

    /// Answers one user message. Never fails: any error becomes [`ERROR_REPLY`].
    pub async fn chat(&self, conversation_key: &str, text: &str, ctx: &CallContext) -> String {
        match self.run_turn(conversation_key, text, ctx).await {
            Ok(reply) => reply,
            Err(e) => {
                log::error!("[{}] Chat turn failed: {}", conversation_key, e);
                ERROR_REPLY.to_string()
            }
        }
    }

    async fn run_turn(&self, key: &str, text: &str, ctx: &CallContext) -> Result<String> {
        let context = self.assemble_context(key, text);

        let user_content = match self.route(key, &context, text, ctx).await? {
            Some(call) => {
                let result = self.execute_tool(key, &call, ctx).await?;
                build_tool_context_message(text, &call, &result)
            }
            None => text.to_string(),
        };

        let messages = self.responder_messages(&context, user_content);
        let reply = self
            .llm
            .chat(&messages, &[], &self.config.models.responder)
            .await
            .map_err(|e| AgentError::ResponderCall(e.to_string()))?;

        let content = match reply.content.filter(|c| !c.trim().is_empty()) {
            Some(content) => content,
            None => {
                log::warn!("[{}] Responder returned no content", key);
                EMPTY_REPLY.to_string()
            }
        };

        self.history.append(key, Message::assistant(content.clone()));
        Ok(content)
    }

    /// Reads both history windows, then records the user message.
    pub(crate) fn assemble_context(&self, key: &str, text: &str) -> TurnContext {
        let context = TurnContext {
            router_window: self.history.recent(key, self.config.router_history_window),
            responder_window: self.history.recent(key, self.config.responder_history_window),
        };
        self.history.append(key, Message::user(text));
        context
    }

    /// Asks the router model whether a tool is needed. Only the first tool call is acted on.
    pub(crate) async fn route(
        &self,
        key: &str,
        context: &TurnContext,
        text: &str,
        ctx: &CallContext,
    ) -> Result<Option<ToolCall>> {
        let mut messages = Vec::with_capacity(context.router_window.len() + 2);
        messages.push(Message::system(self.config.router_system_prompt.clone()));
        messages.extend(context.router_window.iter().cloned());
        messages.push(Message::user(text));

        let schemas = self.tool_schemas(ctx).await;
        log::debug!(
            "[{}] Routing with {} tools on {}",
            key,
            schemas.len(),
            self.config.models.router
        );

        let reply = self
            .llm
            .chat(&messages, &schemas, &self.config.models.router)
            .await
            .map_err(|e| AgentError::RouterCall(e.to_string()))?;

        let mut calls = reply.tool_calls.into_iter();
        let selected = calls.next();
        let dropped: Vec<String> = calls.map(|call| call.name().to_string()).collect();
        if !dropped.is_empty() {
            log::warn!(
                "[{}] Router requested {} extra tool calls, ignoring: {}",
                key,
                dropped.len(),
                dropped.join(", ")
            );
        }

        if let Some(call) = &selected {
            log::info!("[{}] Router selected tool '{}'", key, call.name());
        }
        Ok(selected)
    }

    pub(crate) async fn execute_tool(
        &self,
        key: &str,
        call: &ToolCall,
        ctx: &CallContext,
    ) -> Result<Value> {
        self.tools
            .invoke_by_name(call, ctx)
            .await
            .map_err(|e| {
                log::warn!("[{}] Tool '{}' failed: {}", key, call.name(), e);
                match e {
                    RegistryError::MalformedArguments { .. } => {
                        AgentError::MalformedToolArguments(e.to_string())
                    }
                    RegistryError::ToolExecution(_) => AgentError::ToolExecution(e.to_string()),
                }
            })
    }

    pub(crate) fn responder_messages(&self, context: &TurnContext, user_content: String) -> Vec<Message> {
        let mut messages = Vec::with_capacity(context.responder_window.len() + 2);
        messages.push(Message::system(self.config.responder_system_prompt.clone()));
        messages.extend(context.responder_window.iter().cloned());
        messages.push(Message::user(user_content));
        messages
    }

    /// The tool catalogue. While it is empty, discovery is retried at most
    /// once per `discovery_retry_interval`.
    async fn tool_schemas(&self, ctx: &CallContext) -> Vec<ToolSchema> {
        if self.tools.catalogue().is_empty() && self.discovery_due() {
            self.tools.discover_all(ctx).await;
        }
        self.tools.tool_schemas()
    }

    fn discovery_due(&self) -> bool {
        let mut last = self.last_discovery.lock();
        let now = Instant::now();
        let due = last.map_or(true, |at| {
            now.duration_since(at) >= self.config.discovery_retry_interval
        });
        if due {
            *last = Some(now);
        }
        due
    }
}
