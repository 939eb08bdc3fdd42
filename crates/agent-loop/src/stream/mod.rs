//! Streamed variant of the router/responder turn.

mod session;

use std::sync::Arc;

use agent_core::{build_tool_context_message, AgentError, Message, StreamEvent};
use agent_llm::{LLMChunk, LLMStream};
use agent_tools::CallContext;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::orchestrator::{Result, ToolOrchestrator, EMPTY_REPLY};
use crate::sink::EventSink;
use crate::watchdog::Phase;

pub use session::StreamSession;

pub const DISCOVERING_STATUS: &str = "Discovering available tools...";
pub const REQUEST_TIMEOUT_MESSAGE: &str = "Request timeout — no response received";
pub const STREAM_TIMEOUT_MESSAGE: &str = "Stream timeout — no progress received";
pub const CANCELLED_MESSAGE: &str = "Request cancelled by user";

/// One streamed user turn.
#[derive(Debug, Clone)]
pub struct StreamRequest {
    pub conversation_key: String,
    pub message: String,
    pub context: CallContext,
    pub cancel: CancellationToken,
}

impl StreamRequest {
    pub fn new(conversation_key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            conversation_key: conversation_key.into(),
            message: message.into(),
            context: CallContext::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_context(mut self, context: CallContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Runs turns whose answer is relayed token by token through an [`EventSink`].
pub struct StreamOrchestrator {
    orchestrator: Arc<ToolOrchestrator>,
}

impl StreamOrchestrator {
    pub fn new(orchestrator: Arc<ToolOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub fn orchestrator(&self) -> &Arc<ToolOrchestrator> {
        &self.orchestrator
    }

    /// Streams one turn. The sink is always closed and the watchdog always
    /// cleared before this returns.
    pub async fn chat_stream(&self, request: StreamRequest, sink: Arc<dyn EventSink>) {
        let key = request.conversation_key.clone();
        let session = StreamSession::new(key.clone(), sink);

        session.emit(StreamEvent::status(DISCOVERING_STATUS));
        session.emit(StreamEvent::Heartbeat);
        self.arm(&session, Phase::AwaitingRouter);

        let outcome = tokio::select! {
            biased;
            _ = request.cancel.cancelled() => {
                Err(AgentError::Cancelled(CANCELLED_MESSAGE.to_string()))
            }
            _ = session.watchdog().expired() => {
                let message = if session.has_started_streaming() {
                    STREAM_TIMEOUT_MESSAGE
                } else {
                    REQUEST_TIMEOUT_MESSAGE
                };
                Err(AgentError::StreamTimeout(message.to_string()))
            }
            result = self.run_turn(&request, &session) => result,
        };

        match outcome {
            Ok(content) => {
                log::info!("[{}] Streamed turn complete ({} chars)", key, content.len());
                session.emit(StreamEvent::Complete { content });
            }
            Err(e) if e.is_cancellation() => {
                log::info!("[{}] Streamed turn cancelled: {}", key, e);
                session.emit(StreamEvent::Cancelled {
                    message: e.to_string(),
                });
            }
            Err(e) => {
                log::error!("[{}] Streamed turn failed: {}", key, e);
                session.emit(StreamEvent::Error {
                    message: e.to_string(),
                });
            }
        }

        session.finish();
    }

    async fn run_turn(&self, request: &StreamRequest, session: &StreamSession) -> Result<String> {
        let key = request.conversation_key.as_str();
        let context = self.orchestrator.assemble_context(key, &request.message);

        let selected = self
            .orchestrator
            .route(key, &context, &request.message, &request.context)
            .await?;

        let user_content = match selected {
            Some(call) => {
                self.arm(session, Phase::ToolExecution);
                session.emit(StreamEvent::tool_starting(call.name()));

                match self
                    .orchestrator
                    .execute_tool(key, &call, &request.context)
                    .await
                {
                    Ok(result) => {
                        session.emit(StreamEvent::tool_completed(call.name(), result.clone()));
                        build_tool_context_message(&request.message, &call, &result)
                    }
                    Err(e) => {
                        session.emit(StreamEvent::tool_failed(call.name(), e.to_string()));
                        return Err(e);
                    }
                }
            }
            None => request.message.clone(),
        };

        self.arm(session, Phase::Generating);
        let messages = self.orchestrator.responder_messages(&context, user_content);
        let stream = self
            .orchestrator
            .llm()
            .chat_stream(&messages, &self.orchestrator.config().models.responder)
            .await
            .map_err(|e| AgentError::ResponderCall(e.to_string()))?;

        let content = self.relay(stream, session).await?;
        self.orchestrator
            .history()
            .append(key, Message::assistant(content.clone()));
        Ok(content)
    }

    /// Relays deltas until `[DONE]` or the upstream ends.
    async fn relay(&self, mut stream: LLMStream, session: &StreamSession) -> Result<String> {
        let mut saw_done = false;

        while let Some(chunk) = stream.next().await {
            match chunk.map_err(|e| AgentError::ResponderCall(e.to_string()))? {
                LLMChunk::Token(delta) if delta.is_empty() => {}
                LLMChunk::Token(delta) => {
                    session.push_token(&delta);
                    self.arm(session, Phase::Generating);
                }
                LLMChunk::Done => {
                    saw_done = true;
                    break;
                }
            }
        }

        let content = session.accumulated();
        match (content.is_empty(), saw_done) {
            (false, _) => Ok(content),
            (true, true) => {
                log::warn!(
                    "[{}] Responder stream finished without content",
                    session.conversation_key()
                );
                Ok(EMPTY_REPLY.to_string())
            }
            (true, false) => Err(AgentError::ResponderCall(
                "stream ended before any content was received".to_string(),
            )),
        }
    }

    fn arm(&self, session: &StreamSession, phase: Phase) {
        session
            .watchdog()
            .arm(self.orchestrator.config().window(phase));
    }
}
