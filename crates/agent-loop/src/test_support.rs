//! Scripted fakes shared by the orchestrator tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use agent_core::{
    ConversationHistoryStore, Message, StreamEvent, ToolCall, ToolDescriptor, ToolSchema,
};
use agent_llm::{AssistantReply, LLMChunk, LLMError, LLMProvider, LLMStream};
use agent_tools::{
    CallContext, DispatchPolicy, ToolCallResponse, ToolProvider, ToolProviderError, ToolRegistry,
};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::config::OrchestratorConfig;
use crate::orchestrator::ToolOrchestrator;
use crate::sink::{DisconnectCallback, EventSink};

#[derive(Debug, Clone)]
pub struct RecordedChat {
    pub messages: Vec<Message>,
    pub tools: Vec<ToolSchema>,
    pub model: String,
}

struct StreamScript {
    items: Vec<Result<LLMChunk, String>>,
    hang: bool,
}

#[derive(Default)]
struct ScriptedLlmInner {
    replies: Mutex<VecDeque<Result<AssistantReply, String>>>,
    streams: Mutex<VecDeque<StreamScript>>,
    chat_calls: Mutex<Vec<RecordedChat>>,
    stream_calls: Mutex<Vec<Vec<Message>>>,
}

/// LLM provider that replays queued replies and streams.
#[derive(Clone, Default)]
pub struct ScriptedLlm {
    inner: Arc<ScriptedLlmInner>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, reply: Result<AssistantReply, String>) -> Self {
        self.inner.replies.lock().push_back(reply);
        self
    }

    pub fn stream(self, items: Vec<Result<LLMChunk, String>>) -> Self {
        self.inner
            .streams
            .lock()
            .push_back(StreamScript { items, hang: false });
        self
    }

    /// A stream that yields `items` and then never progresses.
    pub fn hanging_stream(self, items: Vec<Result<LLMChunk, String>>) -> Self {
        self.inner
            .streams
            .lock()
            .push_back(StreamScript { items, hang: true });
        self
    }

    pub fn chat_calls(&self) -> Vec<RecordedChat> {
        self.inner.chat_calls.lock().clone()
    }

    pub fn stream_calls(&self) -> Vec<Vec<Message>> {
        self.inner.stream_calls.lock().clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedLlm {
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        model: &str,
    ) -> agent_llm::Result<AssistantReply> {
        self.inner.chat_calls.lock().push(RecordedChat {
            messages: messages.to_vec(),
            tools: tools.to_vec(),
            model: model.to_string(),
        });

        self.inner
            .replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err("no scripted reply".to_string()))
            .map_err(LLMError::Api)
    }

    async fn chat_stream(&self, messages: &[Message], _model: &str) -> agent_llm::Result<LLMStream> {
        self.inner.stream_calls.lock().push(messages.to_vec());

        let script = self
            .inner
            .streams
            .lock()
            .pop_front()
            .ok_or_else(|| LLMError::Api("no scripted stream".to_string()))?;

        let items = stream::iter(
            script
                .items
                .into_iter()
                .map(|item| item.map_err(LLMError::Stream)),
        );

        if script.hang {
            Ok(items.chain(stream::pending()).boxed())
        } else {
            Ok(items.boxed())
        }
    }
}

pub fn tool_call_reply(name: &str, arguments: &str) -> Result<AssistantReply, String> {
    Ok(AssistantReply::with_tool_calls(vec![ToolCall::new(
        "call_1", name, arguments,
    )]))
}

pub fn tokens(parts: &[&str]) -> Vec<Result<LLMChunk, String>> {
    parts
        .iter()
        .map(|part| Ok(LLMChunk::Token(part.to_string())))
        .collect()
}

#[derive(Default)]
struct RecordingToolsInner {
    listings: AtomicUsize,
    calls: Mutex<Vec<(String, Value)>>,
    credentials: Mutex<Vec<Option<String>>>,
}

/// Tool provider advertising the real-estate tools and returning a fixed outcome.
#[derive(Clone)]
pub struct RecordingTools {
    outcome: Result<Value, String>,
    unreachable_listing: bool,
    inner: Arc<RecordingToolsInner>,
}

impl RecordingTools {
    pub fn returning(result: Value) -> Self {
        Self {
            outcome: Ok(result),
            unreachable_listing: false,
            inner: Arc::default(),
        }
    }

    /// Provider whose tool listing always fails.
    pub fn unlisted() -> Self {
        Self {
            unreachable_listing: true,
            ..Self::returning(Value::Null)
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            unreachable_listing: false,
            inner: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.inner.calls.lock().clone()
    }

    pub fn discoveries(&self) -> usize {
        self.inner.listings.load(Ordering::SeqCst)
    }

    pub fn credentials(&self) -> Vec<Option<String>> {
        self.inner.credentials.lock().clone()
    }
}

#[async_trait]
impl ToolProvider for RecordingTools {
    fn id(&self) -> &str {
        "recording"
    }

    async fn list_tools(&self, _ctx: &CallContext) -> agent_tools::Result<Vec<ToolDescriptor>> {
        self.inner.listings.fetch_add(1, Ordering::SeqCst);
        if self.unreachable_listing {
            return Err(ToolProviderError::Discovery {
                provider: "recording".to_string(),
                message: "connection refused".to_string(),
            });
        }

        Ok(["findListings", "getAnalytics", "sendReport"]
            .iter()
            .map(|name| ToolDescriptor {
                name: name.to_string(),
                description: format!("{name} tool"),
                parameters: json!({"type": "object", "properties": {}}),
            })
            .collect())
    }

    async fn invoke(
        &self,
        name: &str,
        arguments: &Value,
        ctx: &CallContext,
    ) -> agent_tools::Result<ToolCallResponse> {
        self.inner
            .calls
            .lock()
            .push((name.to_string(), arguments.clone()));
        self.inner.credentials.lock().push(ctx.credential.clone());

        match &self.outcome {
            Ok(result) => Ok(ToolCallResponse::success(result.clone())),
            Err(message) => Err(ToolProviderError::Request(message.clone())),
        }
    }

    async fn health_check(&self) -> bool {
        true
    }
}

pub fn orchestrator(llm: &ScriptedLlm, tools: &RecordingTools) -> ToolOrchestrator {
    let registry = ToolRegistry::new(
        vec![Arc::new(tools.clone()) as Arc<dyn ToolProvider>],
        DispatchPolicy::SequentialFallback,
    );

    ToolOrchestrator::new(
        Arc::new(llm.clone()),
        Arc::new(registry),
        Arc::new(ConversationHistoryStore::new()),
        OrchestratorConfig::default(),
    )
}

/// Sink that records events and can simulate the peer going away.
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<StreamEvent>>,
    closed: AtomicBool,
    gone: AtomicBool,
    disconnect_after: Option<usize>,
    callback: Mutex<Option<DisconnectCallback>>,
}

impl CollectingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The peer disconnects once `count` events have been delivered.
    pub fn disconnecting_after(count: usize) -> Arc<Self> {
        Arc::new(Self {
            disconnect_after: Some(count),
            ..Default::default()
        })
    }

    pub fn events(&self) -> Vec<StreamEvent> {
        self.events.lock().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn disconnect(&self) {
        self.gone.store(true, Ordering::SeqCst);
        if let Some(callback) = self.callback.lock().take() {
            callback();
        }
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: StreamEvent) -> bool {
        if self.gone.load(Ordering::SeqCst) || self.is_closed() {
            return false;
        }

        let mut events = self.events.lock();
        if self.disconnect_after.is_some_and(|limit| events.len() >= limit) {
            drop(events);
            self.disconnect();
            return false;
        }

        events.push(event);
        true
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn on_disconnect(&self, callback: DisconnectCallback) {
        *self.callback.lock() = Some(callback);
    }
}
