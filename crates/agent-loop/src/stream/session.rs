use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use agent_core::StreamEvent;
use parking_lot::Mutex;

use crate::sink::EventSink;
use crate::watchdog::Watchdog;

/// Per-request state of a streamed turn.
pub struct StreamSession {
    conversation_key: String,
    sink: Arc<dyn EventSink>,
    buffer: Mutex<String>,
    streaming_started: AtomicBool,
    disconnected: Arc<AtomicBool>,
    watchdog: Watchdog,
}

impl StreamSession {
    pub fn new(conversation_key: impl Into<String>, sink: Arc<dyn EventSink>) -> Self {
        let conversation_key = conversation_key.into();
        let disconnected = Arc::new(AtomicBool::new(false));

        let flag = disconnected.clone();
        let key = conversation_key.clone();
        sink.on_disconnect(Box::new(move || {
            log::info!("[{}] Client disconnected", key);
            flag.store(true, Ordering::SeqCst);
        }));

        Self {
            conversation_key,
            sink,
            buffer: Mutex::new(String::new()),
            streaming_started: AtomicBool::new(false),
            disconnected,
            watchdog: Watchdog::new(),
        }
    }

    pub fn conversation_key(&self) -> &str {
        &self.conversation_key
    }

    pub fn watchdog(&self) -> &Watchdog {
        &self.watchdog
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::SeqCst)
    }

    pub fn has_started_streaming(&self) -> bool {
        self.streaming_started.load(Ordering::SeqCst)
    }

    pub fn accumulated(&self) -> String {
        self.buffer.lock().clone()
    }

    /// Sends an event unless the peer has gone away.
    pub fn emit(&self, event: StreamEvent) {
        if self.is_disconnected() {
            log::trace!("[{}] Dropping event after disconnect", self.conversation_key);
            return;
        }

        if !self.sink.emit(event) {
            self.disconnected.store(true, Ordering::SeqCst);
        }
    }

    /// Appends a text delta and relays it with the running total.
    pub fn push_token(&self, delta: &str) {
        let accumulated = {
            let mut buffer = self.buffer.lock();
            buffer.push_str(delta);
            buffer.clone()
        };
        self.streaming_started.store(true, Ordering::SeqCst);

        self.emit(StreamEvent::Token {
            content: delta.to_string(),
            accumulated,
        });
    }

    /// Disarms the watchdog and closes the sink.
    pub fn finish(&self) {
        self.watchdog.clear();
        self.sink.close();
    }
}
