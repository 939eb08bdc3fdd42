//! Server-sent-event framing and the sink that feeds an HTTP response body.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use actix_web::web::Bytes;
use agent_core::StreamEvent;
use agent_loop::{DisconnectCallback, EventSink};
use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// One `data: <json>\n\n` frame.
pub fn encode_event(event: &StreamEvent) -> Option<Bytes> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Bytes::from(format!("data: {}\n\n", json))),
        Err(e) => {
            log::error!("Failed to encode stream event: {}", e);
            None
        }
    }
}

struct SinkShared {
    tx: Mutex<Option<mpsc::UnboundedSender<Bytes>>>,
    callback: Mutex<Option<DisconnectCallback>>,
    disconnected: AtomicBool,
}

impl SinkShared {
    fn disconnect(&self) {
        if self.disconnected.swap(true, Ordering::SeqCst) {
            return;
        }
        self.tx.lock().take();
        if let Some(callback) = self.callback.lock().take() {
            callback();
        }
    }
}

/// Dropped together with the response body. If the sink was still open the
/// peer went away mid-turn.
struct PeerGuard(Arc<SinkShared>);

impl Drop for PeerGuard {
    fn drop(&mut self) {
        if self.0.tx.lock().is_some() {
            self.0.disconnect();
        }
    }
}

/// [`EventSink`] writing SSE frames into a streaming response body.
pub struct SseSink {
    shared: Arc<SinkShared>,
}

impl SseSink {
    /// Creates the sink and the body stream it feeds.
    pub fn channel() -> (
        Arc<SseSink>,
        impl Stream<Item = Result<Bytes, actix_web::Error>> + 'static,
    ) {
        let (tx, mut rx) = mpsc::unbounded_channel::<Bytes>();
        let shared = Arc::new(SinkShared {
            tx: Mutex::new(Some(tx)),
            callback: Mutex::new(None),
            disconnected: AtomicBool::new(false),
        });

        let guard = PeerGuard(shared.clone());
        let body = async_stream::stream! {
            let _guard = guard;
            while let Some(frame) = rx.recv().await {
                yield Ok::<_, actix_web::Error>(frame);
            }
        };

        (Arc::new(SseSink { shared }), body)
    }
}

impl EventSink for SseSink {
    fn emit(&self, event: StreamEvent) -> bool {
        let Some(frame) = encode_event(&event) else {
            return !self.shared.disconnected.load(Ordering::SeqCst);
        };

        let sent = match self.shared.tx.lock().as_ref() {
            Some(tx) => tx.send(frame).is_ok(),
            None => false,
        };

        if !sent {
            self.shared.disconnect();
        }
        sent
    }

    fn close(&self) {
        self.shared.tx.lock().take();
    }

    fn on_disconnect(&self, callback: DisconnectCallback) {
        if self.shared.disconnected.load(Ordering::SeqCst) {
            callback();
            return;
        }
        *self.shared.callback.lock() = Some(callback);
    }
}
