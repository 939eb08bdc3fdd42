use agent_core::StreamEvent;

/// Invoked at most once when the peer behind a sink goes away.
pub type DisconnectCallback = Box<dyn FnOnce() + Send + 'static>;

/// Push channel for the events of one streamed turn.
pub trait EventSink: Send + Sync {
    /// Deliver an event. Returns `false` when the peer is no longer listening.
    fn emit(&self, event: StreamEvent) -> bool;

    /// End the channel. Further emissions are dropped.
    fn close(&self);

    /// Register the disconnect callback. Called once per stream.
    fn on_disconnect(&self, callback: DisconnectCallback);
}
