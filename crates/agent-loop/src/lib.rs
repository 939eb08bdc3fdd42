//! Turn orchestration for the tool-augmented agent.
//!
//! A turn routes the user message through a tool-selection model, runs at
//! most one remote tool, then asks a response model for the answer. The
//! [`ToolOrchestrator`] returns the answer in one piece; the
//! [`StreamOrchestrator`] relays it token by token through an [`EventSink`].

pub mod config;
pub mod orchestrator;
pub mod sink;
pub mod stream;
pub mod watchdog;

pub use config::{ModelPair, OrchestratorConfig};
pub use orchestrator::{ToolOrchestrator, EMPTY_REPLY, ERROR_REPLY};
pub use sink::{DisconnectCallback, EventSink};
pub use stream::{StreamOrchestrator, StreamRequest, StreamSession};
pub use watchdog::{Phase, Watchdog};

#[cfg(test)]
mod test_support;
