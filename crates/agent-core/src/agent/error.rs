use thiserror::Error;

/// Substrings that mark an error as a user-initiated cancellation rather than a failure.
const CANCELLATION_MARKERS: &[&str] = &["cancel", "abort"];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    #[error("Router call failed: {0}")]
    RouterCall(String),

    #[error("Responder call failed: {0}")]
    ResponderCall(String),

    #[error("Malformed tool arguments: {0}")]
    MalformedToolArguments(String),

    #[error("Tool execution failed: {0}")]
    ToolExecution(String),

    #[error("{0}")]
    StreamTimeout(String),

    #[error("{0}")]
    Cancelled(String),
}

impl AgentError {
    /// Whether this error should surface as a cancellation instead of an error.
    pub fn is_cancellation(&self) -> bool {
        if matches!(self, AgentError::Cancelled(_)) {
            return true;
        }

        let message = self.to_string().to_lowercase();
        CANCELLATION_MARKERS
            .iter()
            .any(|marker| message.contains(marker))
    }
}
