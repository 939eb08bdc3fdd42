use serde::{Deserialize, Serialize};

/// Lifecycle events pushed to the caller of a streamed chat turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StreamEvent {
    Status {
        message: String,
    },

    Heartbeat,

    ToolExecution {
        tool: String,
        status: ToolExecutionStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// One text delta plus everything relayed so far in this turn.
    Token {
        content: String,
        accumulated: String,
    },

    Complete {
        content: String,
    },

    Error {
        message: String,
    },

    Cancelled {
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolExecutionStatus {
    Starting,
    Completed,
    Failed,
}

impl StreamEvent {
    pub fn status(message: impl Into<String>) -> Self {
        StreamEvent::Status {
            message: message.into(),
        }
    }

    pub fn tool_starting(tool: impl Into<String>) -> Self {
        StreamEvent::ToolExecution {
            tool: tool.into(),
            status: ToolExecutionStatus::Starting,
            result: None,
            error: None,
        }
    }

    pub fn tool_completed(tool: impl Into<String>, result: serde_json::Value) -> Self {
        StreamEvent::ToolExecution {
            tool: tool.into(),
            status: ToolExecutionStatus::Completed,
            result: Some(result),
            error: None,
        }
    }

    pub fn tool_failed(tool: impl Into<String>, error: impl Into<String>) -> Self {
        StreamEvent::ToolExecution {
            tool: tool.into(),
            status: ToolExecutionStatus::Failed,
            result: None,
            error: Some(error.into()),
        }
    }

    /// Terminal events end the push channel.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamEvent::Complete { .. } | StreamEvent::Error { .. } | StreamEvent::Cancelled { .. }
        )
    }
}
