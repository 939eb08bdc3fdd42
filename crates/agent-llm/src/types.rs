use agent_core::ToolCall;
use serde::{Deserialize, Serialize};

/// One item of a streamed completion.
#[derive(Debug, Clone, PartialEq)]
pub enum LLMChunk {
    Token(String),
    Done,
}

/// `choices[0].message` of a non-streamed completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantReply {
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

impl AssistantReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn with_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: None,
            tool_calls,
        }
    }

    /// Content with surrounding whitespace removed, `None` when blank.
    pub fn non_empty_content(&self) -> Option<&str> {
        self.content
            .as_deref()
            .map(str::trim)
            .filter(|content| !content.is_empty())
    }
}
