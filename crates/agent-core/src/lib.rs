pub mod agent;
pub mod compose;
pub mod history;
pub mod tools;

pub use agent::events::{StreamEvent, ToolExecutionStatus};
pub use agent::types::{Message, Role};
pub use agent::AgentError;
pub use compose::{build_tool_context_message, ToolKind};
pub use history::{ConversationHistoryStore, HistoryEntry, HistoryStats, MAX_ENTRIES_PER_KEY};
pub use tools::{
    parse_tool_args, FunctionCall, FunctionSchema, ToolCall, ToolDescriptor, ToolError,
    ToolSchema,
};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
