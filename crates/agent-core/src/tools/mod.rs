pub mod types;

pub use types::{
    parse_tool_args, FunctionCall, FunctionSchema, ToolCall, ToolDescriptor, ToolError, ToolSchema,
};
