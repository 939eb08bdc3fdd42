pub mod provider;
pub mod providers;
pub mod types;

pub use provider::{LLMError, LLMProvider, LLMStream, Result};
pub use providers::common::chunk_parser::{IncrementalChunkParser, ParsedLine};
pub use providers::OpenAICompatProvider;
pub use types::{AssistantReply, LLMChunk};
