mod chain;
mod error;
mod llm;
mod output_parsers;
mod query;
mod retry;
mod runnable;
mod search;

pub use chain::{Chain, RunnableExt};
pub use error::DraftwiseError;
pub use llm::{Llm, LlmExt, LlmRequest, LlmResponse, Message, Role, ToolCall, ToolSpec};
pub use output_parsers::{strip_code_fence, StructuredOutputParser};
pub use query::{QueryExtractor, QuerySet, Queries, Truncation, MAX_QUERIES};
pub use retry::{is_retryable, Retrying};
pub use runnable::Runnable;
pub use search::{SearchResult, SearchTool};

pub type Value = serde_json::Value;
