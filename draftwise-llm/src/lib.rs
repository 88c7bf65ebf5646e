//! HTTP collaborators for the essay workflow: an OpenAI-compatible chat
//! client (Groq by default), a Tavily search client and an LLM-backed
//! query extractor.

mod extractor;
pub mod openai_compatible;
mod tavily;

pub use draftwise_core::{LlmRequest, LlmResponse, Message, Role, ToolCall, ToolSpec};
pub use extractor::LlmQueryExtractor;
pub use openai_compatible::{
    ChatCompletionRequest, OpenAiCompatibleBuilder, OpenAiCompatibleClient,
};
pub use tavily::{TavilyBuilder, TavilyClient};
