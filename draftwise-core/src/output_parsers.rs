use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::{DraftwiseError, LlmResponse, Runnable};

/// Removes a surrounding markdown code fence (```json or ```) if present.
pub fn strip_code_fence(input: &str) -> &str {
    let trimmed = input.trim();
    if trimmed.starts_with("```json") {
        trimmed
            .trim_start_matches("```json")
            .trim_end_matches("```")
            .trim()
    } else if trimmed.starts_with("```") {
        trimmed
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
    } else {
        trimmed
    }
}

/// A parser that extracts structured output from `LlmResponse`.
/// It prioritizes `tool_calls` (first call args), then falls back to parsing `content` as JSON.
#[derive(Clone)]
pub struct StructuredOutputParser<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> StructuredOutputParser<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for StructuredOutputParser<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: DeserializeOwned + Send + 'static> Runnable<LlmResponse, T> for StructuredOutputParser<T> {
    async fn invoke(&self, input: LlmResponse) -> Result<T, DraftwiseError> {
        if let Some(call) = input.tool_calls.first() {
            return serde_json::from_value(call.args.clone()).map_err(|err| {
                DraftwiseError::ParseFailed {
                    output: call.args.to_string(),
                    reason: err.to_string(),
                }
            });
        }

        let cleaned = strip_code_fence(&input.content);
        if cleaned.is_empty() {
            return Err(DraftwiseError::ParseFailed {
                output: input.content,
                reason: "no structured output found in tool calls or content".to_string(),
            });
        }

        serde_json::from_str(cleaned).map_err(|err| DraftwiseError::ParseFailed {
            output: cleaned.to_string(),
            reason: err.to_string(),
        })
    }
}
