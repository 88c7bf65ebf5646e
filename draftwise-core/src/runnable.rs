use async_trait::async_trait;

use crate::DraftwiseError;

/// A unit of async work: model calls, parsers, graph nodes.
#[async_trait]
pub trait Runnable<Input: Send + 'static, Output: Send + 'static> {
    async fn invoke(&self, input: Input) -> Result<Output, DraftwiseError>;
}
