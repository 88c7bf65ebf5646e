use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::{DraftwiseError, Runnable, SearchResult, SearchTool};

/// Retries the wrapped collaborator on transient failures.
pub struct Retrying<R> {
    inner: R,
    max_attempts: usize,
    backoff: Duration,
}

impl<R> Retrying<R> {
    pub fn new(inner: R, max_attempts: usize) -> Self {
        Self {
            inner,
            max_attempts,
            backoff: Duration::ZERO,
        }
    }

    /// Delay before the second attempt; doubles on each further attempt.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, DraftwiseError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, DraftwiseError>> + Send,
    {
        if self.max_attempts == 0 {
            return Err(DraftwiseError::MaxRetriesExceeded { max: 0 });
        }

        let mut delay = self.backoff;
        for attempt in 1..=self.max_attempts {
            match op().await {
                Ok(output) => return Ok(output),
                Err(error) => {
                    if !is_retryable(&error) {
                        return Err(error);
                    }
                    if attempt == self.max_attempts {
                        tracing::warn!(attempt, error = %error, "giving up after final attempt");
                        break;
                    }
                    tracing::warn!(attempt, error = %error, "retryable failure, trying again");
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    }
                }
            }
        }

        Err(DraftwiseError::MaxRetriesExceeded {
            max: self.max_attempts,
        })
    }
}

pub fn is_retryable(error: &DraftwiseError) -> bool {
    matches!(
        error,
        DraftwiseError::LlmProvider(_)
            | DraftwiseError::ToolCallFailed { .. }
            | DraftwiseError::Timeout(_)
    )
}

#[async_trait]
impl<Input, Output, R> Runnable<Input, Output> for Retrying<R>
where
    Input: Send + Sync + Clone + 'static,
    Output: Send + 'static,
    R: Runnable<Input, Output> + Send + Sync,
{
    async fn invoke(&self, input: Input) -> Result<Output, DraftwiseError> {
        self.run(|| self.inner.invoke(input.clone())).await
    }
}

#[async_trait]
impl<R> SearchTool for Retrying<R>
where
    R: SearchTool,
{
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, DraftwiseError> {
        self.run(|| self.inner.search(query, max_results)).await
    }
}
