#[derive(Clone, Debug)]
pub struct ExecutionConfig {
    /// Upper bound on executed steps per run; `None` disables the guard.
    pub max_steps: Option<usize>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_steps: Some(50),
        }
    }
}

impl ExecutionConfig {
    pub fn merge(&self, overrides: &ExecutionOptions) -> Self {
        Self {
            max_steps: overrides.max_steps.or(self.max_steps),
        }
    }
}

/// Per-run overrides.
#[derive(Clone, Debug, Default)]
pub struct ExecutionOptions {
    pub max_steps: Option<usize>,
    /// Run identity used to key checkpoints. Falls back to the builder's thread id.
    pub thread_id: Option<String>,
}
