use crate::{GraphState, StateSchema, END};

/// State observed right after one step finished.
#[derive(Debug, Clone)]
pub struct GraphSnapshot<S: StateSchema> {
    /// Node that just ran.
    pub node: String,
    /// 1-based count of steps executed in this run, including resumed ones.
    pub step: usize,
    /// Node that runs next, or [`END`].
    pub next: String,
    pub state: GraphState<S>,
}

impl<S: StateSchema> GraphSnapshot<S> {
    pub fn is_terminal(&self) -> bool {
        self.next == END
    }
}
