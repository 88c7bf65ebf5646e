use crate::EssayState;

/// Transition taken after `generate`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    /// Critique the draft and revise it.
    Continue,
    Terminate,
}

/// Ends the run once the revision budget is spent.
pub fn should_continue(state: &EssayState) -> Route {
    if state.revision_number > state.max_revisions {
        Route::Terminate
    } else {
        Route::Continue
    }
}
