use draftwise_writer::EssayState;

pub const NO_DRAFT: &str = "No final draft generated.";
pub const NO_CRITIQUE: &str = "No critique available.";

/// Estimated share of the run completed after `completed` steps.
pub fn progress(completed: usize, max_revisions: u32) -> f64 {
    let total = 2 + 3 * max_revisions as usize;
    (completed as f64 / total as f64).min(1.0)
}

pub fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        fraction * 100.0
    )
}

/// Non-empty sections of a snapshot, as markdown.
pub fn sections(state: &EssayState) -> String {
    let mut out = String::new();
    if !state.plan.is_empty() {
        out.push_str(&format!("### Plan\n{}\n\n", state.plan));
    }
    if !state.content.is_empty() {
        out.push_str(&format!(
            "### Research Content\n{}\n\n",
            state.content.join("\n\n")
        ));
    }
    if !state.draft.is_empty() {
        out.push_str(&format!("### Draft\n{}\n\n", state.draft));
    }
    if !state.critique.is_empty() {
        out.push_str(&format!("### Critique\n{}\n\n", state.critique));
    }
    out
}

pub fn step_header(step: usize, node: &str, state: &EssayState) -> String {
    format!(
        "--- step {step}: {node} {}",
        progress_bar(progress(step, state.max_revisions), 20)
    )
}

pub fn final_output(state: Option<&EssayState>) -> String {
    let draft = state
        .map(|s| s.draft.as_str())
        .filter(|d| !d.is_empty())
        .unwrap_or(NO_DRAFT);
    let critique = state
        .map(|s| s.critique.as_str())
        .filter(|c| !c.is_empty())
        .unwrap_or(NO_CRITIQUE);
    format!("## Final Essay Output\n\n### Essay:\n{draft}\n\n### Final Critique:\n{critique}\n")
}
