//! The essay workflow: plan, research, draft, critique, research again and
//! redraft, for a bounded number of revisions.
//!
//! ```text
//! plan -> research_plan -> generate --(Terminate)--> END
//!                            ^   |
//!                            |   (Continue)
//!                            |   v
//!          research_critique <- reflect
//! ```

mod config;
mod error;
mod nodes;
pub mod prompts;
mod route;
mod state;
mod writer;

pub use config::ResearchConfig;
pub use error::WriterError;
pub use nodes::{
    GenerateNode, PlanNode, ReflectNode, ResearchNode, ResearchSource, GENERATE, PLAN, REFLECT,
    RESEARCH_CRITIQUE, RESEARCH_PLAN,
};
pub use route::{should_continue, Route};
pub use state::{EssayState, EssayUpdate};
pub use writer::{EssayWriter, EssayWriterBuilder};

pub use draftwise_graph::{GraphSnapshot, END};
