use std::path::PathBuf;

use clap::Parser;

/// Plan, research, draft and critique an essay, streaming every step.
#[derive(Debug, Parser)]
#[command(name = "draftwise", version, about)]
pub struct Args {
    /// Essay topic or prompt.
    #[arg(required_unless_present = "resume")]
    pub task: Option<String>,

    /// Number of drafts to write; every draft but the last is critiqued.
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..=5))]
    pub max_revisions: u32,

    /// Run identity for checkpoints. A random id is used when omitted.
    #[arg(long, env = "DRAFTWISE_THREAD_ID")]
    pub thread_id: Option<String>,

    /// Persist one JSONL checkpoint file per thread in this directory.
    #[arg(long, env = "DRAFTWISE_CHECKPOINT_DIR")]
    pub checkpoint_dir: Option<PathBuf>,

    /// Continue the run saved under --thread-id instead of starting a new one.
    #[arg(long, requires_all = ["thread_id", "checkpoint_dir"])]
    pub resume: bool,

    /// Attempts per model or search call before giving up.
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub retries: u32,

    /// Continue with no queries when the model's query list cannot be parsed.
    #[arg(long)]
    pub degrade_on_parse_failure: bool,

    #[arg(long, env = "DRAFTWISE_MODEL", default_value = draftwise_llm::openai_compatible::DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, env = "DRAFTWISE_BASE_URL", default_value = draftwise_llm::openai_compatible::DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub groq_api_key: String,

    #[arg(long, env = "TAVILY_API_KEY", hide_env_values = true)]
    pub tavily_api_key: String,
}
