mod args;
mod render;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use draftwise_core::Retrying;
use draftwise_graph::{Checkpointer, ExecutionOptions, FileCheckpointer, InMemoryCheckpointer};
use draftwise_llm::{LlmQueryExtractor, OpenAiCompatibleClient, TavilyClient};
use draftwise_writer::{EssayState, EssayWriter};
use futures::StreamExt;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::args::Args;

const BACKOFF: Duration = Duration::from_millis(500);

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("draftwise=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_writer(args: &Args, thread_id: &str) -> Result<EssayWriter> {
    let attempts = args.retries as usize;
    let client = OpenAiCompatibleClient::builder()
        .base_url(&args.base_url)?
        .api_key(args.groq_api_key.clone())
        .default_model(args.model.clone())
        .build()
        .context("building chat client")?;
    let search =
        TavilyClient::new(args.tavily_api_key.clone()).context("building search client")?;
    let extractor =
        LlmQueryExtractor::new(Retrying::new(client.clone(), attempts).with_backoff(BACKOFF))?
            .degrade_on_parse_failure(args.degrade_on_parse_failure);

    let checkpointer: Arc<dyn Checkpointer<EssayState>> = match &args.checkpoint_dir {
        Some(dir) => Arc::new(FileCheckpointer::new(dir)),
        None => Arc::new(InMemoryCheckpointer::<EssayState>::default()),
    };

    let writer = EssayWriter::builder()
        .llm(Arc::new(Retrying::new(client, attempts).with_backoff(BACKOFF)))
        .query_extractor(Arc::new(extractor))
        .search(Arc::new(Retrying::new(search, attempts).with_backoff(BACKOFF)))
        .checkpointer(checkpointer)
        .thread_id(thread_id)
        .build()?;
    Ok(writer)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing();

    let thread_id = args
        .thread_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let writer = build_writer(&args, &thread_id)?;

    let mut stream = if args.resume {
        tracing::info!(thread = %thread_id, "resuming essay run");
        writer.resume_stream(&thread_id)
    } else {
        let task = args.task.as_deref().unwrap_or_default();
        let state = EssayWriter::initialize(task, args.max_revisions)?;
        tracing::info!(thread = %thread_id, max_revisions = args.max_revisions, "starting essay run");
        writer.stream_with_options(
            state,
            ExecutionOptions {
                thread_id: Some(thread_id.clone()),
                ..Default::default()
            },
        )
    };

    let mut last: Option<EssayState> = None;
    while let Some(snapshot) = stream.next().await {
        let snapshot = snapshot.context("essay run failed")?;
        let state = snapshot.state.into_inner();
        println!("{}", render::step_header(snapshot.step, &snapshot.node, &state));
        println!("{}", render::sections(&state));
        last = Some(state);
    }

    if args.resume && last.is_none() {
        tracing::info!(thread = %thread_id, "run had already finished");
        let state = writer.resume(&thread_id).await?;
        last = Some(state);
    }

    println!("{}", render::final_output(last.as_ref()));
    Ok(())
}
