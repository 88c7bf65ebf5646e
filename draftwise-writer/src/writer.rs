use std::sync::Arc;

use draftwise_core::{Llm, QueryExtractor, SearchTool};
use draftwise_graph::{
    Checkpointer, ExecutableGraph, ExecutionConfig, ExecutionOptions, GraphBuilder, GraphSnapshot,
    GraphState, END,
};
use futures::stream::{self, BoxStream, StreamExt};

use crate::nodes::{GENERATE, PLAN, REFLECT, RESEARCH_CRITIQUE, RESEARCH_PLAN};
use crate::{
    should_continue, EssayState, GenerateNode, PlanNode, ReflectNode, ResearchConfig,
    ResearchNode, ResearchSource, Route, WriterError,
};

const DEFAULT_THREAD_ID: &str = "1";

#[derive(Default)]
pub struct EssayWriterBuilder {
    llm: Option<Arc<dyn Llm>>,
    extractor: Option<Arc<dyn QueryExtractor>>,
    search: Option<Arc<dyn SearchTool>>,
    research: ResearchConfig,
    checkpointer: Option<Arc<dyn Checkpointer<EssayState>>>,
    thread_id: Option<String>,
}

impl EssayWriterBuilder {
    /// Completion service used by `plan`, `generate` and `reflect`.
    pub fn llm(mut self, llm: Arc<dyn Llm>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn query_extractor(mut self, extractor: Arc<dyn QueryExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn search(mut self, search: Arc<dyn SearchTool>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn research_config(mut self, research: ResearchConfig) -> Self {
        self.research = research;
        self
    }

    /// Saves a checkpoint after every step. Runs are keyed by `thread_id`
    /// (default `"1"`) unless a run names its own.
    ///
    /// Every run without its own `ExecutionOptions::thread_id` writes to the
    /// builder thread, so the latest checkpoint there belongs to whichever
    /// run saved last. Concurrent runs must each pass a distinct thread id.
    pub fn checkpointer(mut self, checkpointer: Arc<dyn Checkpointer<EssayState>>) -> Self {
        self.checkpointer = Some(checkpointer);
        self
    }

    /// Thread used by runs that do not name their own.
    pub fn thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn build(self) -> Result<EssayWriter, WriterError> {
        let llm = self
            .llm
            .ok_or_else(|| missing("completion service"))?;
        let extractor = self
            .extractor
            .ok_or_else(|| missing("query extractor"))?;
        let search = self.search.ok_or_else(|| missing("search tool"))?;

        let mut builder = GraphBuilder::new()
            .add_node(PLAN, PlanNode::new(llm.clone()))
            .add_node(
                RESEARCH_PLAN,
                ResearchNode::new(
                    extractor.clone(),
                    search.clone(),
                    ResearchSource::Plan,
                    self.research.plan_results_per_query,
                ),
            )
            .add_node(GENERATE, GenerateNode::new(llm.clone()))
            .add_node(REFLECT, ReflectNode::new(llm))
            .add_node(
                RESEARCH_CRITIQUE,
                ResearchNode::new(
                    extractor,
                    search,
                    ResearchSource::Critique,
                    self.research.critique_results_per_query,
                ),
            )
            .set_entry(PLAN)
            .add_edge(PLAN, RESEARCH_PLAN)
            .add_edge(RESEARCH_PLAN, GENERATE)
            .add_conditional_edges(
                GENERATE,
                |state: &GraphState<EssayState>| should_continue(&state.data),
                [(Route::Continue, REFLECT), (Route::Terminate, END)],
            )
            .add_edge(REFLECT, RESEARCH_CRITIQUE)
            .add_edge(RESEARCH_CRITIQUE, GENERATE)
            // Fresh runs get an exact bound per run; resumed runs rely on the branch.
            .with_default_config(ExecutionConfig { max_steps: None });

        if let Some(checkpointer) = self.checkpointer {
            let thread_id = self
                .thread_id
                .unwrap_or_else(|| DEFAULT_THREAD_ID.to_string());
            builder = builder.with_checkpointer(checkpointer, thread_id);
        }

        Ok(EssayWriter {
            graph: builder.build()?,
        })
    }
}

fn missing(what: &str) -> WriterError {
    WriterError::InvalidConfig(format!("{what} is required"))
}

/// Runs the essay workflow over injected collaborators.
pub struct EssayWriter {
    graph: ExecutableGraph<EssayState>,
}

impl EssayWriter {
    pub fn builder() -> EssayWriterBuilder {
        EssayWriterBuilder::default()
    }

    /// Creates the initial state for a run. Fails before anything executes
    /// if `task` is blank or `max_revisions` is below 1.
    pub fn initialize(task: &str, max_revisions: u32) -> Result<EssayState, WriterError> {
        EssayState::new(task, max_revisions)
    }

    pub fn graph(&self) -> &ExecutableGraph<EssayState> {
        &self.graph
    }

    pub async fn run_to_completion(&self, state: EssayState) -> Result<EssayState, WriterError> {
        self.run_to_completion_with_options(state, ExecutionOptions::default())
            .await
    }

    pub async fn run_to_completion_with_options(
        &self,
        state: EssayState,
        options: ExecutionOptions,
    ) -> Result<EssayState, WriterError> {
        state.validate()?;
        let options = bounded(&state, options);
        let out = self
            .graph
            .invoke_with_options(GraphState::new(state), options)
            .await?;
        Ok(out.into_inner())
    }

    pub fn stream(
        &self,
        state: EssayState,
    ) -> BoxStream<'_, Result<GraphSnapshot<EssayState>, WriterError>> {
        self.stream_with_options(state, ExecutionOptions::default())
    }

    /// One snapshot per executed step. The stream ends after the final
    /// `generate`, or after the first error.
    pub fn stream_with_options(
        &self,
        state: EssayState,
        options: ExecutionOptions,
    ) -> BoxStream<'_, Result<GraphSnapshot<EssayState>, WriterError>> {
        if let Err(err) = state.validate() {
            return stream::once(async move { Err(err) }).boxed();
        }
        let options = bounded(&state, options);
        self.graph
            .stream_with_options(GraphState::new(state), options)
            .map(|item| item.map_err(WriterError::from))
            .boxed()
    }

    /// Continues the run saved under `thread_id`.
    pub async fn resume(&self, thread_id: &str) -> Result<EssayState, WriterError> {
        let out = self.graph.resume(thread_id).await?;
        Ok(out.into_inner())
    }

    pub fn resume_stream(
        &self,
        thread_id: &str,
    ) -> BoxStream<'_, Result<GraphSnapshot<EssayState>, WriterError>> {
        self.graph
            .resume_stream(thread_id)
            .map(|item| item.map_err(WriterError::from))
            .boxed()
    }
}

fn bounded(state: &EssayState, mut options: ExecutionOptions) -> ExecutionOptions {
    if options.max_steps.is_none() {
        options.max_steps = Some(state.expected_steps());
    }
    options
}
