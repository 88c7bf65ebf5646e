use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use ahash::AHashMap;
use async_stream::try_stream;
use draftwise_core::Runnable;
use futures::stream::{BoxStream, StreamExt};
use tracing::Instrument;

use crate::{
    Checkpoint, Checkpointer, EdgeKind, ExecutionConfig, ExecutionOptions, GraphError,
    GraphProgram, GraphSnapshot, GraphState, StateSchema, StateUpdate,
};

/// Reserved target that ends a run.
pub const END: &str = "__end__";

type BoxedNode<S> = Box<dyn Runnable<GraphState<S>, StateUpdate<S>> + Send + Sync>;
type Router<S> = Box<dyn Fn(&GraphState<S>) -> Result<String, GraphError> + Send + Sync>;

enum Edge<S: StateSchema> {
    Direct(String),
    Conditional {
        router: Router<S>,
        targets: Vec<String>,
    },
}

impl<S: StateSchema> Edge<S> {
    fn targets(&self) -> Vec<&str> {
        match self {
            Edge::Direct(to) => vec![to.as_str()],
            Edge::Conditional { targets, .. } => targets.iter().map(String::as_str).collect(),
        }
    }

    fn kind(&self) -> EdgeKind {
        match self {
            Edge::Direct(_) => EdgeKind::Direct,
            Edge::Conditional { .. } => EdgeKind::Conditional,
        }
    }
}

pub struct GraphBuilder<S: StateSchema> {
    nodes: AHashMap<String, BoxedNode<S>>,
    edges: AHashMap<String, Edge<S>>,
    entry: Option<String>,
    default_config: ExecutionConfig,
    checkpointer: Option<Arc<dyn Checkpointer<S>>>,
    thread_id: Option<String>,
}

impl<S: StateSchema> Default for GraphBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StateSchema> GraphBuilder<S> {
    pub fn new() -> Self {
        Self {
            nodes: AHashMap::new(),
            edges: AHashMap::new(),
            entry: None,
            default_config: ExecutionConfig::default(),
            checkpointer: None,
            thread_id: None,
        }
    }

    pub fn add_node<R>(mut self, name: &str, node: R) -> Self
    where
        R: Runnable<GraphState<S>, StateUpdate<S>> + Send + Sync + 'static,
    {
        self.nodes.insert(name.to_string(), Box::new(node));
        self
    }

    pub fn set_entry(mut self, name: &str) -> Self {
        self.entry = Some(name.to_string());
        self
    }

    /// Unconditional transition. Use [`END`] as `to` to finish the run.
    pub fn add_edge(mut self, from: &str, to: &str) -> Self {
        self.edges
            .insert(from.to_string(), Edge::Direct(to.to_string()));
        self
    }

    /// Branches after `from` by evaluating `router` against the updated state
    /// and looking the returned key up in `routes`.
    pub fn add_conditional_edges<R, F, I, T>(mut self, from: &str, router: F, routes: I) -> Self
    where
        R: Eq + Hash + Debug + Send + Sync + 'static,
        F: Fn(&GraphState<S>) -> R + Send + Sync + 'static,
        I: IntoIterator<Item = (R, T)>,
        T: Into<String>,
    {
        let table: AHashMap<R, String> = routes
            .into_iter()
            .map(|(route, target)| (route, target.into()))
            .collect();
        let mut targets: Vec<String> = table.values().cloned().collect();
        targets.sort();
        targets.dedup();

        let node = from.to_string();
        let resolve = move |state: &GraphState<S>| {
            let route = router(state);
            table
                .get(&route)
                .cloned()
                .ok_or_else(|| GraphError::InvalidRoute {
                    node: node.clone(),
                    route: format!("{route:?}"),
                })
        };
        self.edges.insert(
            from.to_string(),
            Edge::Conditional {
                router: Box::new(resolve),
                targets,
            },
        );
        self
    }

    pub fn with_default_config(mut self, config: ExecutionConfig) -> Self {
        self.default_config = config;
        self
    }

    /// Saves a checkpoint after every step under `thread_id`, unless a run
    /// supplies its own thread id.
    pub fn with_checkpointer(
        mut self,
        checkpointer: Arc<dyn Checkpointer<S>>,
        thread_id: impl Into<String>,
    ) -> Self {
        self.checkpointer = Some(checkpointer);
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn build(self) -> Result<ExecutableGraph<S>, GraphError> {
        let entry = self.entry.ok_or(GraphError::MissingEntry)?;
        if !self.nodes.contains_key(&entry) {
            return Err(GraphError::MissingNode { node: entry });
        }

        let mut sources: Vec<&String> = self.edges.keys().collect();
        sources.sort();
        for from in sources {
            let edge = &self.edges[from];
            for to in edge.targets() {
                let known_source = self.nodes.contains_key(from);
                let known_target = to == END || self.nodes.contains_key(to);
                if !known_source || !known_target {
                    return Err(GraphError::InvalidEdge {
                        from: from.clone(),
                        to: to.to_string(),
                    });
                }
            }
        }

        let mut names: Vec<&String> = self.nodes.keys().collect();
        names.sort();
        if let Some(name) = names.iter().find(|name| !self.edges.contains_key(**name)) {
            return Err(GraphError::UnroutedNode {
                node: name.to_string(),
            });
        }

        let program = GraphProgram::new(
            names.iter().map(|name| name.as_str()),
            self.edges.iter().flat_map(|(from, edge)| {
                let kind = edge.kind();
                edge.targets()
                    .into_iter()
                    .map(move |to| (from.as_str(), to, kind))
            }),
        );
        for node in program.unreachable_from(&entry) {
            if node != END {
                tracing::warn!(node = %node, entry = %entry, "node is unreachable from entry");
            }
        }

        Ok(ExecutableGraph {
            nodes: self.nodes,
            edges: self.edges,
            entry,
            default_config: self.default_config,
            checkpointer: self.checkpointer,
            thread_id: self.thread_id,
            program,
        })
    }
}

/// Position of one run inside the graph.
struct RunCursor<S: StateSchema> {
    state: GraphState<S>,
    next: String,
    step: usize,
    max_steps: Option<usize>,
    thread_id: Option<String>,
}

/// An immutable, validated graph. Runs never share state, so one graph may
/// drive any number of concurrent runs.
pub struct ExecutableGraph<S: StateSchema> {
    nodes: AHashMap<String, BoxedNode<S>>,
    edges: AHashMap<String, Edge<S>>,
    entry: String,
    default_config: ExecutionConfig,
    checkpointer: Option<Arc<dyn Checkpointer<S>>>,
    thread_id: Option<String>,
    program: GraphProgram,
}

impl<S: StateSchema> ExecutableGraph<S> {
    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn program(&self) -> &GraphProgram {
        &self.program
    }

    pub async fn invoke(&self, state: GraphState<S>) -> Result<GraphState<S>, GraphError> {
        self.invoke_with_options(state, ExecutionOptions::default())
            .await
    }

    /// Runs from the entry node until a node routes to [`END`] and returns the final state.
    pub async fn invoke_with_options(
        &self,
        state: GraphState<S>,
        options: ExecutionOptions,
    ) -> Result<GraphState<S>, GraphError> {
        let mut run = self.start(state, &options);
        while self.advance(&mut run).await?.is_some() {}
        Ok(run.state)
    }

    pub fn stream(&self, state: GraphState<S>) -> BoxStream<'_, Result<GraphSnapshot<S>, GraphError>> {
        self.stream_with_options(state, ExecutionOptions::default())
    }

    /// Lazily runs the graph, yielding one snapshot per executed step.
    ///
    /// Nothing executes until the stream is polled, and each step starts only
    /// when the next item is requested. Dropping the stream abandons the run.
    /// The stream ends after the step that routes to [`END`], or after the
    /// first error.
    pub fn stream_with_options(
        &self,
        state: GraphState<S>,
        options: ExecutionOptions,
    ) -> BoxStream<'_, Result<GraphSnapshot<S>, GraphError>> {
        let mut run = self.start(state, &options);
        let stream = try_stream! {
            while let Some(snapshot) = self.advance(&mut run).await? {
                yield snapshot;
            }
        };
        stream.boxed()
    }

    /// Continues the run saved under `thread_id` from its latest checkpoint.
    pub async fn resume(&self, thread_id: &str) -> Result<GraphState<S>, GraphError> {
        let mut run = self.restore(thread_id).await?;
        while self.advance(&mut run).await?.is_some() {}
        Ok(run.state)
    }

    pub fn resume_stream(
        &self,
        thread_id: &str,
    ) -> BoxStream<'_, Result<GraphSnapshot<S>, GraphError>> {
        let thread_id = thread_id.to_string();
        let stream = try_stream! {
            let mut run = self.restore(&thread_id).await?;
            while let Some(snapshot) = self.advance(&mut run).await? {
                yield snapshot;
            }
        };
        stream.boxed()
    }

    fn start(&self, state: GraphState<S>, options: &ExecutionOptions) -> RunCursor<S> {
        RunCursor {
            state,
            next: self.entry.clone(),
            step: 0,
            max_steps: self.default_config.merge(options).max_steps,
            thread_id: options.thread_id.clone().or_else(|| self.thread_id.clone()),
        }
    }

    async fn restore(&self, thread_id: &str) -> Result<RunCursor<S>, GraphError> {
        let checkpointer = self
            .checkpointer
            .as_ref()
            .ok_or_else(|| GraphError::Checkpoint("no checkpointer configured".to_string()))?;
        let checkpoint = checkpointer
            .load(thread_id)
            .await
            .map_err(|err| GraphError::Checkpoint(err.to_string()))?
            .ok_or_else(|| {
                GraphError::Checkpoint(format!("no checkpoint for thread '{thread_id}'"))
            })?;
        tracing::info!(
            thread = %thread_id,
            step = checkpoint.step,
            next = %checkpoint.next,
            "resuming from checkpoint"
        );
        Ok(RunCursor {
            state: checkpoint.state,
            next: checkpoint.next,
            step: checkpoint.step as usize,
            max_steps: self.default_config.max_steps,
            thread_id: Some(thread_id.to_string()),
        })
    }

    /// Executes the next node, merges its update and resolves the transition.
    /// Returns `None` once the run has reached [`END`].
    async fn advance(
        &self,
        run: &mut RunCursor<S>,
    ) -> Result<Option<GraphSnapshot<S>>, GraphError> {
        if run.next == END {
            return Ok(None);
        }
        if let Some(max) = run.max_steps {
            if run.step >= max {
                return Err(GraphError::MaxStepsExceeded {
                    max,
                    reached: run.step,
                });
            }
        }

        let current = run.next.clone();
        let node = self
            .nodes
            .get(&current)
            .ok_or_else(|| GraphError::MissingNode {
                node: current.clone(),
            })?;
        let step = run.step + 1;
        let span = tracing::info_span!(
            "graph_node",
            node = %current,
            step,
            thread = run.thread_id.as_deref().unwrap_or("-")
        );

        let update = node
            .invoke(run.state.clone())
            .instrument(span.clone())
            .await
            .map_err(|source| {
                tracing::warn!(parent: &span, error = %source, "node failed");
                GraphError::NodeFailed {
                    node: current.clone(),
                    source,
                }
            })?;
        let state = std::mem::take(&mut run.state);
        run.state = state.apply_update(update);

        let next = match self.edges.get(&current) {
            Some(Edge::Direct(to)) => to.clone(),
            Some(Edge::Conditional { router, .. }) => router(&run.state)?,
            None => return Err(GraphError::UnroutedNode { node: current }),
        };
        tracing::debug!(parent: &span, next = %next, "routed");
        run.step = step;
        run.next = next.clone();

        if let (Some(checkpointer), Some(thread_id)) = (&self.checkpointer, &run.thread_id) {
            let checkpoint = Checkpoint::new(
                thread_id.clone(),
                run.state.clone(),
                step as u64,
                current.clone(),
                next.clone(),
            );
            checkpointer
                .save(&checkpoint)
                .await
                .map_err(|err| GraphError::Checkpoint(err.to_string()))?;
        }

        Ok(Some(GraphSnapshot {
            node: current,
            step,
            next,
            state: run.state.clone(),
        }))
    }
}
