use std::sync::Arc;

use async_trait::async_trait;
use draftwise_core::{
    DraftwiseError, Llm, LlmExt, Message, QueryExtractor, Runnable, SearchTool,
};
use draftwise_graph::{GraphState, StateUpdate};
use draftwise_prompt::PromptTemplate;

use crate::prompts::{
    PLAN_PROMPT, REFLECTION_PROMPT, RESEARCH_CRITIQUE_PROMPT, RESEARCH_PLAN_PROMPT, WRITER_PROMPT,
};
use crate::{EssayState, EssayUpdate};

pub const PLAN: &str = "plan";
pub const RESEARCH_PLAN: &str = "research_plan";
pub const GENERATE: &str = "generate";
pub const REFLECT: &str = "reflect";
pub const RESEARCH_CRITIQUE: &str = "research_critique";

type Input = GraphState<EssayState>;
type Output = StateUpdate<EssayState>;

/// Writes the outline for the task.
pub struct PlanNode {
    llm: Arc<dyn Llm>,
}

impl PlanNode {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Runnable<Input, Output> for PlanNode {
    async fn invoke(&self, input: Input) -> Result<Output, DraftwiseError> {
        let plan = self
            .llm
            .complete(PLAN_PROMPT, vec![Message::user(input.data.task)])
            .await?;
        Ok(StateUpdate::new(EssayUpdate {
            plan: Some(plan),
            ..Default::default()
        }))
    }
}

/// Which state field a research step derives its queries from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResearchSource {
    Plan,
    Critique,
}

/// Extracts up to three queries and appends the content of every search
/// result, in query order then result order.
pub struct ResearchNode {
    extractor: Arc<dyn QueryExtractor>,
    search: Arc<dyn SearchTool>,
    source: ResearchSource,
    prompt: &'static str,
    results_per_query: usize,
}

impl ResearchNode {
    pub fn new(
        extractor: Arc<dyn QueryExtractor>,
        search: Arc<dyn SearchTool>,
        source: ResearchSource,
        results_per_query: usize,
    ) -> Self {
        let prompt = match source {
            ResearchSource::Plan => RESEARCH_PLAN_PROMPT,
            ResearchSource::Critique => RESEARCH_CRITIQUE_PROMPT,
        };
        Self {
            extractor,
            search,
            source,
            prompt,
            results_per_query,
        }
    }
}

#[async_trait]
impl Runnable<Input, Output> for ResearchNode {
    async fn invoke(&self, input: Input) -> Result<Output, DraftwiseError> {
        let context = match self.source {
            ResearchSource::Plan => &input.data.plan,
            ResearchSource::Critique => &input.data.critique,
        };
        let queries = self.extractor.extract_queries(self.prompt, context).await?;
        tracing::info!(source = ?self.source, queries = queries.len(), "extracted search queries");

        let mut found = Vec::new();
        for query in &queries {
            let results = self.search.search(query, self.results_per_query).await?;
            tracing::debug!(query = %query, results = results.len(), "search returned");
            found.extend(results.into_iter().map(|result| result.content));
        }
        tracing::info!(
            added = found.len(),
            total = input.data.content.len() + found.len(),
            "research content appended"
        );

        Ok(StateUpdate::new(EssayUpdate {
            content: found,
            ..Default::default()
        }))
    }
}

/// Drafts the essay from the task, plan and all research so far.
pub struct GenerateNode {
    llm: Arc<dyn Llm>,
    template: PromptTemplate,
}

impl GenerateNode {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self {
            llm,
            template: PromptTemplate::new(WRITER_PROMPT),
        }
    }
}

#[async_trait]
impl Runnable<Input, Output> for GenerateNode {
    async fn invoke(&self, input: Input) -> Result<Output, DraftwiseError> {
        let state = input.data;
        let content = state.content.join("\n\n");
        let system = self.template.render_str(&[("content", content.as_str())])?;
        let user = format!("{}\n\nHere is my plan:\n\n{}", state.task, state.plan);

        let draft = self.llm.complete(&system, vec![Message::user(user)]).await?;
        let revision_number = state.revision_number.checked_add(1).ok_or_else(|| {
            DraftwiseError::InvalidState("revision_number overflowed".to_string())
        })?;
        tracing::info!(revision = state.revision_number, "draft generated");

        Ok(StateUpdate::new(EssayUpdate {
            draft: Some(draft),
            revision_number: Some(revision_number),
            ..Default::default()
        }))
    }
}

/// Critiques the latest draft.
pub struct ReflectNode {
    llm: Arc<dyn Llm>,
}

impl ReflectNode {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Runnable<Input, Output> for ReflectNode {
    async fn invoke(&self, input: Input) -> Result<Output, DraftwiseError> {
        let critique = self
            .llm
            .complete(REFLECTION_PROMPT, vec![Message::user(input.data.draft)])
            .await?;
        Ok(StateUpdate::new(EssayUpdate {
            critique: Some(critique),
            ..Default::default()
        }))
    }
}
