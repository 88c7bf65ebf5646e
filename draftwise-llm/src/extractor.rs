use async_trait::async_trait;
use draftwise_core::{
    Chain, DraftwiseError, Llm, LlmRequest, LlmResponse, Message, Queries, QueryExtractor,
    QuerySet, Runnable, RunnableExt, StructuredOutputParser, ToolSpec, MAX_QUERIES,
};

const TOOL_NAME: &str = "Queries";

/// Asks a chat model for a `Queries` object through a forced tool call and
/// parses the answer into a [`QuerySet`].
pub struct LlmQueryExtractor<L> {
    chain: Chain<L, StructuredOutputParser<Queries>, LlmResponse>,
    tool: ToolSpec,
    model: String,
    degrade_on_parse_failure: bool,
}

impl<L> LlmQueryExtractor<L>
where
    L: Llm + 'static,
{
    pub fn new(llm: L) -> Result<Self, DraftwiseError> {
        let schema = schemars::schema_for!(Queries);
        let parameters = serde_json::to_value(schema)?;
        Ok(Self {
            chain: llm.then(StructuredOutputParser::<Queries>::new()),
            tool: ToolSpec {
                name: TOOL_NAME.to_string(),
                description: format!("Search queries to run, at most {MAX_QUERIES}."),
                parameters,
            },
            model: String::new(),
            degrade_on_parse_failure: false,
        })
    }

    /// Overrides the client's default model for extraction calls.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Return an empty set instead of failing when the model's output
    /// cannot be parsed.
    pub fn degrade_on_parse_failure(mut self, degrade: bool) -> Self {
        self.degrade_on_parse_failure = degrade;
        self
    }

    pub fn tool(&self) -> &ToolSpec {
        &self.tool
    }
}

#[async_trait]
impl<L> QueryExtractor for LlmQueryExtractor<L>
where
    L: Llm + 'static,
{
    async fn extract_queries(
        &self,
        system: &str,
        context: &str,
    ) -> Result<QuerySet, DraftwiseError> {
        let request = LlmRequest {
            model: self.model.clone(),
            messages: vec![Message::system(system), Message::user(context)],
            tools: vec![self.tool.clone()],
            tool_choice: Some(self.tool.name.clone()),
        };

        let parsed = match Runnable::<LlmRequest, Queries>::invoke(&self.chain, request).await {
            Ok(parsed) => parsed,
            Err(err @ DraftwiseError::ParseFailed { .. }) if self.degrade_on_parse_failure => {
                tracing::warn!(error = %err, "query extraction failed, continuing without queries");
                return Ok(QuerySet::default());
            }
            Err(err) => return Err(err),
        };

        let requested = parsed.queries.len();
        let (queries, dropped) = QuerySet::truncate(parsed.queries);
        if dropped.dropped() > 0 {
            tracing::warn!(
                requested,
                kept = queries.len(),
                blank = dropped.blank,
                over_limit = dropped.over_limit,
                "dropped queries from model output"
            );
        }
        Ok(queries)
    }
}
