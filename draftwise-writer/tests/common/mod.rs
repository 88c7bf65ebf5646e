#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use draftwise_core::{
    DraftwiseError, LlmRequest, LlmResponse, QueryExtractor, QuerySet, Runnable, SearchResult,
    SearchTool,
};
use draftwise_writer::prompts::{PLAN_PROMPT, REFLECTION_PROMPT};
use draftwise_writer::{EssayWriter, ResearchConfig};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Call {
    Plan,
    Generate,
    Reflect,
}

/// Deterministic chat model: answers by which step is asking.
#[derive(Default)]
pub struct ScriptedLlm {
    pub requests: Mutex<Vec<(Call, String, String)>>,
    pub fail_on: Option<Call>,
}

impl ScriptedLlm {
    pub fn failing_on(call: Call) -> Self {
        Self {
            fail_on: Some(call),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(call, _, _)| *call)
            .collect()
    }

    pub fn last(&self, call: Call) -> Option<(String, String)> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(c, _, _)| *c == call)
            .map(|(_, system, user)| (system.clone(), user.clone()))
    }
}

#[async_trait::async_trait]
impl Runnable<LlmRequest, LlmResponse> for ScriptedLlm {
    async fn invoke(&self, input: LlmRequest) -> Result<LlmResponse, DraftwiseError> {
        let system = input.messages[0].content.clone();
        let user = input
            .messages
            .get(1)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let call = if system == PLAN_PROMPT {
            Call::Plan
        } else if system == REFLECTION_PROMPT {
            Call::Reflect
        } else {
            Call::Generate
        };
        if self.fail_on == Some(call) {
            return Err(DraftwiseError::LlmProvider("model unavailable".to_string()));
        }

        let mut requests = self.requests.lock().unwrap();
        requests.push((call, system, user.clone()));
        let n = requests.iter().filter(|(c, _, _)| *c == call).count();
        let content = match call {
            Call::Plan => format!("Outline for: {user}"),
            Call::Generate => format!("Draft #{n}"),
            Call::Reflect => format!("Critique #{n}"),
        };
        Ok(LlmResponse {
            content,
            tool_calls: vec![],
        })
    }
}

/// Returns the same queries every time and records the contexts it saw.
pub struct FixedExtractor {
    pub queries: Vec<String>,
    pub contexts: Mutex<Vec<String>>,
    pub fail: bool,
}

impl FixedExtractor {
    pub fn new(queries: &[&str]) -> Self {
        Self {
            queries: queries.iter().map(|q| q.to_string()).collect(),
            contexts: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }
}

#[async_trait::async_trait]
impl QueryExtractor for FixedExtractor {
    async fn extract_queries(
        &self,
        _system: &str,
        context: &str,
    ) -> Result<QuerySet, DraftwiseError> {
        self.contexts.lock().unwrap().push(context.to_string());
        if self.fail {
            return Err(DraftwiseError::ParseFailed {
                output: "not json".to_string(),
                reason: "expected value".to_string(),
            });
        }
        QuerySet::new(self.queries.clone())
    }
}

/// Returns `max_results` snippets per query, named after the query.
#[derive(Default)]
pub struct FixedSearch {
    pub requests: Mutex<Vec<(String, usize)>>,
    pub empty: bool,
}

impl FixedSearch {
    pub fn empty() -> Self {
        Self {
            empty: true,
            ..Default::default()
        }
    }
}

#[async_trait::async_trait]
impl SearchTool for FixedSearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, DraftwiseError> {
        self.requests
            .lock()
            .unwrap()
            .push((query.to_string(), max_results));
        if self.empty {
            return Ok(vec![]);
        }
        Ok((1..=max_results)
            .map(|i| SearchResult {
                content: format!("{query} result {i}"),
                ..Default::default()
            })
            .collect())
    }
}

pub struct Fixture {
    pub llm: Arc<ScriptedLlm>,
    pub extractor: Arc<FixedExtractor>,
    pub search: Arc<FixedSearch>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with(
            ScriptedLlm::default(),
            FixedExtractor::new(&["q1", "q2", "q3"]),
            FixedSearch::default(),
        )
    }

    pub fn with(llm: ScriptedLlm, extractor: FixedExtractor, search: FixedSearch) -> Self {
        Self {
            llm: Arc::new(llm),
            extractor: Arc::new(extractor),
            search: Arc::new(search),
        }
    }

    pub fn builder(&self) -> draftwise_writer::EssayWriterBuilder {
        EssayWriter::builder()
            .llm(self.llm.clone())
            .query_extractor(self.extractor.clone())
            .search(self.search.clone())
            .research_config(ResearchConfig::default())
    }

    pub fn writer(&self) -> EssayWriter {
        self.builder().build().unwrap()
    }
}
