use std::time::Duration;

use async_trait::async_trait;
use draftwise_core::{DraftwiseError, SearchResult, SearchTool};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.tavily.com";
const TOOL_NAME: &str = "tavily_search";

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug)]
pub struct TavilyBuilder {
    base_url: String,
    api_key: Option<SecretString>,
    timeout: Duration,
}

impl Default for TavilyBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TavilyBuilder {
    pub fn base_url(mut self, base_url: &str) -> Result<Self, DraftwiseError> {
        let parsed = Url::parse(base_url)
            .map_err(|err| DraftwiseError::InvalidConfig(format!("base url: {err}")))?;
        self.base_url = parsed.to_string();
        Ok(self)
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::new(api_key.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<TavilyClient, DraftwiseError> {
        let api_key = self
            .api_key
            .ok_or_else(|| DraftwiseError::InvalidConfig("tavily api key is required".to_string()))?;
        let http = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|err| tool_error(err.to_string()))?;
        Ok(TavilyClient {
            http,
            endpoint: format!("{}/search", self.base_url.trim_end_matches('/')),
            api_key,
        })
    }
}

/// Web search through the Tavily API.
#[derive(Clone)]
pub struct TavilyClient {
    http: Client,
    endpoint: String,
    api_key: SecretString,
}

impl TavilyClient {
    pub fn builder() -> TavilyBuilder {
        TavilyBuilder::default()
    }

    pub fn new(api_key: impl Into<String>) -> Result<Self, DraftwiseError> {
        Self::builder().api_key(api_key).build()
    }
}

fn tool_error(reason: String) -> DraftwiseError {
    DraftwiseError::ToolCallFailed {
        tool_name: TOOL_NAME.to_string(),
        reason,
    }
}

#[async_trait]
impl SearchTool for TavilyClient {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, DraftwiseError> {
        let request = SearchRequest {
            api_key: self.api_key.expose_secret(),
            query,
            max_results,
        };
        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(query, error = %err, "search request failed");
                tool_error(err.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(query, %status, "search rejected");
            return Err(tool_error(format!("{status}: {body}")));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|err| tool_error(err.to_string()))?;
        tracing::debug!(query, results = body.results.len(), "search complete");
        Ok(body.results)
    }
}
