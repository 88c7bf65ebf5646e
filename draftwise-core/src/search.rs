use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::DraftwiseError;

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// The web-search capability. An empty result list is a valid answer.
#[async_trait]
pub trait SearchTool: Send + Sync {
    async fn search(&self, query: &str, max_results: usize)
        -> Result<Vec<SearchResult>, DraftwiseError>;
}
