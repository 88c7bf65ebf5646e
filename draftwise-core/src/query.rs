use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::DraftwiseError;

/// Upper bound on the number of search queries produced per research step.
pub const MAX_QUERIES: usize = 3;

/// Wire shape requested from the model when extracting queries.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq, JsonSchema)]
pub struct Queries {
    /// Search queries, at most three.
    pub queries: Vec<String>,
}

/// What [`QuerySet::truncate`] dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Truncation {
    /// Queries that were empty or whitespace only.
    pub blank: usize,
    /// Non-blank queries past [`MAX_QUERIES`].
    pub over_limit: usize,
}

impl Truncation {
    pub fn dropped(&self) -> usize {
        self.blank + self.over_limit
    }
}

/// An ordered set of at most [`MAX_QUERIES`] search queries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuerySet(Vec<String>);

impl QuerySet {
    /// Fails if more than [`MAX_QUERIES`] queries are supplied.
    pub fn new(queries: Vec<String>) -> Result<Self, DraftwiseError> {
        if queries.len() > MAX_QUERIES {
            return Err(DraftwiseError::ParseFailed {
                output: format!("{queries:?}"),
                reason: format!("expected at most {MAX_QUERIES} queries, got {}", queries.len()),
            });
        }
        Ok(Self(queries))
    }

    /// Keeps the first [`MAX_QUERIES`] non-blank queries.
    pub fn truncated(queries: Vec<String>) -> Self {
        Self::truncate(queries).0
    }

    /// Like [`QuerySet::truncated`], also reporting what was dropped.
    pub fn truncate(queries: Vec<String>) -> (Self, Truncation) {
        let mut kept = Vec::with_capacity(MAX_QUERIES);
        let mut report = Truncation::default();
        for query in queries {
            let query = query.trim();
            if query.is_empty() {
                report.blank += 1;
            } else if kept.len() < MAX_QUERIES {
                kept.push(query.to_string());
            } else {
                report.over_limit += 1;
            }
        }
        (Self(kept), report)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl<'a> IntoIterator for &'a QuerySet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The structured-extraction capability.
#[async_trait]
pub trait QueryExtractor: Send + Sync {
    async fn extract_queries(&self, system: &str, context: &str)
        -> Result<QuerySet, DraftwiseError>;
}
