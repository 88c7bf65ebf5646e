/// How many search results each research step requests per query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResearchConfig {
    pub plan_results_per_query: usize,
    pub critique_results_per_query: usize,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            plan_results_per_query: 1,
            critique_results_per_query: 2,
        }
    }
}
