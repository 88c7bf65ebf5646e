use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeKind {
    Direct,
    /// One possible target of a conditional edge.
    Conditional,
}

/// Static shape of a built graph, for introspection and validation.
#[derive(Debug, Clone)]
pub struct GraphProgram {
    graph: DiGraph<String, EdgeKind>,
    name_to_index: HashMap<String, NodeIndex>,
}

impl GraphProgram {
    pub(crate) fn new<'a>(
        nodes: impl IntoIterator<Item = &'a str>,
        edges: impl IntoIterator<Item = (&'a str, &'a str, EdgeKind)>,
    ) -> Self {
        let mut graph = DiGraph::new();
        let mut name_to_index = HashMap::new();
        for name in nodes {
            let index = graph.add_node(name.to_string());
            name_to_index.insert(name.to_string(), index);
        }
        for (from, to, kind) in edges {
            let source = *name_to_index
                .entry(from.to_string())
                .or_insert_with(|| graph.add_node(from.to_string()));
            let target = *name_to_index
                .entry(to.to_string())
                .or_insert_with(|| graph.add_node(to.to_string()));
            graph.add_edge(source, target, kind);
        }
        Self {
            graph,
            name_to_index,
        }
    }

    pub fn node_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.name_to_index.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn edges(&self) -> Vec<(String, String, EdgeKind)> {
        self.graph
            .edge_references()
            .filter_map(|edge| {
                let from = self.graph.node_weight(edge.source())?;
                let to = self.graph.node_weight(edge.target())?;
                Some((from.clone(), to.clone(), *edge.weight()))
            })
            .collect()
    }

    /// Nodes that no path from `entry` can reach.
    pub fn unreachable_from(&self, entry: &str) -> Vec<String> {
        let Some(&start) = self.name_to_index.get(entry) else {
            return self.node_names();
        };
        let mut seen = vec![false; self.graph.node_count()];
        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(index) = dfs.next(&self.graph) {
            seen[index.index()] = true;
        }
        let mut unreachable: Vec<String> = self
            .graph
            .node_indices()
            .filter(|index| !seen[index.index()])
            .filter_map(|index| self.graph.node_weight(index).cloned())
            .collect();
        unreachable.sort();
        unreachable
    }
}
