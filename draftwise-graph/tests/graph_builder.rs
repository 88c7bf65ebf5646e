mod common;

use common::{below, state, Inc, Route};
use draftwise_graph::{EdgeKind, GraphBuilder, GraphError, END};

#[tokio::test]
async fn graph_runs_linear_chain_to_end() {
    let graph = GraphBuilder::new()
        .add_node("one", Inc::new("one"))
        .add_node("two", Inc::new("two"))
        .add_edge("one", "two")
        .add_edge("two", END)
        .set_entry("one")
        .build()
        .unwrap();

    let out = graph.invoke(state(0)).await.unwrap();
    assert_eq!(out.data.count, 2);
    assert_eq!(out.data.log, vec!["one", "two"]);
}

#[test]
fn build_requires_entry() {
    let err = GraphBuilder::<common::DemoState>::new()
        .add_node("one", Inc::new("one"))
        .add_edge("one", END)
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, GraphError::MissingEntry));
}

#[test]
fn build_rejects_unknown_entry() {
    let err = GraphBuilder::<common::DemoState>::new()
        .set_entry("missing")
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, GraphError::MissingNode { node } if node == "missing"));
}

#[test]
fn build_rejects_edge_to_unknown_node() {
    let err = GraphBuilder::new()
        .add_node("one", Inc::new("one"))
        .add_edge("one", "nowhere")
        .set_entry("one")
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, GraphError::InvalidEdge { from, to } if from == "one" && to == "nowhere"));
}

#[test]
fn build_rejects_conditional_target_to_unknown_node() {
    let err = GraphBuilder::new()
        .add_node("one", Inc::new("one"))
        .add_conditional_edges("one", below(3), [(Route::Again, "ghost"), (Route::Stop, END)])
        .set_entry("one")
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, GraphError::InvalidEdge { to, .. } if to == "ghost"));
}

#[test]
fn build_rejects_node_without_outgoing_edge() {
    let err = GraphBuilder::new()
        .add_node("one", Inc::new("one"))
        .add_node("two", Inc::new("two"))
        .add_edge("one", "two")
        .set_entry("one")
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, GraphError::UnroutedNode { node } if node == "two"));
}

#[test]
fn program_exposes_nodes_and_edges() {
    let graph = GraphBuilder::new()
        .add_node("one", Inc::new("one"))
        .add_node("two", Inc::new("two"))
        .add_edge("one", "two")
        .add_conditional_edges("two", below(3), [(Route::Again, "one"), (Route::Stop, END)])
        .set_entry("one")
        .build()
        .unwrap();

    let program = graph.program();
    assert_eq!(program.node_names(), vec![END, "one", "two"]);

    let mut edges = program.edges();
    edges.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));
    assert_eq!(
        edges,
        vec![
            ("one".to_string(), "two".to_string(), EdgeKind::Direct),
            ("two".to_string(), END.to_string(), EdgeKind::Conditional),
            ("two".to_string(), "one".to_string(), EdgeKind::Conditional),
        ]
    );
    assert!(program.unreachable_from("one").is_empty());
}

#[test]
fn program_reports_unreachable_nodes() {
    let graph = GraphBuilder::new()
        .add_node("one", Inc::new("one"))
        .add_node("orphan", Inc::new("orphan"))
        .add_edge("one", END)
        .add_edge("orphan", END)
        .set_entry("one")
        .build()
        .unwrap();
    assert_eq!(graph.program().unreachable_from("one"), vec!["orphan"]);
}
