mod common;

use common::{state, Inc};
use draftwise_graph::{ExecutionConfig, ExecutionOptions, GraphBuilder, GraphError};

#[tokio::test]
async fn graph_enforces_max_steps() {
    let graph = GraphBuilder::new()
        .add_node("inc", Inc::new("inc"))
        .add_edge("inc", "inc")
        .set_entry("inc")
        .build()
        .unwrap();

    let options = ExecutionOptions {
        max_steps: Some(2),
        ..Default::default()
    };
    let err = graph
        .invoke_with_options(state(0), options)
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::MaxStepsExceeded { max: 2, reached: 2 }));
}

#[tokio::test]
async fn default_config_bounds_runaway_loops() {
    let graph = GraphBuilder::new()
        .with_default_config(ExecutionConfig { max_steps: Some(5) })
        .add_node("inc", Inc::new("inc"))
        .add_edge("inc", "inc")
        .set_entry("inc")
        .build()
        .unwrap();

    let err = graph.invoke(state(0)).await.unwrap_err();
    assert!(err.to_string().contains("Max steps exceeded"));
}

#[tokio::test]
async fn options_override_defaults() {
    let graph = GraphBuilder::new()
        .with_default_config(ExecutionConfig { max_steps: Some(1) })
        .add_node("one", Inc::new("one"))
        .add_node("two", Inc::new("two"))
        .add_edge("one", "two")
        .add_edge("two", draftwise_graph::END)
        .set_entry("one")
        .build()
        .unwrap();

    let options = ExecutionOptions {
        max_steps: Some(5),
        ..Default::default()
    };
    let out = graph.invoke_with_options(state(0), options).await.unwrap();
    assert_eq!(out.data.count, 2);
}
