mod common;

use std::sync::Arc;

use common::{below, state, DemoState, Inc, Route};
use draftwise_graph::{Checkpointer, ExecutionOptions, GraphBuilder, InMemoryCheckpointer, END};

#[tokio::test]
async fn concurrent_runs_do_not_share_state() {
    let checkpointer = InMemoryCheckpointer::<DemoState>::default();
    let graph = GraphBuilder::new()
        .add_node("inc", Inc::new("inc"))
        .add_conditional_edges("inc", below(5), [(Route::Again, "inc"), (Route::Stop, END)])
        .set_entry("inc")
        .with_checkpointer(Arc::new(checkpointer.clone()), "default")
        .build()
        .unwrap();

    let run = |thread: &str, start: i32| {
        graph.invoke_with_options(
            state(start),
            ExecutionOptions {
                thread_id: Some(thread.to_string()),
                ..Default::default()
            },
        )
    };
    let (a, b) = tokio::join!(run("a", 0), run("b", 3));

    let a = a.unwrap();
    let b = b.unwrap();
    assert_eq!(a.data.log.len(), 5);
    assert_eq!(b.data.log.len(), 2);
    assert_eq!(checkpointer.load("a").await.unwrap().unwrap().step, 5);
    assert_eq!(checkpointer.load("b").await.unwrap().unwrap().step, 2);
}
