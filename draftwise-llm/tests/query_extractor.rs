use httpmock::prelude::*;
use serde_json::json;

use draftwise_core::{DraftwiseError, QueryExtractor};
use draftwise_llm::{LlmQueryExtractor, OpenAiCompatibleClient};

fn extractor(server: &MockServer) -> LlmQueryExtractor<OpenAiCompatibleClient> {
    let client = OpenAiCompatibleClient::builder()
        .base_url(&server.base_url())
        .expect("url")
        .api_key("test-key")
        .build()
        .expect("client");
    LlmQueryExtractor::new(client).expect("extractor")
}

fn tool_call_reply(arguments: &str) -> serde_json::Value {
    json!({
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "Queries", "arguments": arguments}
                }]
            }
        }]
    })
}

fn content_reply(content: &str) -> serde_json::Value {
    json!({
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    })
}

#[tokio::test]
async fn extracts_queries_from_forced_tool_call() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/chat/completions").json_body_partial(
            r#"{
                "messages": [
                    {"role": "system", "content": "Generate queries."},
                    {"role": "user", "content": "My plan"}
                ],
                "tool_choice": {"type": "function", "function": {"name": "Queries"}}
            }"#,
        );
        then.status(200)
            .json_body(tool_call_reply(r#"{"queries": ["sun facts", "planet sizes"]}"#));
    });

    let queries = extractor(&server)
        .extract_queries("Generate queries.", "My plan")
        .await
        .expect("queries");
    assert_eq!(queries.into_inner(), vec!["sun facts", "planet sizes"]);
    mock.assert();
}

#[tokio::test]
async fn tool_schema_describes_queries_field() {
    let server = MockServer::start();
    let extractor = extractor(&server);
    let tool = extractor.tool();
    assert_eq!(tool.name, "Queries");
    assert_eq!(tool.parameters["type"], "object");
    assert_eq!(tool.parameters["properties"]["queries"]["type"], "array");
    assert_eq!(tool.parameters["properties"]["queries"]["items"]["type"], "string");
}

#[tokio::test]
async fn falls_back_to_json_content() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(200)
            .json_body(content_reply("```json\n{\"queries\": [\"comets\"]}\n```"));
    });

    let queries = extractor(&server)
        .extract_queries("sys", "ctx")
        .await
        .expect("queries");
    assert_eq!(queries.into_inner(), vec!["comets"]);
}

#[tokio::test]
async fn truncates_to_three_queries() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(200)
            .json_body(tool_call_reply(r#"{"queries": ["a", "b", "c", "d", "e"]}"#));
    });

    let queries = extractor(&server)
        .extract_queries("sys", "ctx")
        .await
        .expect("queries");
    assert_eq!(queries.into_inner(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn malformed_output_is_a_parse_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(200).json_body(content_reply("I would search for planets."));
    });

    let err = extractor(&server)
        .extract_queries("sys", "ctx")
        .await
        .unwrap_err();
    assert!(matches!(err, DraftwiseError::ParseFailed { .. }));
}

#[tokio::test]
async fn malformed_output_degrades_when_configured() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(200).json_body(content_reply("I would search for planets."));
    });

    let queries = extractor(&server)
        .degrade_on_parse_failure(true)
        .extract_queries("sys", "ctx")
        .await
        .expect("degraded");
    assert!(queries.is_empty());
}

#[tokio::test]
async fn provider_errors_are_not_degraded() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(500).body("boom");
    });

    let err = extractor(&server)
        .degrade_on_parse_failure(true)
        .extract_queries("sys", "ctx")
        .await
        .unwrap_err();
    assert!(matches!(err, DraftwiseError::LlmProvider(_)));
}
