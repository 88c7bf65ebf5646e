use std::time::Duration;

use draftwise_core::DraftwiseError;

#[test]
fn error_display_for_llm_provider() {
    let err = DraftwiseError::LlmProvider("rate limited".to_string());
    assert_eq!(format!("{err}"), "LLM provider failed: rate limited");
}

#[test]
fn error_display_for_tool_call_failed() {
    let err = DraftwiseError::ToolCallFailed {
        tool_name: "tavily".to_string(),
        reason: "timeout".to_string(),
    };
    assert_eq!(format!("{err}"), "Tool call failed for 'tavily': timeout");
}

#[test]
fn error_display_for_parse_failed() {
    let err = DraftwiseError::ParseFailed {
        output: "<html>".to_string(),
        reason: "unexpected token".to_string(),
    };
    assert_eq!(
        format!("{err}"),
        "Parsing failed on output '<html>': unexpected token"
    );
}

#[test]
fn error_display_for_timeout() {
    let err = DraftwiseError::Timeout(Duration::from_secs(5));
    assert_eq!(format!("{err}"), "Operation timed out after 5s");
}

#[test]
fn error_display_for_invalid_config() {
    let err = DraftwiseError::InvalidConfig("max_revisions must be at least 1".to_string());
    assert_eq!(
        format!("{err}"),
        "Invalid configuration: max_revisions must be at least 1"
    );
}

#[test]
fn serde_errors_convert() {
    let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: DraftwiseError = parse.into();
    assert!(matches!(err, DraftwiseError::Serde(_)));
}
