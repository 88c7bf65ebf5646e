//! Generic OpenAI-compatible chat client.
//!
//! Defaults to Groq, but works with any provider exposing
//! `POST {base_url}/chat/completions` (OpenAI, DeepSeek, Together, ...).

use std::time::Duration;

use async_trait::async_trait;
use draftwise_core::{DraftwiseError, LlmRequest, LlmResponse, Runnable, ToolCall, ToolSpec, Value};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Request body for the chat completions endpoint.
#[derive(Serialize, Debug, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<draftwise_core::Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub stream: bool,
}

#[derive(Serialize, Debug, Clone)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: FunctionDefinition,
}

#[derive(Serialize, Debug, Clone)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Serialize, Debug, Clone)]
pub struct ToolChoice {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: ToolChoiceFunction,
}

#[derive(Serialize, Debug, Clone)]
pub struct ToolChoiceFunction {
    pub name: String,
}

impl From<ToolSpec> for ToolDefinition {
    fn from(spec: ToolSpec) -> Self {
        Self {
            kind: "function",
            function: FunctionDefinition {
                name: spec.name,
                description: spec.description,
                parameters: spec.parameters,
            },
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug, Clone)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize, Debug, Clone)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Deserialize, Debug, Clone)]
struct ResponseToolCall {
    id: String,
    function: ResponseFunction,
}

#[derive(Deserialize, Debug, Clone)]
struct ResponseFunction {
    name: String,
    /// JSON encoded as a string.
    arguments: String,
}

/// OpenAI-style error body.
#[derive(Deserialize, Debug, Clone)]
struct OpenAiError {
    error: ErrorDetail,
}

#[derive(Deserialize, Debug, Clone)]
struct ErrorDetail {
    message: String,
}

#[derive(Debug)]
pub struct OpenAiCompatibleBuilder {
    base_url: String,
    api_key: Option<SecretString>,
    default_model: String,
    temperature: Option<f32>,
    timeout: Duration,
}

impl Default for OpenAiCompatibleBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            default_model: DEFAULT_MODEL.to_string(),
            temperature: Some(0.0),
            timeout: Duration::from_secs(120),
        }
    }
}

impl OpenAiCompatibleBuilder {
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

    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// `None` leaves the provider's default in place.
    pub fn temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<OpenAiCompatibleClient, DraftwiseError> {
        let api_key = self
            .api_key
            .ok_or_else(|| DraftwiseError::InvalidConfig("api key is required".to_string()))?;
        let http = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|err| DraftwiseError::LlmProvider(err.to_string()))?;
        let endpoint = format!(
            "{}/chat/completions",
            self.base_url.trim_end_matches('/')
        );
        Ok(OpenAiCompatibleClient {
            http,
            endpoint,
            api_key,
            default_model: self.default_model,
            temperature: self.temperature,
            timeout: self.timeout,
        })
    }
}

#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    http: Client,
    endpoint: String,
    api_key: SecretString,
    default_model: String,
    temperature: Option<f32>,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiCompatibleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleClient")
            .field("endpoint", &self.endpoint)
            .field("default_model", &self.default_model)
            .finish_non_exhaustive()
    }
}

impl OpenAiCompatibleClient {
    pub fn builder() -> OpenAiCompatibleBuilder {
        OpenAiCompatibleBuilder::default()
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn set_default_model(&mut self, model: impl Into<String>) {
        self.default_model = model.into();
    }

    fn to_wire(&self, request: LlmRequest) -> ChatCompletionRequest {
        let LlmRequest {
            model,
            messages,
            tools,
            tool_choice,
        } = request;
        let model = if model.is_empty() {
            self.default_model.clone()
        } else {
            model
        };
        let tools = if tools.is_empty() {
            None
        } else {
            Some(tools.into_iter().map(ToolDefinition::from).collect())
        };
        ChatCompletionRequest {
            model,
            messages,
            tools,
            tool_choice: tool_choice.map(|name| ToolChoice {
                kind: "function",
                function: ToolChoiceFunction { name },
            }),
            temperature: self.temperature,
            stream: false,
        }
    }

    fn map_send_error(&self, err: reqwest::Error) -> DraftwiseError {
        if err.is_timeout() {
            DraftwiseError::Timeout(self.timeout)
        } else {
            DraftwiseError::LlmProvider(err.to_string())
        }
    }
}

fn parse_tool_call(call: ResponseToolCall) -> Result<ToolCall, DraftwiseError> {
    let args = if call.function.arguments.trim().is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_str(&call.function.arguments).map_err(|err| {
            DraftwiseError::ParseFailed {
                output: call.function.arguments.clone(),
                reason: err.to_string(),
            }
        })?
    };
    Ok(ToolCall {
        id: call.id,
        name: call.function.name,
        args,
    })
}

#[async_trait]
impl Runnable<LlmRequest, LlmResponse> for OpenAiCompatibleClient {
    async fn invoke(&self, input: LlmRequest) -> Result<LlmResponse, DraftwiseError> {
        let request = self.to_wire(input);
        tracing::debug!(model = %request.model, messages = request.messages.len(), "chat completion");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "chat completion request failed");
                self.map_send_error(err)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OpenAiError>(&body)
                .map(|err| err.error.message)
                .unwrap_or(body);
            tracing::warn!(%status, error = %message, "chat completion rejected");
            return Err(DraftwiseError::LlmProvider(format!("{status}: {message}")));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| DraftwiseError::LlmProvider(err.to_string()))?;
        let message = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| DraftwiseError::LlmProvider("response had no choices".to_string()))?;

        let tool_calls = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(parse_tool_call)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LlmResponse {
            content: message.content.unwrap_or_default(),
            tool_calls,
        })
    }
}
