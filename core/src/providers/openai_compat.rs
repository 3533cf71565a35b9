use crate::traits::{ChatRequest, ChatResponse, Message, Provider, ToolCall, ToolSpec};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool<'a>>>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCallRequest<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct WireToolCallRequest<'a> {
    id: &'a str,
    r#type: &'a str,
    function: WireFunctionRequest<'a>,
}

#[derive(Debug, Serialize)]
struct WireFunctionRequest<'a> {
    name: &'a str,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct WireTool<'a> {
    r#type: &'a str,
    function: WireToolFunction<'a>,
}

#[derive(Debug, Serialize)]
struct WireToolFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ResponseToolCall {
    #[serde(default)]
    id: String,
    function: ResponseFunction,
}

#[derive(Debug, Deserialize)]
struct ResponseFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

/// Client for any endpoint speaking the OpenAI chat-completions protocol
/// (Groq, OpenAI, local gateways).
pub struct OpenAICompatProvider {
    name: String,
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAICompatProvider {
    pub fn new(
        name: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            name: name.into(),
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    fn convert_messages<'a>(
        &self,
        system_prompt: Option<&'a str>,
        messages: &'a [Message],
    ) -> Vec<WireMessage<'a>> {
        let system = system_prompt.map(|prompt| WireMessage {
            role: "system",
            content: Some(prompt),
            tool_calls: None,
            tool_call_id: None,
        });

        let history = messages.iter().map(|m| match m {
            Message::User { text } => WireMessage {
                role: "user",
                content: Some(text.as_str()),
                tool_calls: None,
                tool_call_id: None,
            },
            Message::Assistant(message) => {
                let tool_calls: Option<Vec<WireToolCallRequest<'a>>> =
                    (!message.tool_calls.is_empty()).then(|| {
                        message
                            .tool_calls
                            .iter()
                            .map(|tc| WireToolCallRequest {
                                id: &tc.id,
                                r#type: "function",
                                function: WireFunctionRequest {
                                    name: &tc.name,
                                    arguments: tc.arguments.to_string(),
                                },
                            })
                            .collect()
                    });
                let content = if message.text.is_empty() && tool_calls.is_some() {
                    None
                } else {
                    Some(message.text.as_str())
                };

                WireMessage {
                    role: "assistant",
                    content,
                    tool_calls,
                    tool_call_id: None,
                }
            }
            Message::ToolResult { call_id, text } => WireMessage {
                role: "tool",
                content: Some(text.as_str()),
                tool_calls: None,
                tool_call_id: Some(call_id.as_str()),
            },
        });

        system.into_iter().chain(history).collect()
    }

    fn convert_tools<'a>(&self, tools: &'a [ToolSpec]) -> Vec<WireTool<'a>> {
        tools
            .iter()
            .map(|t| WireTool {
                r#type: "function",
                function: WireToolFunction {
                    name: &t.name,
                    description: &t.description,
                    parameters: &t.parameters,
                },
            })
            .collect()
    }
}

/// Models return arguments as a JSON-encoded string. Anything that does not
/// decode is passed through as a plain string so the tool can report it.
fn parse_arguments(raw: &str) -> serde_json::Value {
    if raw.trim().is_empty() {
        return serde_json::Value::Object(Default::default());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

#[async_trait]
impl Provider for OpenAICompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
        let body = CompletionRequest {
            model: request.model,
            messages: self.convert_messages(request.system_prompt, request.messages),
            tools: request.tools.map(|t| self.convert_tools(t)),
            temperature: request.temperature,
        };

        debug!(provider = %self.name, model = request.model, "sending chat completion");

        let response = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.base_url.trim_end_matches('/')
            ))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "{} API error {}: {}",
                self.name,
                status,
                error_text
            ));
        }

        let completion: CompletionResponse = response.json().await?;

        let message = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No choices in response"))?
            .message;

        let tool_calls = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|c| ToolCall {
                id: c.id,
                arguments: parse_arguments(&c.function.arguments),
                name: c.function.name,
            })
            .collect();

        Ok(ChatResponse {
            text: message.content,
            tool_calls,
        })
    }
}
