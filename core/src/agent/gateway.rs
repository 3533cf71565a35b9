use crate::agent::PromptBuilder;
use crate::error::AgentError;
use crate::traits::{AssistantMessage, ChatRequest, Message, Provider, ToolCall, ToolSpec};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Turns the conversation so far into the model's next move.
///
/// An empty `tool_calls` on the returned message means the text is the final
/// answer. Errors are fatal to the run.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn decide(&self, history: &[Message]) -> Result<AssistantMessage, AgentError>;
}

pub struct LlmGateway {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f64,
    tool_specs: Vec<ToolSpec>,
    system_prompt: String,
    timeout: Duration,
}

impl LlmGateway {
    /// `tool_specs` is the declared tool set; the model is never shown
    /// anything else.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        tool_specs: Vec<ToolSpec>,
    ) -> Self {
        let system_prompt = PromptBuilder::new(tool_specs.clone()).build();
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
            tool_specs,
            system_prompt,
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

/// Gives every call an id that is non-empty and unique within the message.
fn assign_call_ids(calls: Vec<ToolCall>) -> Vec<ToolCall> {
    let mut seen = HashSet::new();
    calls
        .into_iter()
        .map(|mut call| {
            if call.id.trim().is_empty() || !seen.insert(call.id.clone()) {
                call.id = format!("call_{}", uuid::Uuid::new_v4().simple());
                seen.insert(call.id.clone());
            }
            call
        })
        .collect()
}

#[async_trait]
impl ModelGateway for LlmGateway {
    async fn decide(&self, history: &[Message]) -> Result<AssistantMessage, AgentError> {
        let request = ChatRequest {
            system_prompt: Some(self.system_prompt.as_str()),
            messages: history,
            tools: if self.tool_specs.is_empty() {
                None
            } else {
                Some(self.tool_specs.as_slice())
            },
            model: &self.model,
            temperature: self.temperature,
        };

        debug!(
            provider = self.provider.name(),
            model = %self.model,
            messages = history.len(),
            "requesting model decision"
        );

        let response = tokio::time::timeout(self.timeout, self.provider.chat(request))
            .await
            .map_err(|_| {
                AgentError::ModelAccess(format!(
                    "no response from {} within {}s",
                    self.provider.name(),
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| AgentError::model_access(format!("{:#}", e)))?;

        Ok(AssistantMessage::with_tool_calls(
            response.text.unwrap_or_default(),
            assign_call_ids(response.tool_calls),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{ChatResponse, Route};
    use serde_json::json;
    use std::sync::Mutex;

    struct CannedProvider {
        response: Mutex<Option<anyhow::Result<ChatResponse>>>,
        seen_tools: Mutex<Vec<String>>,
        seen_prompt: Mutex<Option<String>>,
    }

    impl CannedProvider {
        fn new(response: anyhow::Result<ChatResponse>) -> Self {
            Self {
                response: Mutex::new(Some(response)),
                seen_tools: Mutex::new(vec![]),
                seen_prompt: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl Provider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }

        async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
            *self.seen_tools.lock().unwrap() = request
                .tools
                .unwrap_or_default()
                .iter()
                .map(|t| t.name.clone())
                .collect();
            *self.seen_prompt.lock().unwrap() = request.system_prompt.map(str::to_string);
            self.response.lock().unwrap().take().unwrap()
        }
    }

    struct StalledProvider;

    #[async_trait]
    impl Provider for StalledProvider {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn chat(&self, _request: ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok(ChatResponse::default())
        }
    }

    fn spec(name: &str) -> ToolSpec {
        ToolSpec {
            name: name.to_string(),
            description: String::new(),
            parameters: json!({"type": "object"}),
        }
    }

    #[tokio::test]
    async fn text_only_response_is_final_answer() {
        let provider = Arc::new(CannedProvider::new(Ok(ChatResponse {
            text: Some("AAPL looks fine.".into()),
            tool_calls: vec![],
        })));
        let gateway = LlmGateway::new(provider, "test-model", vec![]);

        let message = gateway.decide(&[Message::user("hi")]).await.unwrap();
        assert_eq!(message, AssistantMessage::answer("AAPL looks fine."));
    }

    #[tokio::test]
    async fn declared_tools_and_prompt_are_sent() {
        let provider = Arc::new(CannedProvider::new(Ok(ChatResponse {
            text: Some("ok".into()),
            tool_calls: vec![],
        })));
        let gateway = LlmGateway::new(
            provider.clone(),
            "test-model",
            vec![spec("get_live_stock_price"), spec("get_financial_news")],
        );

        gateway.decide(&[Message::user("hi")]).await.unwrap();
        assert_eq!(
            *provider.seen_tools.lock().unwrap(),
            vec!["get_live_stock_price", "get_financial_news"]
        );
        assert_eq!(
            provider.seen_prompt.lock().unwrap().as_deref(),
            Some(gateway.system_prompt())
        );
    }

    #[tokio::test]
    async fn missing_and_duplicate_ids_are_replaced() {
        let provider = Arc::new(CannedProvider::new(Ok(ChatResponse {
            text: None,
            tool_calls: vec![
                ToolCall::new("call_a", "get_live_stock_price", json!({"ticker": "A"})),
                ToolCall::new("call_a", "get_live_stock_price", json!({"ticker": "B"})),
                ToolCall::new("", "get_financial_news", json!({"topic": "C"})),
            ],
        })));
        let gateway = LlmGateway::new(provider, "test-model", vec![]);

        let message = gateway.decide(&[Message::user("hi")]).await.unwrap();
        let ids: Vec<_> = message.tool_calls.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids[0], "call_a");
        assert!(ids[1].starts_with("call_") && ids[1] != "call_a");
        assert!(ids[2].starts_with("call_") && ids[2] != ids[1]);
        assert_eq!(message.text, "");
    }

    #[tokio::test]
    async fn provider_error_is_model_access() {
        let provider = Arc::new(CannedProvider::new(Err(anyhow::anyhow!("401 Unauthorized"))));
        let gateway = LlmGateway::new(provider, "test-model", vec![]);

        let err = gateway.decide(&[Message::user("hi")]).await.unwrap_err();
        assert!(matches!(err, AgentError::ModelAccess(ref m) if m.contains("401")));
    }

    #[tokio::test]
    async fn blank_reply_is_returned_verbatim_as_answer() {
        for text in [Some(""), Some("  "), Some("\n"), None] {
            let provider = Arc::new(CannedProvider::new(Ok(ChatResponse {
                text: text.map(str::to_string),
                tool_calls: vec![],
            })));
            let gateway = LlmGateway::new(provider, "test-model", vec![]);

            let message = gateway.decide(&[Message::user("hi")]).await.unwrap();
            assert_eq!(message, AssistantMessage::answer(text.unwrap_or_default()));
            assert_eq!(message.route(), Route::Finish);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_model_times_out() {
        let gateway = LlmGateway::new(Arc::new(StalledProvider), "test-model", vec![])
            .with_timeout(Duration::from_secs(5));

        let err = gateway.decide(&[Message::user("hi")]).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Model access failed: no response from stalled within 5s"
        );
    }
}
