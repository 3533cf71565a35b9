use crate::traits::{Message, ToolCall, ToolSpec};
use async_trait::async_trait;

#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub system_prompt: Option<&'a str>,
    pub messages: &'a [Message],
    pub tools: Option<&'a [ToolSpec]>,
    pub model: &'a str,
    pub temperature: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

/// A chat-completions backend. Implementations translate the conversation to
/// their wire format and return the raw model turn.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<ChatResponse>;
}
