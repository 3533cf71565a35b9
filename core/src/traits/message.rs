use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// What the loop should do after a model turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Act,
    Finish,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl AssistantMessage {
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_calls: vec![],
        }
    }

    pub fn with_tool_calls(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            text: text.into(),
            tool_calls,
        }
    }

    pub fn route(&self) -> Route {
        if self.tool_calls.is_empty() {
            Route::Finish
        } else {
            Route::Act
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    User { text: String },
    Assistant(AssistantMessage),
    ToolResult { call_id: String, text: String },
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::User { text: text.into() }
    }

    pub fn tool_result(call_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::ToolResult {
            call_id: call_id.into(),
            text: text.into(),
        }
    }
}

impl From<AssistantMessage> for Message {
    fn from(message: AssistantMessage) -> Self {
        Self::Assistant(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn route_depends_only_on_tool_calls() {
        assert_eq!(AssistantMessage::answer("done").route(), Route::Finish);
        assert_eq!(AssistantMessage::answer("").route(), Route::Finish);

        let call = ToolCall::new("call_1", "get_live_stock_price", json!({"ticker": "AAPL"}));
        let message = AssistantMessage::with_tool_calls("", vec![call]);
        assert_eq!(message.route(), Route::Act);
    }

    #[test]
    fn message_serializes_with_role_tag() {
        let value = serde_json::to_value(Message::tool_result("call_1", "ok")).unwrap();
        assert_eq!(value["role"], "tool_result");
        assert_eq!(value["call_id"], "call_1");

        let value = serde_json::to_value(Message::from(AssistantMessage::answer("hi"))).unwrap();
        assert_eq!(value["role"], "assistant");
        assert!(value.get("tool_calls").is_none());
    }
}
