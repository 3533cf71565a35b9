pub mod message;
pub mod provider;
pub mod tool;

pub use message::{AssistantMessage, Message, Route, ToolCall};
pub use provider::{ChatRequest, ChatResponse, Provider};
pub use tool::{Tool, ToolSpec};
