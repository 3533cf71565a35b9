pub mod context;
pub mod gateway;
pub mod loop_;
pub mod progress;
pub mod registry;

pub use context::PromptBuilder;
pub use gateway::{LlmGateway, ModelGateway};
pub use loop_::{AgentLoop, ConversationState, RunOutcome};
pub use progress::{ChannelSink, ConsoleSink, LoopEvent, NullSink, ProgressSink};
pub use registry::ToolRegistry;
