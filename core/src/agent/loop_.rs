use crate::agent::{LoopEvent, ModelGateway, ProgressSink, ToolRegistry};
use crate::error::{AgentError, Result};
use crate::traits::{Message, Route, ToolCall};
use std::sync::Arc;
use tracing::{debug, info, warn};

const DEFAULT_MAX_ITERATIONS: usize = 20;

/// Conversation history for a single run. Append-only, never shared.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    history: Vec<Message>,
}

impl ConversationState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            history: vec![Message::user(query)],
        }
    }

    pub fn push(&mut self, message: impl Into<Message>) {
        self.history.push(message.into());
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn into_history(self) -> Vec<Message> {
        self.history
    }
}

#[derive(Debug)]
enum LoopState {
    Deciding,
    Acting(Vec<ToolCall>),
    Done(String),
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub answer: String,
    pub history: Vec<Message>,
    /// Number of model calls made.
    pub iterations: usize,
}

pub struct AgentLoop {
    gateway: Arc<dyn ModelGateway>,
    tool_registry: Arc<ToolRegistry>,
    max_iterations: usize,
}

impl AgentLoop {
    pub fn new(gateway: Arc<dyn ModelGateway>, tool_registry: Arc<ToolRegistry>) -> Self {
        Self {
            gateway,
            tool_registry,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Caps the number of model calls per run. Without a cap a model that
    /// keeps requesting tools would never let the run finish.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    pub fn tool_registry(&self) -> &ToolRegistry {
        &self.tool_registry
    }

    pub async fn process(&self, query: &str, sink: &mut dyn ProgressSink) -> Result<String> {
        self.run(query, sink).await.map(|outcome| outcome.answer)
    }

    /// Alternates model decisions and tool dispatch until the model answers
    /// without requesting tools. Gateway errors abort the run; tool problems
    /// are recorded as tool results and the run continues.
    pub async fn run(&self, query: &str, sink: &mut dyn ProgressSink) -> Result<RunOutcome> {
        let mut conversation = ConversationState::new(query);
        let mut state = LoopState::Deciding;
        let mut iterations = 0;

        loop {
            state = match state {
                LoopState::Deciding => {
                    if iterations >= self.max_iterations {
                        warn!(max = self.max_iterations, "iteration limit reached");
                        return Err(AgentError::MaxIterations(self.max_iterations));
                    }
                    iterations += 1;

                    let message = self.gateway.decide(conversation.history()).await?;
                    debug!(
                        iteration = iterations,
                        tool_calls = message.tool_calls.len(),
                        "model turn"
                    );

                    sink.emit(LoopEvent::Agent {
                        text: message.text.clone(),
                        tool_calls: message.tool_calls.iter().map(|c| c.name.clone()).collect(),
                    });

                    let next = match message.route() {
                        Route::Act => LoopState::Acting(message.tool_calls.clone()),
                        Route::Finish => LoopState::Done(message.text.clone()),
                    };
                    conversation.push(message);
                    next
                }
                LoopState::Acting(calls) => {
                    for call in calls {
                        let text = self.dispatch(&call).await;
                        sink.emit(LoopEvent::Action {
                            call_id: call.id.clone(),
                            tool: call.name.clone(),
                            text: text.clone(),
                        });
                        conversation.push(Message::tool_result(call.id, text));
                    }
                    LoopState::Deciding
                }
                LoopState::Done(answer) => {
                    info!(iterations, "run finished");
                    sink.emit(LoopEvent::Final {
                        text: answer.clone(),
                    });
                    return Ok(RunOutcome {
                        answer,
                        history: conversation.into_history(),
                        iterations,
                    });
                }
            };
        }
    }

    async fn dispatch(&self, call: &ToolCall) -> String {
        match self
            .tool_registry
            .invoke(&call.name, call.arguments.clone())
            .await
        {
            Ok(text) => text,
            Err(AgentError::UnknownTool(name)) => {
                warn!(tool = %name, "model requested unregistered tool");
                format!(
                    "Error: tool '{}' not found. Available tools: {}.",
                    name,
                    self.tool_registry.names().join(", ")
                )
            }
            Err(e) => format!("Error: {}", e),
        }
    }
}
