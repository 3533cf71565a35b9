use std::io::Write;
use tokio::sync::mpsc::UnboundedSender;

/// Observable steps of a run, in the order they happen.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopEvent {
    /// The model produced a turn. `tool_calls` names the tools it asked for.
    Agent { text: String, tool_calls: Vec<String> },
    /// A requested tool finished (or failed) and its result was recorded.
    Action {
        call_id: String,
        tool: String,
        text: String,
    },
    Final { text: String },
}

pub trait ProgressSink: Send {
    fn emit(&mut self, event: LoopEvent);
}

pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&mut self, _event: LoopEvent) {}
}

/// Forwards events over a channel. A dropped receiver is ignored.
pub struct ChannelSink(pub UnboundedSender<LoopEvent>);

impl ProgressSink for ChannelSink {
    fn emit(&mut self, event: LoopEvent) {
        let _ = self.0.send(event);
    }
}

/// Renders each event as a labeled text block.
pub struct ConsoleSink<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn block(&mut self, label: &str, body: &str) -> std::io::Result<()> {
        writeln!(self.out, "{}", label)?;
        writeln!(self.out, "{}", body)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write + Send> ProgressSink for ConsoleSink<W> {
    fn emit(&mut self, event: LoopEvent) {
        let result = match event {
            LoopEvent::Agent { text, tool_calls } => {
                let body = if text.trim().is_empty() && !tool_calls.is_empty() {
                    format!("Calling tools: {}", tool_calls.join(", "))
                } else {
                    text
                };
                self.block("--- Thought from agent ---", &body)
            }
            LoopEvent::Action { text, .. } => self.block("--- Thought from action ---", &text),
            LoopEvent::Final { text } => {
                writeln!(self.out, "✅ Final Response from Arthakar:")
                    .and_then(|_| writeln!(self.out))
                    .and_then(|_| writeln!(self.out, "{}", text))
                    .and_then(|_| self.out.flush())
            }
        };

        if let Err(e) = result {
            tracing::warn!("Failed to write progress output: {}", e);
        }
    }
}
