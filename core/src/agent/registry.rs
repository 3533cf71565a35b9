use crate::error::AgentError;
use crate::traits::{Tool, ToolSpec};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Name-indexed set of tools. Populated once at startup, then shared behind
/// an `Arc` and never mutated again.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
    timeout: Duration,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<(), AgentError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(AgentError::DuplicateTool(name));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(Arc::from(tool));
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Tool>, AgentError> {
        self.index
            .get(name)
            .map(|&i| self.tools[i].clone())
            .ok_or_else(|| AgentError::UnknownTool(name.to_string()))
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Runs the named tool. Only resolution can fail; a handler that overruns
    /// the timeout is reported as result text like any other tool failure.
    pub async fn invoke(&self, name: &str, args: serde_json::Value) -> Result<String, AgentError> {
        let tool = self.resolve(name)?;
        debug!(tool = name, "invoking tool");

        match tokio::time::timeout(self.timeout, tool.execute(args)).await {
            Ok(output) => Ok(output),
            Err(_) => {
                warn!(tool = name, timeout_secs = self.timeout.as_secs(), "tool timed out");
                Ok(format!(
                    "Error: tool '{}' timed out after {}s.",
                    name,
                    self.timeout.as_secs()
                ))
            }
        }
    }
}
