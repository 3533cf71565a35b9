use crate::agent::{AgentLoop, ConsoleSink, LlmGateway};
use crate::config::Config;
use crate::error::{AgentError, Result};
use crate::providers::create_provider;
use crate::tools::default_registry;
use crate::traits::Provider;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Runs one query end to end and renders the transcript.
pub struct Driver {
    agent_loop: AgentLoop,
}

impl Driver {
    pub fn new(agent_loop: AgentLoop) -> Self {
        Self { agent_loop }
    }

    /// Wires the built-in tools, the configured provider and the gateway.
    pub fn from_config(config: &Config) -> Result<Self> {
        let tool_registry = Arc::new(default_registry(config)?);
        let provider: Arc<dyn Provider> = Arc::from(create_provider(config)?);

        let gateway = LlmGateway::new(provider, &config.model, tool_registry.specs())
            .with_temperature(config.temperature)
            .with_timeout(Duration::from_secs(config.model_timeout_secs));

        info!(
            provider = %config.provider,
            model = %config.model,
            tools = tool_registry.len(),
            "agent initialised"
        );

        let agent_loop = AgentLoop::new(Arc::new(gateway), tool_registry)
            .with_max_iterations(config.max_iterations);

        Ok(Self::new(agent_loop))
    }

    /// Writes the banner, one block per loop step and the final response to
    /// `out`, then returns the final answer.
    pub async fn run<W: Write + Send>(&self, query: &str, out: &mut W) -> Result<String> {
        let banner = writeln!(
            out,
            "🚀 Initializing Arthakar Agent for your query: \"{}\"",
            query
        )
        .and_then(|_| writeln!(out, "\n...Processing your request. This may take a moment...\n"));
        if let Err(e) = banner {
            warn!("Failed to write progress output: {}", e);
        }

        let mut sink = ConsoleSink::new(out);
        self.agent_loop.process(query, &mut sink).await
    }
}

/// Joins command-line words into a single query, rejecting blank input.
pub fn join_query<S: AsRef<str>>(words: &[S]) -> Result<String> {
    let query = words
        .iter()
        .map(|w| w.as_ref())
        .collect::<Vec<_>>()
        .join(" ");
    if query.trim().is_empty() {
        return Err(AgentError::Configuration(
            "Usage: arthakar \"<your financial query>\"".to_string(),
        ));
    }
    Ok(query)
}
