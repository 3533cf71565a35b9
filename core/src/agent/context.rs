use crate::traits::ToolSpec;
use std::fmt::Write;

const IDENTITY: &str = "## Identity

You are Arthakar, a financial research assistant. You answer questions about \
markets, companies and financial documents. Use the available tools to gather \
facts before answering; do not invent prices or headlines.";

const TOOL_GUIDANCE: &str = "Call tools through the function-calling interface. \
You may request several tools in one turn; they run in the order you list them. \
Tool results may describe a failure (for example a missing file or a network \
error). When that happens, work with what you have and tell the user what could \
not be retrieved in your final answer.";

/// Assembles the system prompt sent ahead of the conversation on every model
/// turn.
pub struct PromptBuilder {
    tool_specs: Vec<ToolSpec>,
}

impl PromptBuilder {
    pub fn new(tool_specs: Vec<ToolSpec>) -> Self {
        Self { tool_specs }
    }

    pub fn build(&self) -> String {
        [
            IDENTITY.to_string(),
            self.get_tool_instructions(),
            self.get_runtime_context(),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
    }

    fn get_tool_instructions(&self) -> String {
        if self.tool_specs.is_empty() {
            return String::new();
        }

        let mut instructions = String::new();
        instructions.push_str("## Tools\n\n");
        instructions.push_str(TOOL_GUIDANCE);
        instructions.push_str("\n\n### Available Tools\n\n");

        for tool in &self.tool_specs {
            let _ = writeln!(instructions, "**{}**: {}", tool.name, tool.description);
        }

        instructions
    }

    fn get_runtime_context(&self) -> String {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M (%A)");

        format!("## Runtime Context\n\n### Current Time\n{}", timestamp)
    }
}
