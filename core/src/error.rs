use thiserror::Error;

/// Failures that can end a run or prevent one from starting.
///
/// Tool execution problems are deliberately absent: tools report failures as
/// ordinary result text so the model can react to them.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("{0}")]
    Configuration(String),

    #[error("Model access failed: {0}")]
    ModelAccess(String),

    #[error("Tool '{0}' not found")]
    UnknownTool(String),

    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("Max iterations reached ({0}) without a final answer")]
    MaxIterations(usize),
}

impl AgentError {
    pub fn model_access(err: impl std::fmt::Display) -> Self {
        Self::ModelAccess(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
