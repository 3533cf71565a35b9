pub mod agent;
pub mod config;
pub mod driver;
pub mod error;
pub mod providers;
pub mod tools;
pub mod traits;

pub use agent::{AgentLoop, LlmGateway, ModelGateway, ToolRegistry};
pub use config::Config;
pub use driver::{Driver, join_query};
pub use error::AgentError;
pub use traits::*;
