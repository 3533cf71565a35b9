use crate::agent::ToolRegistry;
use crate::config::Config;
use crate::error::AgentError;
use serde_json::Value;
use std::time::Duration;

pub mod financial_news;
pub mod parse_document;
pub mod stock_price;

pub use financial_news::FinancialNewsTool;
pub use parse_document::ParseDocumentTool;
pub use stock_price::{AlphaVantagePriceSource, FixedPriceSource, PriceSource, StockPriceTool};

/// Pulls a required string parameter, rendering the failure as the text the
/// model will see.
pub fn extract_string_arg(args: &Value, key: &str) -> Result<String, String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| format!("Error: missing required string argument '{}'.", key))
}

/// Registers the three built-in tools configured from `config`.
pub fn default_registry(config: &Config) -> Result<ToolRegistry, AgentError> {
    let mut registry =
        ToolRegistry::new().with_timeout(Duration::from_secs(config.tool_timeout_secs));

    registry.register(Box::new(StockPriceTool::from_config(config)))?;
    let news = FinancialNewsTool::new(config.news.clone())
        .map_err(|e| AgentError::Configuration(format!("{:#}", e)))?;
    registry.register(Box::new(news))?;
    registry.register(Box::new(ParseDocumentTool::new(
        config.document.summary_chars,
    )))?;

    Ok(registry)
}
