use crate::config::{Config, PriceSourceKind};
use crate::tools::extract_string_arg;
use crate::traits::Tool;
use anyhow::anyhow;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

#[async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &str;

    async fn quote(&self, ticker: &str) -> anyhow::Result<f64>;
}

/// Quotes the same price for every ticker.
pub struct FixedPriceSource {
    price: f64,
}

impl FixedPriceSource {
    pub fn new(price: f64) -> Self {
        Self { price }
    }
}

#[async_trait]
impl PriceSource for FixedPriceSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn quote(&self, _ticker: &str) -> anyhow::Result<f64> {
        Ok(self.price)
    }
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: Option<String>,
}

pub struct AlphaVantagePriceSource {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AlphaVantagePriceSource {
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key: api_key.into(),
            base_url: "https://www.alphavantage.co".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl PriceSource for AlphaVantagePriceSource {
    fn name(&self) -> &str {
        "alphavantage"
    }

    async fn quote(&self, ticker: &str) -> anyhow::Result<f64> {
        let response = self
            .client
            .get(format!("{}/query", self.base_url.trim_end_matches('/')))
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", ticker),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: GlobalQuoteResponse = response.json().await?;

        if let Some(message) = body.error_message.or(body.note) {
            return Err(anyhow!(message));
        }

        let price = body
            .global_quote
            .and_then(|q| q.price)
            .ok_or_else(|| anyhow!("no quote returned for {}", ticker))?;

        price
            .trim()
            .parse::<f64>()
            .map_err(|e| anyhow!("invalid price '{}': {}", price, e))
    }
}

pub struct StockPriceTool {
    source: Arc<dyn PriceSource>,
}

impl StockPriceTool {
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self { source }
    }

    pub fn from_config(config: &Config) -> Self {
        let source: Arc<dyn PriceSource> = match config.stock.source {
            PriceSourceKind::Mock => Arc::new(FixedPriceSource::new(config.stock.mock_price)),
            PriceSourceKind::AlphaVantage => Arc::new(
                AlphaVantagePriceSource::new(&config.credentials.financial_data_api_key)
                    .with_base_url(&config.stock.base_url),
            ),
        };
        Self::new(source)
    }
}

#[async_trait]
impl Tool for StockPriceTool {
    fn name(&self) -> &str {
        "get_live_stock_price"
    }

    fn description(&self) -> &str {
        "Fetches the latest stock price for a given ticker symbol."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "ticker": {
                    "type": "string",
                    "description": "Stock ticker symbol, e.g. AAPL"
                }
            },
            "required": ["ticker"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> String {
        let ticker = match extract_string_arg(&args, "ticker") {
            Ok(ticker) => ticker.trim().to_string(),
            Err(message) => return message,
        };
        if ticker.is_empty() {
            return "Error: ticker must not be empty.".to_string();
        }

        debug!(ticker = %ticker, source = self.source.name(), "fetching stock price");

        match self.source.quote(&ticker).await {
            Ok(price) => format!("{}: ${:.2}", ticker, price),
            Err(e) => format!("Error fetching price for {}: {}", ticker, e),
        }
    }
}
