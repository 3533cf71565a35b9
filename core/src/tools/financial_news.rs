use crate::config::NewsConfig;
use crate::tools::extract_string_arg;
use crate::traits::Tool;
use anyhow::Context;
use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::json;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub struct FinancialNewsTool {
    client: reqwest::Client,
    config: NewsConfig,
}

impl FinancialNewsTool {
    /// The overall deadline for a search is the registry's tool timeout.
    pub fn new(config: NewsConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build news HTTP client")?;

        Ok(Self { client, config })
    }

    async fn fetch_page(&self, topic: &str) -> anyhow::Result<String> {
        let query = format!("financial news {}", topic);
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[("q", query.as_str()), ("tbm", "nws")])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }
}

/// Collects the trimmed, non-empty text of up to `limit` elements matching
/// `selector`.
fn extract_headlines(html: &str, selector: &str, limit: usize) -> anyhow::Result<Vec<String>> {
    let selector = Selector::parse(selector)
        .map_err(|e| anyhow::anyhow!("Invalid CSS selector '{}': {:?}", selector, e))?;
    let document = Html::parse_document(html);

    let headlines = document
        .select(&selector)
        .map(|el| {
            el.text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| !text.is_empty())
        .take(limit)
        .collect();

    Ok(headlines)
}

#[async_trait]
impl Tool for FinancialNewsTool {
    fn name(&self) -> &str {
        "get_financial_news"
    }

    fn description(&self) -> &str {
        "Searches for recent financial news about a specific topic or company."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "topic": {
                    "type": "string",
                    "description": "Company name, ticker or market topic to search news for"
                }
            },
            "required": ["topic"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> String {
        let topic = match extract_string_arg(&args, "topic") {
            Ok(topic) => topic,
            Err(message) => return message,
        };

        debug!(topic = %topic, "searching financial news");

        let html = match self.fetch_page(&topic).await {
            Ok(html) => html,
            Err(e) => return format!("Error fetching news: {}", e),
        };

        match extract_headlines(&html, &self.config.selector, self.config.max_headlines) {
            Ok(headlines) if headlines.is_empty() => {
                format!("No recent news found for {}.", topic)
            }
            Ok(headlines) => format!("Recent News Headlines:\n- {}", headlines.join("\n- ")),
            Err(e) => format!("Error fetching news: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn headline(text: &str) -> String {
        format!("<div class=\"BNeawe vvjwJb AP7Wnd\">{}</div>", text)
    }

    fn tool_for(server: &MockServer) -> FinancialNewsTool {
        FinancialNewsTool::new(NewsConfig {
            base_url: format!("{}/search", server.uri()),
            ..NewsConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn no_results_yields_exact_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "financial news zzz_no_such_topic_zzz"))
            .and(query_param("tbm", "nws"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
            .mount(&server)
            .await;

        let out = tool_for(&server)
            .execute(json!({"topic": "zzz_no_such_topic_zzz"}))
            .await;
        assert_eq!(out, "No recent news found for zzz_no_such_topic_zzz.");
    }

    #[tokio::test]
    async fn at_most_five_headlines_are_listed() {
        let body: String = (1..=7).map(|i| headline(&format!("Story {}", i))).collect();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let out = tool_for(&server).execute(json!({"topic": "Tesla"})).await;
        assert_eq!(
            out,
            "Recent News Headlines:\n- Story 1\n- Story 2\n- Story 3\n- Story 4\n- Story 5"
        );
    }

    #[tokio::test]
    async fn http_error_becomes_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let out = tool_for(&server).execute(json!({"topic": "Tesla"})).await;
        assert!(out.starts_with("Error fetching news:"), "{}", out);
    }

    #[tokio::test]
    async fn unreachable_backend_becomes_text() {
        let tool = FinancialNewsTool::new(NewsConfig {
            base_url: "http://127.0.0.1:1/search".to_string(),
            ..NewsConfig::default()
        })
        .unwrap();
        let out = tool.execute(json!({"topic": "Tesla"})).await;
        assert!(out.starts_with("Error fetching news:"), "{}", out);
    }

    #[tokio::test]
    async fn requests_carry_browser_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string(headline("Oil climbs")))
            .mount(&server)
            .await;

        let out = tool_for(&server).execute(json!({"topic": "oil"})).await;
        assert_eq!(out, "Recent News Headlines:\n- Oil climbs");
    }

    #[test]
    fn headline_text_is_whitespace_normalised() {
        let html = format!(
            "{}{}",
            headline("  Markets <b>rally</b>\n on rate cut "),
            headline("   ")
        );
        let headlines = extract_headlines(&html, "div.BNeawe.vvjwJb.AP7Wnd", 5).unwrap();
        assert_eq!(headlines, vec!["Markets rally on rate cut"]);
    }

    #[test]
    fn invalid_selector_is_an_error() {
        assert!(extract_headlines("<p></p>", "div[", 5).is_err());
    }
}
