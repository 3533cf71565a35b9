use crate::config::Config;
use crate::error::AgentError;
use crate::providers::OpenAICompatProvider;
use crate::traits::Provider;

const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub fn create_provider(config: &Config) -> Result<Box<dyn Provider>, AgentError> {
    let provider_name = config.provider.to_lowercase();

    let default_base_url = match provider_name.as_str() {
        "groq" => GROQ_BASE_URL,
        "openai" => OPENAI_BASE_URL,
        _ => {
            return Err(AgentError::Configuration(format!(
                "Unknown provider: {}. Available: groq, openai",
                config.provider
            )));
        }
    };

    let base_url = config
        .base_url
        .clone()
        .unwrap_or_else(|| default_base_url.to_string());

    Ok(Box::new(OpenAICompatProvider::new(
        provider_name,
        &config.credentials.llm_api_key,
        base_url,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groq_is_the_default() {
        let provider = create_provider(&Config::default()).unwrap();
        assert_eq!(provider.name(), "groq");
    }

    #[test]
    fn provider_name_is_case_insensitive() {
        let config = Config {
            provider: "OpenAI".into(),
            ..Config::default()
        };
        assert_eq!(create_provider(&config).unwrap().name(), "openai");
    }

    #[test]
    fn unknown_provider_is_configuration_error() {
        let config = Config {
            provider: "ollama".into(),
            ..Config::default()
        };
        let err = create_provider(&config).err().unwrap();
        assert!(matches!(err, AgentError::Configuration(ref m) if m.contains("ollama")));
    }
}
