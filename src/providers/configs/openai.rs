use super::base::ProviderConfig;
use anyhow::Result;

pub const OPENAI_DEFAULT_HOST: &str = "https://api.openai.com/";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o";

#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    pub api_key: String,
    pub host: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

impl OpenAiProviderConfig {
    pub fn new(api_key: String, host: String) -> Self {
        Self {
            api_key,
            host,
            model: OPENAI_DEFAULT_MODEL.to_string(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Reads host and model from the environment; `api_key` wins over `OPENAI_API_KEY` when given.
    pub fn from_env_with_key(api_key: Option<String>) -> Result<Self> {
        let api_key = match api_key {
            Some(key) => key,
            None => Self::get_env("OPENAI_API_KEY", true, None)?
                .ok_or_else(|| anyhow::anyhow!("OpenAI API key should be present"))?,
        };

        let host = Self::get_env(
            "OPENAI_API_HOST",
            false,
            Some(OPENAI_DEFAULT_HOST.to_string()),
        )?
        .unwrap_or_else(|| OPENAI_DEFAULT_HOST.to_string());

        let model = Self::get_env("OPENAI_MODEL", false, None)?
            .unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string());

        Ok(Self::new(api_key, host).with_model(model))
    }

    /// Full url of the chat completions endpoint, tolerant of a missing trailing slash on `host`.
    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.host.trim_end_matches('/'))
    }
}

impl ProviderConfig for OpenAiProviderConfig {
    fn from_env() -> Result<Self> {
        Self::from_env_with_key(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url() {
        let config = OpenAiProviderConfig::new("key".to_string(), OPENAI_DEFAULT_HOST.to_string());
        assert_eq!(config.completions_url(), "https://api.openai.com/v1/chat/completions");

        let config = OpenAiProviderConfig::new("key".to_string(), "http://127.0.0.1:1234".to_string());
        assert_eq!(config.completions_url(), "http://127.0.0.1:1234/v1/chat/completions");
    }

    #[test]
    fn test_defaults() {
        let config = OpenAiProviderConfig::new("key".to_string(), OPENAI_DEFAULT_HOST.to_string())
            .with_model("gpt-3.5-turbo-16k");
        assert_eq!(config.model, "gpt-3.5-turbo-16k");
        assert!(config.temperature.is_none());
        assert!(config.max_tokens.is_none());
    }

    #[test]
    fn test_explicit_key_skips_env_lookup() -> Result<()> {
        let config = OpenAiProviderConfig::from_env_with_key(Some("sk-cli".to_string()))?;
        assert_eq!(config.api_key, "sk-cli");
        assert!(!config.model.is_empty());
        assert!(config.completions_url().ends_with("/v1/chat/completions"));
        Ok(())
    }
}
