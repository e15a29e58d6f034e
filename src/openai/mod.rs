pub mod dto;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use self::dto::{ChatCompletionRequest, ChatCompletionResponse, ErrorEnvelope};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("OpenAI API error {status}: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ProviderError {
    /// Builds an API error from a non-success response, keeping the provider's
    /// error code when the body follows the `{"error": {...}}` envelope.
    pub fn from_response_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => ProviderError::Api {
                status,
                code: envelope.error.code.or(envelope.error.kind),
                message: envelope.error.message,
            },
            Err(_) => ProviderError::Api {
                status,
                code: None,
                message: body.to_string(),
            },
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            ProviderError::Api { code, .. } => code.as_deref(),
            ProviderError::Http(_) => None,
        }
    }
}

#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn create_chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ProviderError>;
}

pub struct OpenAiHttpClient {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiHttpClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder().build()?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl ChatCompletion for OpenAiHttpClient {
    async fn create_chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ProviderError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("OpenAI API returned {}: {}", status, body);
            return Err(ProviderError::from_response_body(status.as_u16(), &body));
        }

        Ok(response.json::<ChatCompletionResponse>().await?)
    }
}
