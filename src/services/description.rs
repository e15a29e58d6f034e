use std::sync::Arc;

use thiserror::Error;
use tracing::error;

use crate::openai::dto::{ChatCompletionRequest, ChatMessage};
use crate::openai::{ChatCompletion, DEFAULT_MODEL, ProviderError};

const SYSTEM_PROMPT: &str = "You are a helpful assistant that generates concise and practical task descriptions based on task titles.";
const FALLBACK_DESCRIPTION: &str = "Unable to generate description";
const QUOTA_CODE: &str = "insufficient_quota";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("OpenAI client not initialized. Please provide an API key.")]
    NotInitialized,

    #[error("OpenAI API quota exceeded. Please check your billing details.")]
    QuotaExceeded,

    #[error("{0}")]
    Provider(String),

    #[error("Failed to generate task description")]
    Failed,
}

impl From<ProviderError> for GenerationError {
    fn from(err: ProviderError) -> Self {
        if err.code() == Some(QUOTA_CODE) {
            return GenerationError::QuotaExceeded;
        }
        match err {
            ProviderError::Api { message, .. } if message.is_empty() => {
                GenerationError::Provider("OpenAI API error occurred".to_string())
            }
            ProviderError::Api { message, .. } => GenerationError::Provider(message),
            ProviderError::Http(_) => GenerationError::Failed,
        }
    }
}

/// Generates task descriptions from titles. Built once at startup and shared
/// read-only; without a client every call fails with `NotInitialized`.
#[derive(Clone)]
pub struct DescriptionGenerator {
    client: Option<Arc<dyn ChatCompletion>>,
    model: String,
}

impl DescriptionGenerator {
    pub fn new(client: Arc<dyn ChatCompletion>, model: impl Into<String>) -> Self {
        Self {
            client: Some(client),
            model: model.into(),
        }
    }

    pub fn uninitialized() -> Self {
        Self {
            client: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.client.is_some()
    }

    pub fn build_request(&self, title: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(format!(
                    "Generate a brief but detailed description for a task titled: \"{}\". Keep it under 200 characters.",
                    title
                )),
            ],
        }
    }

    pub async fn generate(&self, title: &str) -> Result<String, GenerationError> {
        let client = self.client.as_ref().ok_or(GenerationError::NotInitialized)?;

        let request = self.build_request(title);
        match client.create_chat_completion(&request).await {
            Ok(response) => Ok(response
                .first_content()
                .unwrap_or(FALLBACK_DESCRIPTION)
                .to_string()),
            Err(e) => {
                error!("Error generating task description: {}", e);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::openai::dto::{ChatCompletionResponse, Choice, ResponseMessage};

    enum Reply {
        Content(Option<String>),
        ApiError { code: Option<&'static str>, message: &'static str },
    }

    struct FakeCompletion {
        reply: Reply,
        calls: AtomicUsize,
        last_request: Mutex<Option<ChatCompletionRequest>>,
    }

    impl FakeCompletion {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl ChatCompletion for FakeCompletion {
        async fn create_chat_completion(
            &self,
            request: &ChatCompletionRequest,
        ) -> Result<ChatCompletionResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            match &self.reply {
                Reply::Content(content) => Ok(ChatCompletionResponse {
                    choices: vec![Choice {
                        message: Some(ResponseMessage {
                            content: content.clone(),
                        }),
                    }],
                }),
                Reply::ApiError { code, message } => Err(ProviderError::Api {
                    status: 429,
                    code: code.map(str::to_string),
                    message: message.to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn uninitialized_generator_fails_without_calling_out() {
        let generator = DescriptionGenerator::uninitialized();
        let err = generator.generate("Anything").await.unwrap_err();
        assert!(matches!(err, GenerationError::NotInitialized));
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let fake = FakeCompletion::new(Reply::Content(Some("Pick up groceries".to_string())));
        let generator = DescriptionGenerator::new(fake.clone(), "gpt-test");

        let description = generator.generate("Shopping").await.unwrap();
        assert_eq!(description, "Pick up groceries");
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);

        let request = fake.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.model, "gpt-test");
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[0].content, SYSTEM_PROMPT);
        assert!(request.messages[1].content.contains("\"Shopping\""));
    }

    #[tokio::test]
    async fn empty_content_falls_back() {
        let fake = FakeCompletion::new(Reply::Content(None));
        let generator = DescriptionGenerator::new(fake, DEFAULT_MODEL);
        assert_eq!(
            generator.generate("Shopping").await.unwrap(),
            FALLBACK_DESCRIPTION
        );
    }

    #[tokio::test]
    async fn quota_errors_are_distinguished() {
        let fake = FakeCompletion::new(Reply::ApiError {
            code: Some("insufficient_quota"),
            message: "You exceeded your current quota",
        });
        let generator = DescriptionGenerator::new(fake, DEFAULT_MODEL);
        let err = generator.generate("Shopping").await.unwrap_err();
        assert!(matches!(err, GenerationError::QuotaExceeded));
    }

    #[tokio::test]
    async fn other_api_errors_keep_provider_message() {
        let fake = FakeCompletion::new(Reply::ApiError {
            code: Some("invalid_api_key"),
            message: "Incorrect API key provided",
        });
        let generator = DescriptionGenerator::new(fake, DEFAULT_MODEL);
        match generator.generate("Shopping").await.unwrap_err() {
            GenerationError::Provider(message) => {
                assert_eq!(message, "Incorrect API key provided")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
