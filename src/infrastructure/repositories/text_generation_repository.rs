use crate::domain::chat::{ChatMessage, ChatRole};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use std::sync::Arc;

/// Stream of generated text fragments, in order
pub type TokenStream = BoxStream<'static, Result<String, String>>;

/// Repository for language-model text generation.
/// Abstracts the provider so the ask flow can be driven by fakes in tests.
#[async_trait]
pub trait TextGenerationRepository: Send + Sync {
    /// Start generating a reply to `messages`, yielding tokens as they arrive
    async fn generate_stream(&self, messages: Vec<ChatMessage>) -> Result<TokenStream, String>;
}

/// OpenAI chat completions with streaming enabled
pub struct OpenAiTextGenerationRepository {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiTextGenerationRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String) -> Self {
        Self { client, model }
    }

    fn to_request_message(message: ChatMessage) -> Result<ChatCompletionRequestMessage, String> {
        let converted = match message.role {
            ChatRole::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(message.content)
                .build()
                .map(Into::into),
            ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
                .content(message.content)
                .build()
                .map(Into::into),
        };
        converted.map_err(|e| format!("Invalid chat message: {}", e))
    }
}

#[async_trait]
impl TextGenerationRepository for OpenAiTextGenerationRepository {
    async fn generate_stream(&self, messages: Vec<ChatMessage>) -> Result<TokenStream, String> {
        let message_count = messages.len();
        let messages = messages
            .into_iter()
            .map(Self::to_request_message)
            .collect::<Result<Vec<_>, _>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(|e| format!("Invalid chat request: {}", e))?;

        tracing::info!(
            model = %self.model,
            message_count = message_count,
            "Calling OpenAI chat completions (streaming)"
        );

        let stream = self.client.chat().create_stream(request).await.map_err(|e| {
            tracing::error!(error = %e, model = %self.model, "OpenAI chat request failed");
            format!("OpenAI chat error: {}", e)
        })?;

        let tokens = stream.map(|item| {
            item.map(|response| {
                response
                    .choices
                    .into_iter()
                    .filter_map(|choice| choice.delta.content)
                    .collect::<String>()
            })
            .map_err(|e| format!("OpenAI chat stream error: {}", e))
        });

        Ok(tokens.boxed())
    }
}
