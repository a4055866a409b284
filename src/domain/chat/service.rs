use super::error::ChatServiceError;
use super::ChatMessage;
use crate::domain::tts::split_for_ingestion;
use crate::infrastructure::repositories::TextGenerationRepository;
use futures::StreamExt;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "You are a helpful assistant. When the user attaches a file it \
arrives split into numbered parts; treat the parts together as one document.";

/// A text file sent along with the prompt
#[derive(Debug, Clone)]
pub struct Attachment {
    pub name: String,
    pub content: String,
}

pub struct ChatService {
    generator: Arc<dyn TextGenerationRepository>,
    max_part_lines: usize,
    max_part_chars: usize,
}

impl ChatService {
    pub fn new(
        generator: Arc<dyn TextGenerationRepository>,
        max_part_lines: usize,
        max_part_chars: usize,
    ) -> Self {
        Self {
            generator,
            max_part_lines,
            max_part_chars,
        }
    }

    /// System prompt, one user message per attachment part, then the prompt itself
    pub fn build_messages(
        &self,
        prompt: &str,
        attachment: Option<&Attachment>,
    ) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(SYSTEM_PROMPT)];

        if let Some(attachment) = attachment {
            let parts =
                split_for_ingestion(&attachment.content, self.max_part_lines, self.max_part_chars);
            let total = parts.len();
            tracing::info!(
                attachment = %attachment.name,
                part_count = total,
                "Attachment split for ingestion"
            );
            messages.extend(parts.into_iter().enumerate().map(|(i, part)| {
                ChatMessage::user(format!(
                    "[Part {}/{} of {}]\n{}",
                    i + 1,
                    total,
                    attachment.name,
                    part
                ))
            }));
        }

        messages.push(ChatMessage::user(prompt.trim()));
        messages
    }

    /// Ask the model and stream its reply through `on_token`.
    /// Returns the complete reply.
    pub async fn ask<F>(
        &self,
        prompt: &str,
        attachment: Option<&Attachment>,
        mut on_token: F,
    ) -> Result<String, ChatServiceError>
    where
        F: FnMut(&str) + Send,
    {
        if prompt.trim().is_empty() {
            return Err(ChatServiceError::Invalid("Prompt cannot be empty".to_string()));
        }

        let messages = self.build_messages(prompt, attachment);
        let mut stream = self
            .generator
            .generate_stream(messages)
            .await
            .map_err(ChatServiceError::Provider)?;

        let mut response = String::new();
        while let Some(token) = stream.next().await {
            let token = token.map_err(ChatServiceError::Provider)?;
            if token.is_empty() {
                continue;
            }
            on_token(&token);
            response.push_str(&token);
        }

        tracing::info!(response_length = response.len(), "Model response received");
        Ok(response)
    }
}
