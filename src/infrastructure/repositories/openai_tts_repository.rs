use super::tts_repository::TtsRepository;
use crate::domain::tts::SynthesizedAudio;
use async_openai::{
    config::OpenAIConfig,
    types::{CreateSpeechRequest, SpeechModel, Voice},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

/// OpenAI has a limit of 4096 characters per request
pub const OPENAI_MAX_INPUT_CHARS: usize = 4096;

/// OpenAI TTS implementation of TTS repository, returns MP3
pub struct OpenAiTtsRepository {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
    voice: String,
}

impl OpenAiTtsRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String, voice: String) -> Self {
        Self {
            client,
            model,
            voice,
        }
    }

    fn speech_model(&self) -> SpeechModel {
        match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        }
    }

    fn voice(&self) -> Voice {
        match self.voice.to_lowercase().as_str() {
            "alloy" => Voice::Alloy,
            "echo" => Voice::Echo,
            "fable" => Voice::Fable,
            "onyx" => Voice::Onyx,
            "nova" => Voice::Nova,
            "shimmer" => Voice::Shimmer,
            other => {
                tracing::warn!(voice = other, "Unknown OpenAI voice, using alloy");
                Voice::Alloy
            }
        }
    }
}

#[async_trait]
impl TtsRepository for OpenAiTtsRepository {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, String> {
        if text.trim().is_empty() {
            return Err("cannot synthesize empty text".to_string());
        }
        if text.chars().count() > OPENAI_MAX_INPUT_CHARS {
            return Err(format!(
                "OpenAI TTS accepts at most {} characters per request, got {}",
                OPENAI_MAX_INPUT_CHARS,
                text.chars().count()
            ));
        }

        let start_time = std::time::Instant::now();

        tracing::info!(
            model = %self.model,
            voice = %self.voice,
            text_length = text.len(),
            text_preview = %text.chars().take(200).collect::<String>(),
            "Calling OpenAI TTS API"
        );

        let request = CreateSpeechRequest {
            model: self.speech_model(),
            input: text.to_string(),
            voice: self.voice(),
            response_format: None, // Defaults to MP3
            speed: None,           // Defaults to 1.0
        };

        let response = self
            .client
            .audio()
            .speech(request)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    model = %self.model,
                    voice = %self.voice,
                    text_length = text.len(),
                    "OpenAI TTS API call failed"
                );
                format!("OpenAI TTS error: {}", e)
            })?;

        let audio_bytes = response.bytes.to_vec();

        tracing::info!(
            provider = "openai",
            model = %self.model,
            latency_ms = start_time.elapsed().as_millis(),
            audio_size_bytes = audio_bytes.len(),
            "OpenAI TTS audio received"
        );

        Ok(SynthesizedAudio::new(audio_bytes, "audio/mpeg"))
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn max_input_chars(&self) -> Option<usize> {
        Some(OPENAI_MAX_INPUT_CHARS)
    }
}
