use super::tts_repository::TtsRepository;
use crate::domain::tts::SynthesizedAudio;
use async_trait::async_trait;
use aws_sdk_polly::{
    types::{Engine, OutputFormat, VoiceId},
    Client as PollyClient,
};
use std::sync::Arc;

/// AWS Polly has a limit of 3000 characters per request
pub const POLLY_MAX_INPUT_CHARS: usize = 3000;

/// Polly PCM is signed 16-bit little-endian mono at this rate
const POLLY_PCM_SAMPLE_RATE: u32 = 16_000;

/// Audio format requested from Polly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollyOutput {
    /// Raw samples, wrapped into WAV by the pipeline
    Pcm,
    Mp3,
}

impl PollyOutput {
    fn mime_type(&self) -> String {
        match self {
            PollyOutput::Pcm => format!("audio/L16;rate={}", POLLY_PCM_SAMPLE_RATE),
            PollyOutput::Mp3 => "audio/mpeg".to_string(),
        }
    }
}

impl std::str::FromStr for PollyOutput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pcm" => Ok(PollyOutput::Pcm),
            "mp3" => Ok(PollyOutput::Mp3),
            other => Err(format!("unsupported Polly output format: {}", other)),
        }
    }
}

/// AWS Polly implementation of TTS repository
pub struct PollyTtsRepository {
    polly_client: Arc<PollyClient>,
    voice: String,
    output: PollyOutput,
}

impl PollyTtsRepository {
    pub fn new(polly_client: Arc<PollyClient>, voice: String, output: PollyOutput) -> Self {
        Self {
            polly_client,
            voice,
            output,
        }
    }
}

#[async_trait]
impl TtsRepository for PollyTtsRepository {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, String> {
        if text.trim().is_empty() {
            return Err("cannot synthesize empty text".to_string());
        }
        if text.chars().count() > POLLY_MAX_INPUT_CHARS {
            return Err(format!(
                "AWS Polly accepts at most {} characters per request, got {}",
                POLLY_MAX_INPUT_CHARS,
                text.chars().count()
            ));
        }

        let start_time = std::time::Instant::now();
        let voice_id = VoiceId::from(self.voice.as_str());
        let engine = Engine::Neural;

        tracing::info!(
            voice = %self.voice,
            engine = ?engine,
            output_format = ?self.output,
            text_length = text.len(),
            text_preview = %text.chars().take(200).collect::<String>(),
            "Calling AWS Polly synthesize_speech"
        );

        let mut request = self
            .polly_client
            .synthesize_speech()
            .text(text)
            .voice_id(voice_id)
            .engine(engine.clone());
        request = match self.output {
            PollyOutput::Pcm => request
                .output_format(OutputFormat::Pcm)
                .sample_rate(POLLY_PCM_SAMPLE_RATE.to_string()),
            PollyOutput::Mp3 => request.output_format(OutputFormat::Mp3),
        };

        let result = request.send().await.map_err(|e| {
            tracing::error!(
                error = ?e,
                error_display = %e,
                voice = %self.voice,
                engine = ?engine,
                text_length = text.len(),
                "AWS Polly synthesize_speech failed"
            );
            format!("AWS Polly error: {:?}", e)
        })?;

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            format!("Failed to read audio stream: {}", e)
        })?;

        let audio_bytes = audio_stream.into_bytes().to_vec();

        tracing::info!(
            provider = "polly",
            latency_ms = start_time.elapsed().as_millis(),
            audio_size_bytes = audio_bytes.len(),
            "AWS Polly audio received"
        );

        Ok(SynthesizedAudio::new(audio_bytes, self.output.mime_type()))
    }

    fn provider_name(&self) -> &'static str {
        "polly"
    }

    fn max_input_chars(&self) -> Option<usize> {
        Some(POLLY_MAX_INPUT_CHARS)
    }
}
