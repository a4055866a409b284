use crate::domain::tts::SynthesizedAudio;
use async_trait::async_trait;

/// Repository for TTS synthesis operations.
/// Abstracts the underlying TTS provider (Gemini, OpenAI, AWS Polly, etc.)
///
/// Implementations synthesize exactly the text they are given. Splitting long
/// input and stitching the audio back together is the pipeline's job.
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize one chunk of text
    ///
    /// Returns the audio bytes together with the provider's mime descriptor.
    /// Raw PCM payloads are reported with an `audio/L{bits};rate=...` style
    /// descriptor so they can be wrapped in a WAV container.
    ///
    /// # Errors
    /// Returns error if synthesis fails or provider is unavailable
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, String>;

    /// Short provider name used in logs
    fn provider_name(&self) -> &'static str;

    /// Longest text accepted by a single `synthesize` call, if the provider has a limit
    fn max_input_chars(&self) -> Option<usize> {
        None
    }
}
