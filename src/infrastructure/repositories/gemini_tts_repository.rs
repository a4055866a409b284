use super::tts_repository::TtsRepository;
use crate::domain::tts::SynthesizedAudio;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini speech generation, returns raw PCM (`audio/L16;codec=pcm;rate=24000`)
pub struct GeminiTtsRepository {
    client: Client,
    api_key: String,
    model: String,
    voice: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_modalities: Vec<&'a str>,
    speech_config: SpeechConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig<'a> {
    voice_config: VoiceConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig<'a> {
    prebuilt_voice_config: PrebuiltVoiceConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig<'a> {
    voice_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    inline_data: Option<InlineData>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    data: String,
}

impl GeminiTtsRepository {
    pub fn new(api_key: String, model: String, voice: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            voice,
            base_url: GEMINI_API_BASE.to_string(),
        }
    }

    /// Point the repository at another endpoint (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_request<'a>(&'a self, text: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text }],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["AUDIO"],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: &self.voice,
                        },
                    },
                },
            },
        }
    }

    /// Decode and join every inline audio part of the first candidate
    fn extract_audio(response: GenerateResponse) -> Result<SynthesizedAudio, String> {
        let parts = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default();

        let mut bytes = Vec::new();
        let mut mime_type = None;
        for part in parts {
            if let Some(inline) = part.inline_data {
                let decoded = STANDARD
                    .decode(inline.data.as_bytes())
                    .map_err(|e| format!("Gemini returned invalid base64 audio: {}", e))?;
                bytes.extend(decoded);
                mime_type = Some(inline.mime_type);
            } else if let Some(text) = part.text {
                tracing::warn!(text = %text, "Gemini returned text in audio-only mode");
            }
        }

        match mime_type {
            Some(mime_type) => Ok(SynthesizedAudio::new(bytes, mime_type)),
            None => Err("Gemini response contained no audio".to_string()),
        }
    }
}

#[async_trait]
impl TtsRepository for GeminiTtsRepository {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, String> {
        if text.trim().is_empty() {
            return Err("cannot synthesize empty text".to_string());
        }

        let start_time = std::time::Instant::now();
        let url = format!("{}/{}:generateContent", self.base_url, self.model);

        tracing::info!(
            model = %self.model,
            voice = %self.voice,
            text_length = text.len(),
            text_preview = %text.chars().take(200).collect::<String>(),
            "Calling Gemini TTS API"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.build_request(text))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, model = %self.model, "Gemini TTS request failed");
                format!("Gemini TTS error: {}", e)
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("Failed to read Gemini response: {}", e))?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body,
                model = %self.model,
                "Gemini TTS API returned an error"
            );
            return Err(format!("Gemini HTTP error {}: {}", status, body));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| format!("Failed to parse Gemini response: {}", e))?;
        let audio = Self::extract_audio(parsed)?;

        tracing::info!(
            provider = "gemini",
            model = %self.model,
            latency_ms = start_time.elapsed().as_millis(),
            audio_size_bytes = audio.bytes.len(),
            mime_type = %audio.mime_type,
            "Gemini TTS audio received"
        );

        Ok(audio)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}
