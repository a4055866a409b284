use async_trait::async_trait;
use futures::StreamExt;
use narrator::domain::chat::ChatMessage;
use narrator::domain::tts::SynthesizedAudio;
use narrator::infrastructure::audio::{ConcatError, ConcatTool};
use narrator::infrastructure::repositories::{
    TextGenerationRepository, TokenStream, TtsRepository,
};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Provider that "speaks" a chunk by returning its text as the audio bytes
pub struct FakeTtsRepository {
    mime_type: String,
    calls: Mutex<Vec<String>>,
    failing_on: Mutex<Option<String>>,
    provider: &'static str,
    max_input_chars: Option<usize>,
}

impl FakeTtsRepository {
    pub fn new() -> Self {
        Self::with_mime_type("audio/mpeg")
    }

    pub fn with_mime_type(mime_type: &str) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            calls: Mutex::new(Vec::new()),
            failing_on: Mutex::new(None),
            provider: "fake",
            max_input_chars: None,
        }
    }

    /// Reject nothing, but advertise a per-request limit like the real providers do
    pub fn with_max_input_chars(mut self, limit: usize) -> Self {
        self.max_input_chars = Some(limit);
        self
    }

    pub fn with_provider_name(mut self, provider: &'static str) -> Self {
        self.provider = provider;
        self
    }

    /// Fail every request whose text contains `needle`
    pub fn fail_on(&self, needle: &str) {
        *self.failing_on.lock().unwrap() = Some(needle.to_string());
    }

    pub fn recover(&self) {
        *self.failing_on.lock().unwrap() = None;
    }

    /// Texts of every request received, in order, failed ones included
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl TtsRepository for FakeTtsRepository {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, String> {
        self.calls.lock().unwrap().push(text.to_string());

        if let Some(needle) = self.failing_on.lock().unwrap().as_deref() {
            if text.contains(needle) {
                return Err("429 Too Many Requests: quota exceeded".to_string());
            }
        }

        Ok(SynthesizedAudio::new(
            format!("[{}]", text).into_bytes(),
            self.mime_type.clone(),
        ))
    }

    fn provider_name(&self) -> &'static str {
        self.provider
    }

    fn max_input_chars(&self) -> Option<usize> {
        self.max_input_chars
    }
}

/// Concatenates the files listed in the manifest byte by byte
#[derive(Default)]
pub struct FakeConcatTool {
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl FakeConcatTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConcatTool for FakeConcatTool {
    async fn concat(&self, manifest: &Path, output: &Path) -> Result<(), ConcatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(ConcatError::ToolFailed {
                program: "fake-ffmpeg".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "concat: Invalid data found when processing input".to_string(),
            });
        }

        let dir = manifest.parent().unwrap();
        let listing = std::fs::read_to_string(manifest).unwrap();
        let mut merged = Vec::new();
        for line in listing.lines() {
            let name = line.trim_start_matches("file '").trim_end_matches('\'');
            merged.extend(std::fs::read(dir.join(name)).unwrap());
        }
        std::fs::write(output, merged).unwrap();
        Ok(())
    }
}

/// Language model that streams a fixed reply and keeps the messages it got
pub struct ScriptedGenerator {
    tokens: Vec<String>,
    received: Mutex<Vec<ChatMessage>>,
}

impl ScriptedGenerator {
    pub fn new(tokens: &[&str]) -> Self {
        Self {
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn received(&self) -> Vec<ChatMessage> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerationRepository for ScriptedGenerator {
    async fn generate_stream(&self, messages: Vec<ChatMessage>) -> Result<TokenStream, String> {
        *self.received.lock().unwrap() = messages;
        let tokens: Vec<Result<String, String>> = self.tokens.iter().cloned().map(Ok).collect();
        Ok(futures::stream::iter(tokens).boxed())
    }
}
