use std::path::PathBuf;

/// Audio returned by a TTS provider for one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedAudio {
    pub bytes: Vec<u8>,
    /// Provider mime descriptor, e.g. `audio/mpeg` or `audio/L16;codec=pcm;rate=24000`
    pub mime_type: String,
}

impl SynthesizedAudio {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// Result of a synthesis session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionReport {
    /// The input had no speakable content
    NothingToDo,
    Completed {
        output: PathBuf,
        chunk_count: usize,
        /// Chunks sent to the provider during this run
        synthesized: usize,
        /// Chunks skipped because an earlier run already finished them
        resumed: usize,
    },
}
