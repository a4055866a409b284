pub mod dto;
pub mod error;
pub mod identifier;
pub mod progress;
pub mod segmenter;
pub mod service;
pub mod wav;

pub use dto::{SessionReport, SynthesizedAudio};
pub use error::TtsServiceError;
pub use identifier::InputIdentifier;
pub use progress::ProgressRecord;
pub use segmenter::{chunk_for_speech, split_for_ingestion, split_for_speech, TextChunk};
pub use service::{TtsService, TtsServiceApi};
pub use wav::{container_extension, encode_wav, AudioError, WavOptions};
