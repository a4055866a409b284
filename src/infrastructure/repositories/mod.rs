pub mod gemini_tts_repository;
pub mod openai_tts_repository;
pub mod polly_tts_repository;
pub mod progress_repository;
pub mod text_generation_repository;
pub mod tts_repository;

pub use gemini_tts_repository::GeminiTtsRepository;
pub use openai_tts_repository::OpenAiTtsRepository;
pub use polly_tts_repository::{PollyOutput, PollyTtsRepository};
pub use progress_repository::{
    FileProgressRepository, InMemoryProgressRepository, ProgressRepository, ProgressStoreError,
};
pub use text_generation_repository::{
    OpenAiTextGenerationRepository, TextGenerationRepository, TokenStream,
};
pub use tts_repository::TtsRepository;
