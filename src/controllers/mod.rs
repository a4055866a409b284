pub mod chat;
pub mod tts;
