use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub tts_provider: TtsProvider,
    // Gemini
    pub gemini_api_key: Option<String>,
    pub gemini_tts_model: String,
    pub gemini_tts_voice: String,
    // OpenAI (API key is read by the SDK from OPENAI_API_KEY)
    pub openai_tts_model: String,
    pub openai_tts_voice: String,
    pub openai_chat_model: String,
    // AWS Polly
    pub aws_region: String,
    pub polly_voice: String,
    pub polly_output: String,
    // Pipeline
    pub tts_character_limit: usize,
    pub work_dir: PathBuf,
    pub progress_file: String,
    pub ffmpeg_path: PathBuf,
    pub llm_part_max_lines: usize,
    pub llm_part_max_chars: usize,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    Gemini,
    OpenAi,
    Polly,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for TtsProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(TtsProvider::Gemini),
            "openai" => Ok(TtsProvider::OpenAi),
            "polly" => Ok(TtsProvider::Polly),
            other => Err(format!("unknown TTS_PROVIDER: {}", other)),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            tts_provider: env::var("TTS_PROVIDER")
                .unwrap_or_else(|_| "gemini".to_string())
                .parse()?,
            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            gemini_tts_model: env::var("GEMINI_TTS_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash-preview-tts".to_string()),
            gemini_tts_voice: env::var("GEMINI_TTS_VOICE").unwrap_or_else(|_| "Zephyr".to_string()),
            openai_tts_model: env::var("OPENAI_TTS_MODEL").unwrap_or_else(|_| "tts-1".to_string()),
            openai_tts_voice: env::var("OPENAI_TTS_VOICE").unwrap_or_else(|_| "alloy".to_string()),
            openai_chat_model: env::var("OPENAI_CHAT_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "eu-west-1".to_string()),
            polly_voice: env::var("POLLY_VOICE").unwrap_or_else(|_| "Joanna".to_string()),
            polly_output: env::var("POLLY_OUTPUT").unwrap_or_else(|_| "pcm".to_string()),
            tts_character_limit: env::var("TTS_CHARACTER_LIMIT")
                .unwrap_or_else(|_| "4500".to_string())
                .parse()?,
            work_dir: env::var("TTS_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            progress_file: env::var("TTS_PROGRESS_FILE")
                .unwrap_or_else(|_| ".tts_progress.json".to_string()),
            ffmpeg_path: env::var("FFMPEG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("ffmpeg")),
            llm_part_max_lines: env::var("LLM_PART_MAX_LINES")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()?,
            llm_part_max_chars: env::var("LLM_PART_MAX_CHARS")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.tts_character_limit == 0 {
            return Err("TTS_CHARACTER_LIMIT must be greater than zero".to_string());
        }
        if self.llm_part_max_lines == 0 || self.llm_part_max_chars == 0 {
            return Err(
                "LLM_PART_MAX_LINES and LLM_PART_MAX_CHARS must be greater than zero".to_string(),
            );
        }
        Ok(())
    }

    /// Location of the progress file inside the work dir
    pub fn progress_path(&self) -> PathBuf {
        self.work_dir.join(&self.progress_file)
    }
}
