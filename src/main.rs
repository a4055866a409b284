use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use narrator::controllers::chat::{AskRequest, ChatController};
use narrator::controllers::tts::{SpeakRequest, SplitMode, SplitRequest, TtsController};
use narrator::domain::tts::{TtsService, TtsServiceApi};
use narrator::error::{AppError, AppResult};
use narrator::infrastructure::audio::{Concatenator, FfmpegConcatTool};
use narrator::infrastructure::config::{Config, LogFormat, TtsProvider};
use narrator::infrastructure::repositories::{
    FileProgressRepository, GeminiTtsRepository, OpenAiTextGenerationRepository,
    OpenAiTtsRepository, PollyOutput, PollyTtsRepository, TtsRepository,
};

/// Resumable text-to-speech for long documents
#[derive(Debug, Parser)]
#[command(name = "narrator", version, about)]
struct Cli {
    /// Maximum characters per synthesis request (overrides TTS_CHARACTER_LIMIT)
    #[arg(long, global = true)]
    max_chars: Option<usize>,

    /// Directory for progress, audio parts and output (overrides TTS_WORK_DIR)
    #[arg(long, global = true)]
    work_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert text to a single audio file, resuming an interrupted run
    Speak {
        /// Text to narrate
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,
        /// File to narrate; stdin is read when neither is given
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Print the parts a text is split into
    Split {
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = SplitModeArg::Speech)]
        mode: SplitModeArg,
    },
    /// Ask the language model, optionally narrating the reply
    Ask {
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
        /// Text file sent along with the prompt
        #[arg(long)]
        file: Option<PathBuf>,
        /// Also synthesize the reply
        #[arg(long)]
        audio: bool,
    },
    /// Show the session in progress
    Status,
    /// Discard the session in progress and its audio parts
    Reset,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SplitModeArg {
    Speech,
    Ingestion,
}

impl From<SplitModeArg> for SplitMode {
    fn from(mode: SplitModeArg) -> Self {
        match mode {
            SplitModeArg::Speech => SplitMode::Speech,
            SplitModeArg::Ingestion => SplitMode::Ingestion,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, exit_code = e.exit_code(), "Command failed");
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    // Load configuration
    let mut config = Config::from_env().map_err(|e| AppError::Config(e.to_string()))?;
    if let Some(max_chars) = cli.max_chars {
        if max_chars == 0 {
            return Err(AppError::Config("--max-chars must be greater than zero".to_string()));
        }
        config.tts_character_limit = max_chars;
    }
    if let Some(work_dir) = cli.work_dir {
        config.work_dir = work_dir;
    }

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        provider = ?config.tts_provider,
        work_dir = %config.work_dir.display(),
        max_chunk_length = config.tts_character_limit,
        "Starting narrator"
    );

    match cli.command {
        Command::Speak { text, file } => {
            let controller = build_tts_controller(&config, true).await?;
            controller.speak(SpeakRequest { text, file }).await
        }
        Command::Split { file, mode } => {
            let controller = build_tts_controller(&config, false).await?;
            controller
                .split(SplitRequest {
                    file,
                    mode: mode.into(),
                })
                .await
        }
        Command::Status => build_tts_controller(&config, false).await?.status().await,
        Command::Reset => build_tts_controller(&config, false).await?.reset().await,
        Command::Ask {
            prompt,
            file,
            audio,
        } => {
            let tts_service: Option<Arc<dyn TtsServiceApi>> = if audio {
                let service: Arc<dyn TtsServiceApi> = build_tts_service(&config, true).await?;
                Some(service)
            } else {
                None
            };

            tracing::info!(model = %config.openai_chat_model, "Instantiating chat service");
            let generator = Arc::new(OpenAiTextGenerationRepository::new(
                Arc::new(async_openai::Client::new()),
                config.openai_chat_model.clone(),
            ));
            let chat_service = Arc::new(narrator::domain::chat::ChatService::new(
                generator,
                config.llm_part_max_lines,
                config.llm_part_max_chars,
            ));

            ChatController::new(chat_service, tts_service)
                .ask(AskRequest {
                    prompt: prompt.join(" "),
                    file,
                    audio,
                })
                .await
        }
    }
}

async fn build_tts_controller(config: &Config, synthesizes: bool) -> AppResult<TtsController> {
    let tts_service = build_tts_service(config, synthesizes).await?;
    // The service may have lowered the configured length to the provider's limit
    let max_chunk_length = tts_service.max_chunk_length();
    Ok(TtsController::new(
        tts_service,
        max_chunk_length,
        config.llm_part_max_lines,
        config.llm_part_max_chars,
    ))
}

/// Wire repositories, the concatenation tool and the pipeline service
async fn build_tts_service(config: &Config, synthesizes: bool) -> AppResult<Arc<TtsService>> {
    if synthesizes {
        tokio::fs::create_dir_all(&config.work_dir).await?;
    }

    // 1. Instantiate repositories
    let tts_repo = build_tts_repository(config, synthesizes).await?;
    let progress_repo = Arc::new(FileProgressRepository::new(config.progress_path()));

    // 2. Instantiate the concatenation tool
    let concatenator = Concatenator::new(
        config.work_dir.clone(),
        Arc::new(FfmpegConcatTool::new(config.ffmpeg_path.clone())),
    );

    // 3. Instantiate the service
    Ok(Arc::new(TtsService::new(
        tts_repo,
        progress_repo,
        concatenator,
        config.work_dir.clone(),
        config.tts_character_limit,
    )))
}

async fn build_tts_repository(
    config: &Config,
    synthesizes: bool,
) -> AppResult<Arc<dyn TtsRepository>> {
    match config.tts_provider {
        TtsProvider::Gemini => {
            let api_key = match (&config.gemini_api_key, synthesizes) {
                (Some(key), _) => key.clone(),
                (None, false) => String::new(),
                (None, true) => {
                    return Err(AppError::Config(
                        "GEMINI_API_KEY is required when TTS_PROVIDER=gemini".to_string(),
                    ))
                }
            };
            tracing::info!(
                model = %config.gemini_tts_model,
                voice = %config.gemini_tts_voice,
                "Using Gemini TTS"
            );
            Ok(Arc::new(GeminiTtsRepository::new(
                api_key,
                config.gemini_tts_model.clone(),
                config.gemini_tts_voice.clone(),
            )))
        }
        TtsProvider::OpenAi => {
            tracing::info!(
                model = %config.openai_tts_model,
                voice = %config.openai_tts_voice,
                "Using OpenAI TTS"
            );
            Ok(Arc::new(OpenAiTtsRepository::new(
                Arc::new(async_openai::Client::new()),
                config.openai_tts_model.clone(),
                config.openai_tts_voice.clone(),
            )))
        }
        TtsProvider::Polly => {
            let output: PollyOutput = config.polly_output.parse().map_err(AppError::Config)?;

            tracing::info!("Initializing AWS Polly client with region: {}", config.aws_region);

            let has_access_key = std::env::var("AWS_ACCESS_KEY_ID").is_ok();
            let has_secret_key = std::env::var("AWS_SECRET_ACCESS_KEY").is_ok();
            if !has_access_key || !has_secret_key {
                tracing::warn!(
                    "AWS credentials not found in environment variables. \
                     Will attempt to use other credential providers"
                );
            }

            let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(config.aws_region.clone()))
                .load()
                .await;
            tracing::info!(region = ?aws_config.region(), "AWS configuration loaded");

            let polly_client = Arc::new(aws_sdk_polly::Client::new(&aws_config));
            Ok(Arc::new(PollyTtsRepository::new(
                polly_client,
                config.polly_voice.clone(),
                output,
            )))
        }
    }
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "narrator=info".into()),
            )
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "narrator=info".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }
}
