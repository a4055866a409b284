use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::AsyncReadExt;

use crate::{
    domain::tts::{
        chunk_for_speech, split_for_ingestion, InputIdentifier, SessionReport, TtsServiceApi,
    },
    error::{AppError, AppResult},
};

/// Input for `narrator speak`
#[derive(Debug, Default)]
pub struct SpeakRequest {
    pub text: Option<String>,
    pub file: Option<PathBuf>,
}

/// How `narrator split` cuts the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    Speech,
    Ingestion,
}

/// Input for `narrator split`
#[derive(Debug)]
pub struct SplitRequest {
    pub file: Option<PathBuf>,
    pub mode: SplitMode,
}

/// Text to synthesize together with the identifier its progress is stored under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakInput {
    pub text: String,
    pub input_identifier: String,
}

pub struct TtsController {
    tts_service: Arc<dyn TtsServiceApi>,
    max_chunk_length: usize,
    max_part_lines: usize,
    max_part_chars: usize,
}

impl TtsController {
    pub fn new(
        tts_service: Arc<dyn TtsServiceApi>,
        max_chunk_length: usize,
        max_part_lines: usize,
        max_part_chars: usize,
    ) -> Self {
        Self {
            tts_service,
            max_chunk_length,
            max_part_lines,
            max_part_chars,
        }
    }

    /// `narrator speak` - Turn text, a file or stdin into one audio file
    pub async fn speak(&self, request: SpeakRequest) -> AppResult<()> {
        let input = read_speak_input(request).await?;

        match self
            .tts_service
            .run_session(&input.text, &input.input_identifier)
            .await
        {
            Ok(report) => {
                println!("{}", describe_report(&report));
                Ok(())
            }
            Err(e) => {
                if e.is_resumable() {
                    eprintln!("Progress was saved. Run the same command again to resume.");
                }
                Err(AppError::from(e))
            }
        }
    }

    /// `narrator split` - Print the chunks a text would be cut into
    pub async fn split(&self, request: SplitRequest) -> AppResult<()> {
        let text = match &request.file {
            Some(path) => read_text_file(path).await?,
            None => read_stdin().await?,
        };

        let parts: Vec<String> = match request.mode {
            SplitMode::Speech => chunk_for_speech(&text, self.max_chunk_length)
                .into_iter()
                .map(|chunk| chunk.content)
                .collect(),
            SplitMode::Ingestion => {
                split_for_ingestion(&text, self.max_part_lines, self.max_part_chars)
            }
        };

        tracing::info!(mode = ?request.mode, part_count = parts.len(), "Text split");
        print!("{}", format_parts(&parts));
        Ok(())
    }

    /// `narrator status` - Describe the persisted session
    pub async fn status(&self) -> AppResult<()> {
        let record = self.tts_service.status().await;

        if record.is_empty() {
            println!("No session in progress.");
            return Ok(());
        }

        println!("Input:     {}", record.input_identifier);
        println!("Completed: {} part(s)", record.completed_count());
        for artifact in &record.artifact_paths {
            println!("  {}", artifact);
        }
        Ok(())
    }

    /// `narrator reset` - Drop the persisted session and its audio parts
    pub async fn reset(&self) -> AppResult<()> {
        let removed = self.tts_service.reset().await?;
        println!("Session cleared, {} audio part(s) removed.", removed);
        Ok(())
    }
}

/// Resolve `--text`, `--file` or stdin, in that order
pub async fn read_speak_input(request: SpeakRequest) -> AppResult<SpeakInput> {
    if let Some(text) = request.text {
        let input_identifier = InputIdentifier::for_text(&text);
        return Ok(SpeakInput {
            text,
            input_identifier,
        });
    }

    if let Some(path) = request.file {
        let text = read_text_file(&path).await?;
        let input_identifier = InputIdentifier::for_file(&path).await?;
        return Ok(SpeakInput {
            text,
            input_identifier,
        });
    }

    let text = read_stdin().await?;
    let input_identifier = InputIdentifier::for_text(&text);
    Ok(SpeakInput {
        text,
        input_identifier,
    })
}

async fn read_text_file(path: &Path) -> AppResult<String> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::BadRequest(format!("Cannot read {}: {}", path.display(), e))
    })
}

async fn read_stdin() -> AppResult<String> {
    let mut text = String::new();
    tokio::io::stdin().read_to_string(&mut text).await?;
    Ok(text)
}

pub fn describe_report(report: &SessionReport) -> String {
    match report {
        SessionReport::NothingToDo => "Nothing to synthesize.".to_string(),
        SessionReport::Completed {
            output,
            chunk_count,
            synthesized,
            resumed,
        } => {
            let mut line = format!("{} ({} part(s)", output.display(), chunk_count);
            if *resumed > 0 {
                line.push_str(&format!(", {} resumed, {} synthesized", resumed, synthesized));
            }
            line.push(')');
            line
        }
    }
}

fn format_parts(parts: &[String]) -> String {
    let total = parts.len();
    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            format!(
                "--- part {}/{} ({} chars) ---\n{}\n",
                i + 1,
                total,
                part.chars().count(),
                part
            )
        })
        .collect()
}
