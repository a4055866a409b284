use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{
    controllers::tts::describe_report,
    domain::{
        chat::{Attachment, ChatService},
        tts::{InputIdentifier, TtsServiceApi},
    },
    error::{AppError, AppResult},
};

/// Input for `narrator ask`
#[derive(Debug)]
pub struct AskRequest {
    pub prompt: String,
    pub file: Option<PathBuf>,
    /// Also narrate the full reply
    pub audio: bool,
}

pub struct ChatController {
    chat_service: Arc<ChatService>,
    tts_service: Option<Arc<dyn TtsServiceApi>>,
}

impl ChatController {
    pub fn new(
        chat_service: Arc<ChatService>,
        tts_service: Option<Arc<dyn TtsServiceApi>>,
    ) -> Self {
        Self {
            chat_service,
            tts_service,
        }
    }

    /// `narrator ask` - Stream a model reply to stdout, optionally narrating it
    pub async fn ask(&self, request: AskRequest) -> AppResult<()> {
        let attachment = match &request.file {
            Some(path) => Some(load_attachment(path).await?),
            None => None,
        };

        let mut stdout = std::io::stdout();
        let reply = self
            .chat_service
            .ask(&request.prompt, attachment.as_ref(), |token| {
                // Broken pipes must not abort generation; the reply is still returned
                let _ = write!(stdout, "{}", token);
                let _ = stdout.flush();
            })
            .await?;
        println!();

        if !request.audio {
            return Ok(());
        }

        let tts_service = self.tts_service.as_ref().ok_or_else(|| {
            AppError::Config("audio output requested but no TTS provider is configured".to_string())
        })?;

        let input_identifier = InputIdentifier::for_text(&reply);
        tracing::info!(
            input_identifier = %input_identifier,
            reply_length = reply.chars().count(),
            "Narrating model reply"
        );

        let report = tts_service.run_session(&reply, &input_identifier).await?;
        println!("{}", describe_report(&report));
        Ok(())
    }
}

async fn load_attachment(path: &Path) -> AppResult<Attachment> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::BadRequest(format!("Cannot read {}: {}", path.display(), e))
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(Attachment { name, content })
}
