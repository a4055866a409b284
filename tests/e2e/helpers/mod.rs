use anyhow::Result;
use narrator::domain::tts::{ProgressRecord, TtsService};
use narrator::infrastructure::audio::Concatenator;
use narrator::infrastructure::repositories::{
    FileProgressRepository, InMemoryProgressRepository, ProgressRepository,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub mod fakes;
pub mod fixtures;

pub use fakes::{FakeConcatTool, FakeTtsRepository, ScriptedGenerator};

/// Where the session state lives
pub enum ProgressBackend {
    /// `.tts_progress.json` inside the work dir, survives service rebuilds
    File,
    /// Records every saved snapshot
    Memory(Arc<InMemoryProgressRepository>),
}

pub struct TestContext {
    pub work_dir: TempDir,
    pub tts_repo: Arc<FakeTtsRepository>,
    pub concat_tool: Arc<FakeConcatTool>,
    pub max_chunk_length: usize,
    backend: ProgressBackend,
}

impl TestContext {
    pub fn new(max_chunk_length: usize) -> Result<Self> {
        Ok(Self {
            work_dir: tempfile::tempdir()?,
            tts_repo: Arc::new(FakeTtsRepository::new()),
            concat_tool: Arc::new(FakeConcatTool::new()),
            max_chunk_length,
            backend: ProgressBackend::File,
        })
    }

    pub fn with_memory_progress(max_chunk_length: usize) -> Result<Self> {
        let mut ctx = Self::new(max_chunk_length)?;
        ctx.backend = ProgressBackend::Memory(Arc::new(InMemoryProgressRepository::new()));
        Ok(ctx)
    }

    pub fn dir(&self) -> &Path {
        self.work_dir.path()
    }

    pub fn progress_path(&self) -> PathBuf {
        self.dir().join(".tts_progress.json")
    }

    pub fn progress_repo(&self) -> Arc<dyn ProgressRepository> {
        match &self.backend {
            ProgressBackend::File => Arc::new(FileProgressRepository::new(self.progress_path())),
            ProgressBackend::Memory(repo) => repo.clone(),
        }
    }

    /// Snapshots saved so far, only tracked by the memory backend
    pub fn saved_history(&self) -> Vec<ProgressRecord> {
        match &self.backend {
            ProgressBackend::File => Vec::new(),
            ProgressBackend::Memory(repo) => repo.saved_history(),
        }
    }

    /// Build a fresh service over the same work dir, like a new process would
    pub fn service(&self) -> TtsService {
        TtsService::new(
            self.tts_repo.clone(),
            self.progress_repo(),
            Concatenator::new(self.dir(), self.concat_tool.clone()),
            self.dir(),
            self.max_chunk_length,
        )
    }

    pub fn artifact_path(&self, index: usize, extension: &str) -> PathBuf {
        self.dir()
            .join(format!(".temp_tts_part_{}.{}", index, extension))
    }

    /// Seed the work dir as if an earlier run had completed `chunks`
    pub async fn seed_session(&self, input_identifier: &str, chunks: &[&str]) -> Result<()> {
        let mut record = ProgressRecord::fresh(input_identifier);
        for (index, chunk) in chunks.iter().enumerate() {
            let path = self.artifact_path(index, "mp3");
            std::fs::write(&path, fixtures::fake_audio(chunk))?;
            record.mark_completed(index, path.to_string_lossy());
        }
        self.progress_repo().save(&record).await?;
        Ok(())
    }

    /// File names in the work dir, sorted
    pub fn files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.dir())
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn output_files(&self) -> Vec<String> {
        self.files()
            .into_iter()
            .filter(|name| name.starts_with("tts_output_combined_"))
            .collect()
    }
}
