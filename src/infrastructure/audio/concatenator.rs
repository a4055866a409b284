use async_trait::async_trait;
use chrono::Utc;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;

#[derive(Debug, thiserror::Error)]
pub enum ConcatError {
    #[error("failed to write concat manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to move {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    ToolFailed {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("concatenation reported success but {0} was not created")]
    MissingOutput(PathBuf),
}

/// External utility that joins audio streams without re-encoding
#[async_trait]
pub trait ConcatTool: Send + Sync {
    /// Concatenate the files listed in `manifest` into `output`
    async fn concat(&self, manifest: &Path, output: &Path) -> Result<(), ConcatError>;
}

/// ffmpeg's concat demuxer with stream copy
pub struct FfmpegConcatTool {
    program: PathBuf,
}

impl FfmpegConcatTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(manifest: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-hide_banner",
            "-loglevel",
            "error",
            "-y",
            "-f",
            "concat",
            "-safe",
            "0",
            "-i",
        ]
        .iter()
        .map(OsString::from)
        .collect();
        args.push(manifest.as_os_str().to_os_string());
        args.push("-c".into());
        args.push("copy".into());
        args.push(output.as_os_str().to_os_string());
        args
    }
}

#[async_trait]
impl ConcatTool for FfmpegConcatTool {
    async fn concat(&self, manifest: &Path, output: &Path) -> Result<(), ConcatError> {
        let program = self.program.display().to_string();
        tracing::debug!(
            program = %program,
            manifest = %manifest.display(),
            output = %output.display(),
            "Running concatenation tool"
        );

        let result = Command::new(&self.program)
            .args(Self::args(manifest, output))
            .stdin(std::process::Stdio::null())
            .output()
            .await
            .map_err(|source| ConcatError::Launch {
                program: program.clone(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
        if !result.status.success() {
            return Err(ConcatError::ToolFailed {
                program,
                status: result.status.to_string(),
                stderr,
            });
        }
        if !stderr.is_empty() {
            tracing::warn!(
                program = %program,
                stderr = %stderr,
                "Concatenation tool reported warnings"
            );
        }

        Ok(())
    }
}

/// Merges per-chunk artifacts into the final output file
pub struct Concatenator {
    work_dir: PathBuf,
    tool: Arc<dyn ConcatTool>,
}

impl Concatenator {
    pub fn new(work_dir: impl Into<PathBuf>, tool: Arc<dyn ConcatTool>) -> Self {
        Self {
            work_dir: work_dir.into(),
            tool,
        }
    }

    /// Combine `artifact_paths` (in order) into `<work_dir>/<output_name_hint>.<ext>`
    ///
    /// - no artifacts: nothing happens, returns `Ok(None)`
    /// - one artifact: renamed to the output, the tool is not invoked
    /// - several: a manifest is written and handed to the tool; on success
    ///   the manifest and the artifacts are deleted
    ///
    /// On failure the artifacts (and manifest) are left in place so the call
    /// can be retried.
    pub async fn finalize(
        &self,
        artifact_paths: &[String],
        output_name_hint: &str,
    ) -> Result<Option<PathBuf>, ConcatError> {
        let Some(first) = artifact_paths.first() else {
            tracing::info!("No audio artifacts to finalize");
            return Ok(None);
        };

        let extension = Path::new(first)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("wav");
        let output = self
            .work_dir
            .join(format!("{}.{}", output_name_hint, extension));

        if artifact_paths.len() == 1 {
            tokio::fs::rename(first, &output)
                .await
                .map_err(|source| ConcatError::Rename {
                    from: PathBuf::from(first),
                    to: output.clone(),
                    source,
                })?;
            tracing::info!(output = %output.display(), "Single audio part moved to output");
            return Ok(Some(output));
        }

        let manifest = self
            .work_dir
            .join(format!(".concat_list_{}.txt", Utc::now().timestamp_millis()));
        tokio::fs::write(&manifest, self.manifest_contents(artifact_paths))
            .await
            .map_err(|source| ConcatError::Manifest {
                path: manifest.clone(),
                source,
            })?;

        tracing::info!(
            parts = artifact_paths.len(),
            manifest = %manifest.display(),
            output = %output.display(),
            "Concatenating audio parts"
        );

        self.tool.concat(&manifest, &output).await?;
        if !tokio::fs::try_exists(&output).await.unwrap_or(false) {
            return Err(ConcatError::MissingOutput(output));
        }

        remove_best_effort(&manifest).await;
        for artifact in artifact_paths {
            remove_best_effort(Path::new(artifact)).await;
        }

        tracing::info!(output = %output.display(), "Audio parts concatenated");
        Ok(Some(output))
    }

    /// `file '<path>'` per artifact, relative to the work dir when possible
    fn manifest_contents(&self, artifact_paths: &[String]) -> String {
        artifact_paths
            .iter()
            .map(|artifact| {
                let path = Path::new(artifact);
                let relative = path.strip_prefix(&self.work_dir).unwrap_or(path);
                let escaped = relative.to_string_lossy().replace('\'', r"'\''");
                format!("file '{}'\n", escaped)
            })
            .collect()
    }
}

/// Delete a file, logging instead of failing
pub async fn remove_best_effort(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Could not delete temporary file");
        }
    }
}
