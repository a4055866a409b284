use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Identifies the input a progress record belongs to
pub struct InputIdentifier;

impl InputIdentifier {
    /// `input_` followed by the first 16 hex chars of the SHA-256 of the text
    pub fn for_text(text: &str) -> String {
        let digest = Sha256::digest(text.as_bytes());
        let hex = format!("{:x}", digest);
        format!("input_{}", &hex[..16])
    }

    /// `file_<basename>_<mtime ms>`, so editing the file starts a new session
    pub async fn for_file(path: &Path) -> std::io::Result<String> {
        let metadata = tokio::fs::metadata(path).await?;
        let modified_ms = metadata
            .modified()?
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(format!("file_{}_{}", name, modified_ms))
    }
}
