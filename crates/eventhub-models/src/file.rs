use std::path::Path;
use thiserror::Error;

const FALLBACK_FILE_NAME: &str = "upload.bin";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum FileError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("file too large: {size} bytes (limit {limit})")]
    TooLarge { size: u64, limit: u64 },
}

/// A file picked locally and not yet uploaded.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

// Keep file contents out of logs.
impl std::fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl SelectedFile {
    /// Build from picker output. A missing or blank content type is guessed
    /// from the file name.
    pub fn new(file_name: impl Into<String>, content_type: Option<&str>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let file_name = if file_name.trim().is_empty() {
            FALLBACK_FILE_NAME.to_string()
        } else {
            file_name
        };
        let content_type = content_type
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| guess_content_type(&file_name));
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Read a file from disk, refusing anything larger than `limit` bytes.
    pub async fn from_path(path: &Path, limit: Option<u64>) -> Result<Self, FileError> {
        let meta = tokio::fs::metadata(path).await?;
        if let Some(limit) = limit {
            if meta.len() > limit {
                return Err(FileError::TooLarge {
                    size: meta.len(),
                    limit,
                });
            }
        }
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(FALLBACK_FILE_NAME);
        Ok(Self::new(file_name, None, bytes))
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn guess_content_type(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_raw()
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string()
}
