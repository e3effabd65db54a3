//! Files offered for analysis, and the checks they pass before upload.

use std::path::Path;

use tracing::debug;

use crate::error::ChatError;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// A file read into memory for a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Wrap in-memory bytes, deriving the MIME type from the file name.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        Self {
            mime_type: mime_type_for(&name).to_string(),
            size: bytes.len() as u64,
            name,
            bytes,
        }
    }

    /// Read a file from disk.
    ///
    /// The size limit is checked against metadata first so an oversized
    /// file is never read.
    pub async fn from_path(path: &Path, max_bytes: u64) -> Result<Self, ChatError> {
        let size = tokio::fs::metadata(path).await?.len();
        if size > max_bytes {
            return Err(ChatError::FileTooLarge {
                size,
                max: max_bytes,
            });
        }
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        debug!(file = %name, size, "Read upload file");
        Ok(Self::new(name, bytes))
    }

    /// Size check, then MIME allow-list check.
    pub fn validate(&self, max_bytes: u64, allowed_types: &[String]) -> Result<(), ChatError> {
        if self.size > max_bytes {
            return Err(ChatError::FileTooLarge {
                size: self.size,
                max: max_bytes,
            });
        }
        if !allowed_types.iter().any(|t| t == &self.mime_type) {
            return Err(ChatError::UnsupportedFileType(self.mime_type.clone()));
        }
        Ok(())
    }

    /// Text of the user-side chat record for this upload.
    pub fn display_label(&self) -> String {
        format!(
            "📎 Uploaded file: {} ({})",
            self.name,
            format_file_size(self.size)
        )
    }
}

fn mime_type_for(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Human-readable size with up to two decimals, e.g. `1.5 MB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{:.2}", scaled);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

// =============================================================================
// Tests
// =============================================================================
