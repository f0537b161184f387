//! Streaming file uploads with size and MIME allow-list enforcement
//!
//! A multipart field is written to a hidden `.part` file next to its target
//! and renamed into place once complete. A rejected or interrupted upload
//! never replaces the existing file.

use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::debug;

const MIB: u64 = 1024 * 1024;

/// Size and type limits for one kind of upload
#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    pub max_bytes: u64,
    pub allowed_types: &'static [&'static str],
    /// Shown to the operator when a type is rejected
    pub allowed_label: &'static str,
}

pub const IMAGE_UPLOAD: UploadPolicy = UploadPolicy {
    max_bytes: 5 * MIB,
    allowed_types: &["image/webp", "image/jpeg", "image/png", "image/gif"],
    allowed_label: "WebP, JPEG, PNG and GIF images",
};

pub const AUDIO_UPLOAD: UploadPolicy = UploadPolicy {
    max_bytes: 50 * MIB,
    allowed_types: &[
        "audio/mpeg",
        "audio/wav",
        "audio/ogg",
        "audio/mp4",
        "audio/flac",
        "audio/x-flac",
    ],
    allowed_label: "MP3, WAV, OGG, M4A and FLAC audio files",
};

/// Request body ceiling for a route accepting uploads under `policy`
pub const fn body_limit(policy: &UploadPolicy) -> usize {
    (policy.max_bytes + MIB) as usize
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file uploaded")]
    NoFile,

    #[error("Invalid file type ({found}). Only {allowed} are allowed.")]
    UnsupportedType { found: String, allowed: &'static str },

    #[error("File too large (max {} MB)", .max_bytes / MIB)]
    TooLarge { max_bytes: u64 },

    #[error("Upload failed: {0}")]
    Multipart(String),

    #[error("Could not store upload: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadPolicy {
    pub fn allows(&self, mime: &str) -> bool {
        self.allowed_types.contains(&mime)
    }

    /// Body-limit overruns surface as multipart errors with status 413
    pub fn multipart_error(&self, err: MultipartError) -> UploadError {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            UploadError::TooLarge {
                max_bytes: self.max_bytes,
            }
        } else {
            UploadError::Multipart(err.body_text())
        }
    }
}

/// Lowercase, drop parameters, and fold common aliases onto canonical names
pub fn normalize_mime(raw: &str) -> String {
    let essence = raw
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "audio/x-wav" | "audio/wave" | "audio/vnd.wave" => "audio/wav".to_string(),
        "audio/m4a" | "audio/x-m4a" => "audio/mp4".to_string(),
        "image/jpg" => "image/jpeg".to_string(),
        _ => essence,
    }
}

/// Declared part type, or the sniffed type when the client sent none
fn detect_mime(declared: Option<&str>, first_chunk: &[u8]) -> String {
    match declared.map(normalize_mime) {
        Some(mime) if !mime.is_empty() && mime != "application/octet-stream" => mime,
        _ => infer::get(first_chunk)
            .map(|kind| normalize_mime(kind.mime_type()))
            .unwrap_or_else(|| "application/octet-stream".to_string()),
    }
}

fn part_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!(".{}.part", name))
}

/// Stream one multipart field into `dest`, enforcing `policy`
///
/// Returns the number of bytes written.
pub async fn save_field(
    field: &mut Field<'_>,
    policy: &UploadPolicy,
    dest: &Path,
) -> Result<u64, UploadError> {
    let declared = field.content_type().map(str::to_string);

    let mut first = None;
    while let Some(chunk) = field.chunk().await.map_err(|e| policy.multipart_error(e))? {
        if !chunk.is_empty() {
            first = Some(chunk);
            break;
        }
    }
    let first = first.ok_or(UploadError::NoFile)?;

    let mime = detect_mime(declared.as_deref(), &first);
    if !policy.allows(&mime) {
        return Err(UploadError::UnsupportedType {
            found: mime,
            allowed: policy.allowed_label,
        });
    }

    let too_large = || UploadError::TooLarge {
        max_bytes: policy.max_bytes,
    };
    if first.len() as u64 > policy.max_bytes {
        return Err(too_large());
    }

    let tmp = part_path(dest);
    let mut file = tokio::fs::File::create(&tmp).await?;

    let written = async {
        file.write_all(&first).await?;
        let mut written = first.len() as u64;
        while let Some(chunk) = field.chunk().await.map_err(|e| policy.multipart_error(e))? {
            written += chunk.len() as u64;
            if written > policy.max_bytes {
                return Err(too_large());
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(written)
    }
    .await;
    drop(file);

    match written {
        Ok(written) => {
            if let Err(e) = tokio::fs::rename(&tmp, dest).await {
                let _ = tokio::fs::remove_file(&tmp).await;
                return Err(e.into());
            }
            debug!("Stored {} ({} bytes, {})", dest.display(), written, mime);
            Ok(written)
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&tmp).await;
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mime() {
        assert_eq!(normalize_mime("Audio/MPEG; charset=binary"), "audio/mpeg");
        assert_eq!(normalize_mime("audio/x-wav"), "audio/wav");
        assert_eq!(normalize_mime("image/jpg"), "image/jpeg");
    }

    #[test]
    fn test_policies() {
        assert!(AUDIO_UPLOAD.allows("audio/x-flac"));
        assert!(!AUDIO_UPLOAD.allows("video/mp4"));
        assert!(IMAGE_UPLOAD.allows("image/webp"));
        assert!(!IMAGE_UPLOAD.allows("image/svg+xml"));
        assert_eq!(IMAGE_UPLOAD.max_bytes, 5 * 1024 * 1024);
        assert_eq!(AUDIO_UPLOAD.max_bytes, 50 * 1024 * 1024);
    }

    #[test]
    fn test_detect_mime_prefers_declared_type() {
        let png_magic = b"\x89PNG\r\n\x1a\n0000";
        assert_eq!(detect_mime(Some("image/gif"), png_magic), "image/gif");
        assert_eq!(detect_mime(None, png_magic), "image/png");
        assert_eq!(
            detect_mime(Some("application/octet-stream"), png_magic),
            "image/png"
        );
        assert_eq!(detect_mime(None, b"plain text"), "application/octet-stream");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            UploadError::TooLarge {
                max_bytes: 5 * MIB
            }
            .to_string(),
            "File too large (max 5 MB)"
        );
    }

    #[test]
    fn test_part_path_is_hidden_sibling() {
        assert_eq!(
            part_path(Path::new("/w/My_Song.mp3")),
            PathBuf::from("/w/.My_Song.mp3.part")
        );
    }
}
