//! Object storage for uploaded media.
//!
//! Handlers only consume the public URL and byte size of a stored asset;
//! everything else about the backend stays behind [`ObjectStorage`].

pub mod local;

use async_trait::async_trait;
use thiserror::Error;

pub use local::LocalStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("File exceeds the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// What the rest of the service needs to know about a stored file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub key: String,
    pub url: String,
    pub size: u64,
}

/// Destination folder per upload kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Folder {
    Videos,
    Thumbnails,
    Covers,
    Audio,
}

impl Folder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Folder::Videos => "videos",
            Folder::Thumbnails => "thumbnails",
            Folder::Covers => "covers",
            Folder::Audio => "audio",
        }
    }
}

pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "video/mp4",
    "video/mkv",
    "video/x-matroska",
    "video/avi",
    "video/x-msvideo",
    "video/quicktime",
    "audio/mpeg",
    "audio/mp4",
    "audio/aac",
    "audio/wav",
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
];

/// Checks type and size before anything is written
pub fn validate(content_type: &str, size: usize, limit: usize) -> StorageResult<()> {
    let mime = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    if !ALLOWED_MIME_TYPES.contains(&mime.as_str()) {
        return Err(StorageError::UnsupportedType(content_type.to_string()));
    }
    if size > limit {
        return Err(StorageError::TooLarge { limit });
    }
    Ok(())
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `data` under a fresh key in `folder`
    async fn put(
        &self,
        folder: Folder,
        original_name: Option<&str>,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<UploadedAsset>;

    async fn delete(&self, key: &str) -> StorageResult<()>;
}
