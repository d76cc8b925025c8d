use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::{Folder, ObjectStorage, StorageError, StorageResult, UploadedAsset};

/// Filesystem backend; files are served back under `public_url`
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    public_url: String,
}

impl LocalStorage {
    pub async fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!("Failed to create storage directory {}: {}", root.display(), e))
        })?;

        Ok(Self {
            root,
            public_url: public_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') || key.contains('\\') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.public_url, key)
    }
}

/// Lower-cased alphanumeric extension of the client's filename, if any
fn extension(original_name: Option<&str>) -> Option<String> {
    let ext = Path::new(original_name?).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn generate_key(folder: Folder, original_name: Option<&str>) -> String {
    match extension(original_name) {
        Some(ext) => format!("{}/{}.{}", folder.as_str(), Uuid::new_v4(), ext),
        None => format!("{}/{}", folder.as_str(), Uuid::new_v4()),
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn put(
        &self,
        folder: Folder,
        original_name: Option<&str>,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<UploadedAsset> {
        let key = generate_key(folder, original_name);
        let path = self.key_to_path(&key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Failed to create {}: {}", path.display(), e)))?;
        file.write_all(&data)
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Failed to write {}: {}", path.display(), e)))?;
        file.sync_all().await?;

        tracing::info!("Stored {} ({} bytes)", key, data.len());
        Ok(UploadedAsset {
            url: self.url_for(&key),
            size: data.len() as u64,
            key,
        })
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
