// Uploads are decoded before anything is written, so a file that merely
// claims to be an image (by name or content type) is rejected.

use std::{collections::HashMap, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use bytes::Bytes;
use image::ImageFormat;
use thiserror::Error;
use tokio::{fs, sync::RwLock};
use uuid::Uuid;

use crate::ids::PostId;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("upload is not a decodable image")]
    InvalidImage,
    #[error("media storage failed")]
    Io(#[from] std::io::Error),
}

/// Checks that `data` decodes as a raster image and returns its format.
pub fn validate_image(data: &[u8]) -> Result<ImageFormat, MediaError> {
    let format = image::guess_format(data).map_err(|_| MediaError::InvalidImage)?;
    image::load_from_memory_with_format(data, format).map_err(|_| MediaError::InvalidImage)?;
    Ok(format)
}

/// Storage name for one upload of a post's image, e.g. `posts/<id>-<token>.png`.
///
/// Every call yields a new name, so a replacement never overwrites the file
/// the stored row still points at.
pub fn post_image_name(post_id: PostId, format: ImageFormat) -> String {
    let ext = format.extensions_str().first().copied().unwrap_or("img");
    format!("posts/{post_id}-{}.{ext}", Uuid::now_v7().simple())
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persists `data` under `name` and returns the stored path.
    async fn save(&self, name: &str, data: Bytes) -> Result<String, MediaError>;

    /// Removes `name`. Removing a missing file is not an error.
    async fn delete(&self, name: &str) -> Result<(), MediaError>;
}

/// Writes uploads below a root directory.
#[derive(Debug, Clone)]
pub struct FsMediaStore {
    root: PathBuf,
}

impl FsMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn save(&self, name: &str, data: Bytes) -> Result<String, MediaError> {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, &data).await?;

        tracing::debug!(name, bytes = data.len(), "stored media file");
        Ok(name.to_string())
    }

    async fn delete(&self, name: &str) -> Result<(), MediaError> {
        match fs::remove_file(self.root.join(name)).await {
            Ok(()) => {
                tracing::debug!(name, "removed media file");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Keeps uploads in memory. Handy for tests and throwaway instances.
#[derive(Debug, Clone, Default)]
pub struct MemoryMediaStore {
    files: Arc<RwLock<HashMap<String, Bytes>>>,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, name: &str) -> Option<Bytes> {
        self.files.read().await.get(name).cloned()
    }

    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn save(&self, name: &str, data: Bytes) -> Result<String, MediaError> {
        self.files.write().await.insert(name.to_string(), data);
        Ok(name.to_string())
    }

    async fn delete(&self, name: &str) -> Result<(), MediaError> {
        self.files.write().await.remove(name);
        Ok(())
    }
}
