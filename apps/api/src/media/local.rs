use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{generate_filename, MediaError, MediaLocation, MediaStore, StoredMedia, Upload};

/// Writes uploads into a flat directory that the router serves statically.
#[derive(Debug, Clone)]
pub struct LocalDiskStore {
    dir: PathBuf,
}

impl LocalDiskStore {
    /// Creates the directory if needed.
    pub async fn create(dir: PathBuf) -> Result<Self, MediaError> {
        tokio::fs::create_dir_all(&dir).await?;
        info!("Serving uploads from {}", dir.display());
        Ok(Self { dir })
    }
}

#[async_trait]
impl MediaStore for LocalDiskStore {
    async fn save(&self, upload: &Upload) -> Result<StoredMedia, MediaError> {
        let filename = generate_filename(upload);
        let path = self.dir.join(&filename);
        tokio::fs::write(&path, &upload.bytes).await?;
        debug!("Saved upload ({} bytes) to {}", upload.bytes.len(), path.display());

        Ok(StoredMedia {
            filename,
            location: MediaLocation::Local,
        })
    }
}
