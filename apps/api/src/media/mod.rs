//! Upload persistence. Every accepted image is written once and never cleaned up.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use uuid::Uuid;

pub mod local;
pub mod s3;

pub use local::LocalDiskStore;
pub use s3::S3MediaStore;

/// URL prefix the local upload directory is served under.
pub const UPLOADS_PREFIX: &str = "/uploads";

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("S3 upload failed: {0}")]
    S3(String),
}

/// An uploaded file as received from the multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Bytes,
    pub content_type: String,
    pub original_name: Option<String>,
}

/// Where a saved upload can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaLocation {
    /// Served by this relay under `UPLOADS_PREFIX`.
    Local,
    /// Absolute public URL in an object store.
    Remote(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    pub filename: String,
    pub location: MediaLocation,
}

impl StoredMedia {
    /// Public URL; `base_url` is `<scheme>://<host>` of the relay and only used for local files.
    pub fn public_url(&self, base_url: &str) -> String {
        match &self.location {
            MediaLocation::Local => format!(
                "{}{UPLOADS_PREFIX}/{}",
                base_url.trim_end_matches('/'),
                self.filename
            ),
            MediaLocation::Remote(url) => url.clone(),
        }
    }
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn save(&self, upload: &Upload) -> Result<StoredMedia, MediaError>;
}

/// `<uuid>.<ext>`, taking the extension from the client filename or the media type.
pub fn generate_filename(upload: &Upload) -> String {
    let id = Uuid::new_v4().simple();
    match extension_for(upload) {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}

fn extension_for(upload: &Upload) -> Option<String> {
    let from_name = upload
        .original_name
        .as_deref()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| (1..=5).contains(&ext.len()) && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    from_name.or_else(|| {
        let ext = match upload.content_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            "image/heic" => "heic",
            _ => return None,
        };
        Some(ext.to_string())
    })
}
