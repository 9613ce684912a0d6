use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;

use super::{generate_filename, MediaError, MediaLocation, MediaStore, StoredMedia, Upload};
use crate::config::S3Config;

const KEY_PREFIX: &str = "reports";

/// Pushes uploads to an S3-compatible bucket and hands back its public link.
#[derive(Clone)]
pub struct S3MediaStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_url: String,
}

impl S3MediaStore {
    /// Constructs an S3 client for MinIO-style endpoints or AWS proper.
    pub async fn connect(config: &S3Config) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "civicflow-static",
        );

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        info!("S3 media store initialized (bucket: {})", config.bucket);

        Self {
            client: aws_sdk_s3::Client::new(&sdk_config),
            bucket: config.bucket.clone(),
            public_url: config.public_url.clone(),
        }
    }
}

pub fn object_key(filename: &str) -> String {
    format!("{KEY_PREFIX}/{filename}")
}

#[async_trait]
impl MediaStore for S3MediaStore {
    async fn save(&self, upload: &Upload) -> Result<StoredMedia, MediaError> {
        let filename = generate_filename(upload);
        let key = object_key(&filename);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(upload.bytes.clone()))
            .content_type(&upload.content_type)
            .send()
            .await
            .map_err(|e| MediaError::S3(e.to_string()))?;

        info!("Uploaded report image to s3://{}/{}", self.bucket, key);

        Ok(StoredMedia {
            location: MediaLocation::Remote(format!("{}/{}", self.public_url, key)),
            filename,
        })
    }
}
