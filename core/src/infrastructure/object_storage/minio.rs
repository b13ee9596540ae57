use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Credentials, Region},
};
use tracing::instrument;

use crate::domain::{
    common::{ObjectStorageConfig, entities::app_errors::CoreError},
    synchronization::ports::ObjectStoragePort,
};

#[derive(Clone)]
pub struct MinioObjectStorage {
    client: Client,
    bucket: String,
}

impl MinioObjectStorage {
    pub fn new(config: ObjectStorageConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "quarry",
        );

        let endpoint = config.endpoint.trim_end_matches('/');

        tracing::info!(
            endpoint = %endpoint,
            region = %config.region,
            bucket = %config.bucket,
            "Initializing MinIO client"
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// Maps a stored file reference to its object key inside the bucket.
///
/// Absolute URLs keep only their path, and a leading bucket segment is
/// dropped: `https://cdn/catalog/products/a.png` -> `products/a.png`.
pub fn object_key<'a>(bucket: &str, uri: &'a str) -> &'a str {
    let path = match uri.split_once("://") {
        Some((_, rest)) => rest.find('/').map(|index| &rest[index..]).unwrap_or(""),
        None => uri,
    };
    let path = path.trim_start_matches('/');

    path.strip_prefix(bucket)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(path)
}

impl ObjectStoragePort for MinioObjectStorage {
    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn delete_object(&self, object_key: &str) -> Result<(), CoreError> {
        let key = self::object_key(&self.bucket, object_key);

        if key.is_empty() {
            tracing::warn!(uri = %object_key, "Skipping delete of an empty object key");
            return Ok(());
        }

        tracing::info!(object_key = %key, "Deleting object from storage");

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    object_key = %key,
                    "Failed to delete object"
                );
                CoreError::ObjectStorageError(format!("Failed to delete object: {}", e))
            })?;

        tracing::info!(object_key = %key, "Object deleted successfully");

        Ok(())
    }
}
