use std::path::Path;

use lambda_runtime::tracing;
use serde::Serialize;

use crate::{error::StoreError, store::ObjectStore};

const IMAGE_CONTENT_TYPE: &str = "image/jpeg";
const JSON_CONTENT_TYPE: &str = "application/json";
const DATA_FILE: &str = "data.json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveKey {
    pub prefix: String,
    pub image_key: String,
    pub data_key: String,
}

impl ArchiveKey {
    pub fn new(prefix: impl Into<String>, image_url: &str) -> Self {
        let prefix = prefix.into();
        Self {
            image_key: format!("{prefix}/{}", basename(image_url)),
            data_key: format!("{prefix}/{DATA_FILE}"),
            prefix,
        }
    }
}

pub fn basename(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

pub fn file_stem(url: &str) -> &str {
    let name = basename(url);
    Path::new(name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(name)
}

#[derive(Debug)]
pub enum ArchiveOutcome {
    Stored,
    AlreadyExists,
    StoreFailed(StoreError),
}

pub struct Archiver<'a> {
    store: &'a dyn ObjectStore,
    bucket: &'a str,
    probe_metadata: bool,
}

impl<'a> Archiver<'a> {
    pub fn new(store: &'a dyn ObjectStore, bucket: &'a str) -> Self {
        Self {
            store,
            bucket,
            probe_metadata: false,
        }
    }

    pub fn probe_metadata(mut self, enabled: bool) -> Self {
        self.probe_metadata = enabled;
        self
    }

    // The two writes are independent, a failed metadata write leaves the image.
    pub async fn archive<T>(
        &self,
        key: &ArchiveKey,
        image: Vec<u8>,
        metadata: &T,
    ) -> ArchiveOutcome
    where
        T: Serialize + ?Sized + Sync,
    {
        match self.is_archived(key).await {
            Ok(true) => {
                tracing::info!("object '{}' already exists, skipping", key.image_key);
                return ArchiveOutcome::AlreadyExists;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::error!("error checking object existence: {e}");
                return ArchiveOutcome::StoreFailed(e);
            }
        }

        match self.write(key, image, metadata).await {
            Ok(()) => {
                tracing::info!(
                    "image and data.json stored: s3://{}/{}",
                    self.bucket,
                    key.prefix
                );
                ArchiveOutcome::Stored
            }
            Err(e) => {
                tracing::error!("error uploading to s3: {e}");
                ArchiveOutcome::StoreFailed(e)
            }
        }
    }

    async fn is_archived(&self, key: &ArchiveKey) -> Result<bool, StoreError> {
        let image = self.store.exists(self.bucket, &key.image_key).await?;
        if !image || !self.probe_metadata {
            return Ok(image);
        }

        let data = self.store.exists(self.bucket, &key.data_key).await?;
        if !data {
            tracing::warn!("'{}' has no {DATA_FILE}, archiving again", key.prefix);
        }
        Ok(data)
    }

    async fn write<T>(
        &self,
        key: &ArchiveKey,
        image: Vec<u8>,
        metadata: &T,
    ) -> Result<(), StoreError>
    where
        T: Serialize + ?Sized + Sync,
    {
        let json = serde_json::to_vec(metadata).map_err(|source| StoreError::Encode {
            key: key.data_key.clone(),
            source,
        })?;

        self.store
            .put(self.bucket, &key.image_key, image, IMAGE_CONTENT_TYPE)
            .await?;
        self.store
            .put(self.bucket, &key.data_key, json, JSON_CONTENT_TYPE)
            .await?;

        Ok(())
    }
}
