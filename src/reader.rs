use lambda_runtime::tracing;
use serde::Serialize;
use serde_json::Value;

use crate::{error::StoreError, store::ObjectStore};

pub const APOD_PREFIX: &str = "Images/APOD/";
const DATA_SUFFIX: &str = "/data.json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DisplayRecord {
    pub title: String,
    pub copyright: Option<String>,
    pub date: String,
    pub explanation: String,
    pub url: Option<String>,
}

impl DisplayRecord {
    fn from_metadata(data: &Value) -> Self {
        let field = |name: &str| data.get(name).and_then(Value::as_str).map(str::to_string);

        let url = field("hdurl").or_else(|| field("url"));
        if url.is_none() {
            tracing::warn!("no url found in archived metadata");
        }

        Self {
            title: field("title").unwrap_or_default(),
            copyright: field("copyright"),
            date: field("date").unwrap_or_default(),
            explanation: field("explanation").unwrap_or_default(),
            url,
        }
    }
}

/// The most recently archived metadata under `prefix`, if any. Store
/// failures, missing credentials included, come back as `Err`; see
/// [`latest_for_display`] for the front page's absent-on-failure view.
pub async fn get_latest(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: &str,
) -> Result<Option<DisplayRecord>, StoreError> {
    let objects = store.list(bucket, prefix).await?;

    let Some(latest) = objects
        .into_iter()
        .filter(|object| object.key.ends_with(DATA_SUFFIX))
        .max_by(|a, b| a.last_modified.cmp(&b.last_modified))
    else {
        tracing::info!("no archived metadata under '{prefix}'");
        return Ok(None);
    };

    let body = store.get(bucket, &latest.key).await?;
    let data: Value = serde_json::from_slice(&body).map_err(|source| StoreError::Decode {
        key: latest.key.clone(),
        source,
    })?;

    Ok(Some(DisplayRecord::from_metadata(&data)))
}

pub async fn latest_for_display(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: &str,
) -> Option<DisplayRecord> {
    get_latest(store, bucket, prefix)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("could not read latest entry: {e}");
            None
        })
}
