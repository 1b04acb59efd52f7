use async_trait::async_trait;
use lambda_runtime::tracing;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    archive::file_stem,
    config::Config,
    error::{DataShapeError, FetchError},
    feed::Feed,
    http::{fetch_json, HttpSource},
};

const FEED: &str = "APOD";

// Stored as received, `null`s and key order included.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ApodRecord(Map<String, Value>);

impl ApodRecord {
    fn text(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn hdurl(&self) -> Option<&str> {
        self.text("hdurl")
    }

    pub fn url(&self) -> Option<&str> {
        self.text("url")
    }

    pub fn image_url(&self) -> Option<&str> {
        self.hdurl().or_else(|| self.url())
    }
}

pub struct ApodFeed {
    root: String,
}

impl Default for ApodFeed {
    fn default() -> Self {
        Self::with_root("Images/APOD")
    }
}

impl ApodFeed {
    pub fn with_root(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Feed for ApodFeed {
    type Record = ApodRecord;

    fn name(&self) -> &'static str {
        FEED
    }

    async fn fetch(
        &self,
        http: &dyn HttpSource,
        config: &Config,
    ) -> Result<Vec<ApodRecord>, FetchError> {
        let url = &config.apod_endpoint;
        let data: Value = fetch_json(http, url, &config.api_key, &[("hd", "True")]).await?;

        let empty = match &data {
            Value::Null => true,
            Value::Object(fields) => fields.is_empty(),
            _ => false,
        };
        if empty {
            return Ok(Vec::new());
        }

        let record = serde_json::from_value(data).map_err(|source| FetchError::Decode {
            url: url.clone(),
            source,
        })?;
        Ok(vec![record])
    }

    fn image_url<'r>(&self, record: &'r ApodRecord) -> Result<&'r str, DataShapeError> {
        if record.hdurl().is_none() && record.url().is_some() {
            tracing::info!("no hdurl in APOD data, using url");
        }
        record
            .image_url()
            .ok_or(DataShapeError::MissingImageUrl { feed: FEED })
    }

    fn key_prefix(
        &self,
        _record: &ApodRecord,
        image_url: &str,
    ) -> Result<String, DataShapeError> {
        Ok(format!("{}/{}", self.root, file_stem(image_url)))
    }
}
