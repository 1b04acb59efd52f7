use async_trait::async_trait;
use lambda_runtime::tracing;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::Config,
    error::{DataShapeError, FetchError},
    feed::{Feed, OnDuplicate},
    http::{fetch_json, HttpSource},
};

const FEED: &str = "Mars rover";
const ROOT: &str = "Images/Mars_Rovers";

// Photos archived per run
const BATCH_SIZE: usize = 3;

#[derive(Deserialize, Debug)]
struct LatestPhotos {
    #[serde(default)]
    latest_photos: Vec<Value>,
}

#[derive(Deserialize, Debug, Default)]
struct RawPhoto {
    sol: Option<u32>,
    earth_date: Option<String>,
    camera: Option<Camera>,
    img_src: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Camera {
    full_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RoverPhoto {
    pub photo_id: usize,
    pub sol: Option<u32>,
    pub earth_date: Option<String>,
    pub camera_name: Option<String>,
    pub image_url: Option<String>,
}

impl From<(usize, RawPhoto)> for RoverPhoto {
    fn from((photo_id, raw): (usize, RawPhoto)) -> Self {
        Self {
            photo_id,
            sol: raw.sol,
            earth_date: raw.earth_date,
            camera_name: raw.camera.and_then(|camera| camera.full_name),
            image_url: raw.img_src,
        }
    }
}

// Stops at the first photo already archived, everything after it in the
// batch went in on an earlier run.
#[derive(Default)]
pub struct RoverFeed;

#[async_trait]
impl Feed for RoverFeed {
    type Record = RoverPhoto;

    fn name(&self) -> &'static str {
        FEED
    }

    async fn fetch(
        &self,
        http: &dyn HttpSource,
        config: &Config,
    ) -> Result<Vec<RoverPhoto>, FetchError> {
        let latest: LatestPhotos =
            fetch_json(http, &config.rover_endpoint, &config.api_key, &[]).await?;
        let available = latest.latest_photos.len();

        let photos: Vec<RoverPhoto> = latest
            .latest_photos
            .into_iter()
            .take(BATCH_SIZE)
            .enumerate()
            .map(|(photo_id, entry)| {
                let raw = serde_json::from_value(entry).unwrap_or_else(|e| {
                    tracing::warn!("unreadable Mars photo {photo_id}: {e}");
                    RawPhoto::default()
                });
                RoverPhoto::from((photo_id, raw))
            })
            .collect();
        tracing::info!("fetched {} of {available} Mars photos", photos.len());

        Ok(photos)
    }

    fn image_url<'r>(&self, record: &'r RoverPhoto) -> Result<&'r str, DataShapeError> {
        record
            .image_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or(DataShapeError::MissingImageUrl { feed: FEED })
    }

    fn key_prefix(
        &self,
        record: &RoverPhoto,
        _image_url: &str,
    ) -> Result<String, DataShapeError> {
        let sol = record.sol.ok_or(DataShapeError::MissingField {
            feed: FEED,
            field: "sol",
        })?;
        Ok(format!("{ROOT}/{sol}/{}", record.photo_id))
    }

    fn on_duplicate(&self) -> OnDuplicate {
        OnDuplicate::Stop
    }
}
