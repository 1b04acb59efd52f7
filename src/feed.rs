use std::sync::Arc;

use async_trait::async_trait;
use lambda_runtime::tracing;
use serde::Serialize;

use crate::{
    archive::{ArchiveKey, ArchiveOutcome, Archiver},
    config::Config,
    error::{DataShapeError, FetchError},
    http::{self, HttpSource},
    store::ObjectStore,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnDuplicate {
    Continue,
    Stop,
}

#[async_trait]
pub trait Feed: Send + Sync {
    type Record: Serialize + Send + Sync;

    fn name(&self) -> &'static str;

    async fn fetch(
        &self,
        http: &dyn HttpSource,
        config: &Config,
    ) -> Result<Vec<Self::Record>, FetchError>;

    fn image_url<'r>(&self, record: &'r Self::Record) -> Result<&'r str, DataShapeError>;

    fn key_prefix(
        &self,
        record: &Self::Record,
        image_url: &str,
    ) -> Result<String, DataShapeError>;

    fn on_duplicate(&self) -> OnDuplicate {
        OnDuplicate::Continue
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub stored: usize,
    pub already_archived: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct Clients {
    pub http: Arc<dyn HttpSource>,
    pub store: Arc<dyn ObjectStore>,
}

/// Fetch, then retrieve and archive each record's image.
///
/// A failed metadata or image fetch aborts the feed. Store failures and
/// records without an image are logged and the batch carries on.
pub async fn run<F: Feed>(
    feed: &F,
    clients: &Clients,
    config: &Config,
) -> Result<RunReport, FetchError> {
    let records = feed.fetch(clients.http.as_ref(), config).await?;
    let mut report = RunReport::default();

    if records.is_empty() {
        tracing::info!("{} returned no records", feed.name());
        return Ok(report);
    }
    tracing::info!("fetched {} {} record(s)", records.len(), feed.name());

    let archiver = Archiver::new(clients.store.as_ref(), &config.bucket)
        .probe_metadata(config.probe_metadata);

    for record in &records {
        let (image_url, key) = match locate(feed, record) {
            Ok(located) => located,
            Err(e) => {
                tracing::warn!("skipping record: {e}");
                report.skipped += 1;
                continue;
            }
        };

        let image = http::retrieve_image(clients.http.as_ref(), image_url).await?;

        match archiver.archive(&key, image, record).await {
            ArchiveOutcome::Stored => report.stored += 1,
            ArchiveOutcome::AlreadyExists => {
                report.already_archived += 1;
                if feed.on_duplicate() == OnDuplicate::Stop {
                    tracing::info!("{} batch already archived, stopping", feed.name());
                    break;
                }
            }
            ArchiveOutcome::StoreFailed(_) => report.failed += 1,
        }
    }

    tracing::info!("{} run finished: {report:?}", feed.name());
    Ok(report)
}

fn locate<'r, F: Feed>(
    feed: &F,
    record: &'r F::Record,
) -> Result<(&'r str, ArchiveKey), DataShapeError> {
    let image_url = feed.image_url(record)?;
    let key = ArchiveKey::new(feed.key_prefix(record, image_url)?, image_url);
    Ok((image_url, key))
}
