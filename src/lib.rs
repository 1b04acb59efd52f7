use lambda_runtime::tracing;
use serde::Serialize;

pub mod apod;
pub mod archive;
pub mod config;
pub mod error;
pub mod feed;
pub mod http;
pub mod reader;
pub mod rover;
pub mod store;

#[cfg(test)]
mod testing;

use crate::{
    apod::ApodFeed,
    config::Config,
    feed::{Clients, Feed, RunReport},
    rover::RoverFeed,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FeedStatus {
    Success(RunReport),
    Error { message: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub apod: FeedStatus,
    pub rover: FeedStatus,
}

/// Runs both feeds. A failure in one is logged and does not stop the other.
pub async fn run_all(clients: &Clients, config: &Config) -> Summary {
    Summary {
        apod: run_feed(&ApodFeed::default(), clients, config).await,
        rover: run_feed(&RoverFeed, clients, config).await,
    }
}

async fn run_feed<F: Feed>(feed: &F, clients: &Clients, config: &Config) -> FeedStatus {
    match feed::run(feed, clients, config).await {
        Ok(report) => FeedStatus::Success(report),
        Err(e) => {
            tracing::error!("{} run failed: {e}", feed.name());
            FeedStatus::Error {
                message: e.to_string(),
            }
        }
    }
}
