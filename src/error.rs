use reqwest::StatusCode;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with {status}")]
    Status { url: String, status: StatusCode },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("existence check for '{key}' failed: {source}")]
    Probe {
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("upload of '{key}' failed: {source}")]
    Put {
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("listing '{prefix}' failed: {source}")]
    List {
        prefix: String,
        #[source]
        source: BoxError,
    },

    #[error("download of '{key}' failed: {source}")]
    Get {
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("could not decode '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode metadata for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataShapeError {
    #[error("{feed} record has no image url")]
    MissingImageUrl { feed: &'static str },

    #[error("{feed} record has no {field}")]
    MissingField {
        feed: &'static str,
        field: &'static str,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has an invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}
