use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::{config::Config, error::FetchError};

const USER_AGENT: &str = concat!("ad-astra/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait HttpSource: Send + Sync {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<u8>, FetchError>;
}

pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpSource for HttpClient {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<u8>, FetchError> {
        let request_error = |source: reqwest::Error| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let data = response.bytes().await.map_err(request_error)?;
        Ok(data.to_vec())
    }
}

pub async fn fetch_json<T: DeserializeOwned>(
    http: &dyn HttpSource,
    url: &str,
    api_key: &str,
    extra: &[(&str, &str)],
) -> Result<T, FetchError> {
    let mut query = vec![("api_key", api_key)];
    query.extend_from_slice(extra);

    let body = http.get(url, &query).await?;
    serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
        url: url.to_string(),
        source,
    })
}

pub async fn retrieve_image(http: &dyn HttpSource, url: &str) -> Result<Vec<u8>, FetchError> {
    http.get(url, &[]).await
}
