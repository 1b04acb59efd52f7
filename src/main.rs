use std::sync::{Arc, OnceLock};

use ad_astra::{
    config::Config,
    feed::Clients,
    http::HttpClient,
    store::S3Store,
};
use lambda_runtime::{run, service_fn, tracing, Error, LambdaEvent};

static CLIENTS: OnceLock<(Config, Clients)> = OnceLock::new();

async fn load() -> Result<(Config, Clients), Error> {
    let config = Config::from_env()?;
    let sdk_config = aws_config::load_from_env().await;
    let clients = Clients {
        http: Arc::new(HttpClient::new(&config)?),
        store: Arc::new(S3Store::new(&sdk_config)),
    };

    Ok((config, clients))
}

async fn handler(_event: LambdaEvent<serde_json::Value>) -> Result<serde_json::Value, Error> {
    let (config, clients) = match CLIENTS.get() {
        Some(loaded) => loaded,
        None => {
            let loaded = load().await?;
            CLIENTS.get_or_init(|| loaded)
        }
    };

    let summary = ad_astra::run_all(clients, config).await;
    tracing::info!("archive run finished for bucket {}", config.bucket);

    Ok(serde_json::to_value(summary)?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();
    run(service_fn(handler)).await?;

    Ok(())
}
