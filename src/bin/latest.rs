use ad_astra::{
    config::Config,
    reader::{self, APOD_PREFIX},
    store::S3Store,
};
use anyhow::Result;
use lambda_runtime::tracing;

#[tokio::main]
async fn main() -> Result<()> {
    tracing::init_default_subscriber();

    let config = Config::from_env()?;
    let store = S3Store::from_env().await;
    let latest = reader::latest_for_display(&store, &config.bucket, APOD_PREFIX).await;

    println!("{}", serde_json::to_string_pretty(&latest)?);
    Ok(())
}
