use std::sync::Arc;

use hnb_core::{config::Config, content::ContentSource};
use hnb_hn::HnClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hnb_core::logging::init("hnb")?;

    let cfg = Arc::new(Config::load()?);
    tracing::info!(api = %cfg.hn_api_base, "using Hacker News API");

    let content: Arc<dyn ContentSource> =
        Arc::new(HnClient::new(cfg.hn_api_base.clone(), cfg.http_timeout)?);

    hnb_telegram::router::run(cfg, content).await
}
