use clap::Parser;
use rtech_price_scout::config::{Cli, Command};
use rtech_price_scout::models::RtechPriceDto;
use rtech_price_scout::scrapers::{PriceSource, RtechBrowserSource};
use rtech_price_scout::server::{self, AppState};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = cli.browser.into_config();
    debug!("Browser config: {}", serde_json::to_string(&config)?);

    if let Some(proxy) = &config.proxy {
        info!("Routing Chrome through proxy {}", proxy);
    }

    let source = Arc::new(RtechBrowserSource::new(config));

    match cli.command {
        Command::Serve { bind } => {
            info!("🏠 R-TECH Price Scout v{}", env!("CARGO_PKG_VERSION"));
            server::run(bind, AppState::new(source)).await
        }
        Command::Crawl { address } => {
            let dto = match source.lookup(&address).await {
                Ok(quote) => RtechPriceDto::from_quote(&address, quote),
                Err(e) => {
                    warn!("Lookup failed: {:#}", e);
                    RtechPriceDto::failed(&address, &e)
                }
            };

            println!("{}", serde_json::to_string_pretty(&dto)?);
            Ok(())
        }
    }
}
