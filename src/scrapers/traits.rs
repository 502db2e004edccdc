use crate::scrapers::types::PriceQuote;
use anyhow::Result;
use async_trait::async_trait;

/// Common trait for price lookups by street address
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Look up the prices listed for an address
    async fn lookup(&self, address: &str) -> Result<PriceQuote>;

    /// Get the name of the price source
    fn source_name(&self) -> &'static str;
}
