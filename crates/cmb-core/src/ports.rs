use async_trait::async_trait;

use crate::{
    domain::AssetId,
    market::{FetchResult, MarketSnapshot, PriceQuote},
};

/// Hexagonal port for market data providers.
///
/// Implementations log the underlying cause of a failure where it is detected
/// and hand back a `FetchError`; they never panic.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Spot USD prices with 24h change, in the order of `assets`.
    async fn fetch_prices(&self, assets: &[AssetId]) -> FetchResult<Vec<PriceQuote>>;

    /// Sentiment index plus BTC dominance (and total market cap when available).
    async fn fetch_snapshot(&self) -> FetchResult<MarketSnapshot>;
}
