//! Market data model: price quotes, the sentiment classifier and the global
//! market snapshot.

use crate::{domain::AssetId, locale::Locale};

/// Spot price of one tracked asset.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceQuote {
    pub symbol: AssetId,
    pub usd_price: f64,
    pub change_24h_pct: f64,
}

/// Fear & Greed bucket derived from the 0-100 sentiment index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SentimentLabel {
    ExtremeFear,
    Fear,
    Greed,
    ExtremeGreed,
    Invalid,
}

impl SentimentLabel {
    pub fn text(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::ExtremeFear, Locale::En) => "Extreme Fear",
            (Self::Fear, Locale::En) => "Fear",
            (Self::Greed, Locale::En) => "Greed",
            (Self::ExtremeGreed, Locale::En) => "Extreme Greed",
            (Self::Invalid, Locale::En) => "Invalid value",
            (Self::ExtremeFear, Locale::Ru) => "Крайний страх",
            (Self::Fear, Locale::Ru) => "Страх",
            (Self::Greed, Locale::Ru) => "Жадность",
            (Self::ExtremeGreed, Locale::Ru) => "Крайняя жадность",
            (Self::Invalid, Locale::Ru) => "Некорректное значение",
        }
    }
}

/// Classify a sentiment index. Values outside 0-100 are `Invalid`, never clamped.
pub fn classify(index: i64) -> SentimentLabel {
    match index {
        0..=24 => SentimentLabel::ExtremeFear,
        25..=49 => SentimentLabel::Fear,
        50..=74 => SentimentLabel::Greed,
        75..=100 => SentimentLabel::ExtremeGreed,
        _ => SentimentLabel::Invalid,
    }
}

/// Sentiment and dominance figures for one report.
///
/// Fields are private so the label always matches the index and the altcoin
/// share is always the complement of the BTC share.
#[derive(Clone, Debug, PartialEq)]
pub struct MarketSnapshot {
    sentiment_index: i64,
    sentiment_label: SentimentLabel,
    btc_dominance_pct: f64,
    altcoin_dominance_pct: f64,
    total_market_cap_usd: Option<f64>,
    market_cap_change_24h_pct: Option<f64>,
}

impl MarketSnapshot {
    pub fn new(sentiment_index: i64, btc_dominance_pct: f64) -> Self {
        Self {
            sentiment_index,
            sentiment_label: classify(sentiment_index),
            btc_dominance_pct,
            altcoin_dominance_pct: 100.0 - btc_dominance_pct,
            total_market_cap_usd: None,
            market_cap_change_24h_pct: None,
        }
    }

    pub fn with_market_cap(mut self, total_usd: f64, change_24h_pct: Option<f64>) -> Self {
        self.total_market_cap_usd = Some(total_usd);
        self.market_cap_change_24h_pct = change_24h_pct;
        self
    }

    pub fn sentiment_index(&self) -> i64 {
        self.sentiment_index
    }

    pub fn sentiment_label(&self) -> SentimentLabel {
        self.sentiment_label
    }

    pub fn btc_dominance_pct(&self) -> f64 {
        self.btc_dominance_pct
    }

    pub fn altcoin_dominance_pct(&self) -> f64 {
        self.altcoin_dominance_pct
    }

    pub fn total_market_cap_usd(&self) -> Option<f64> {
        self.total_market_cap_usd
    }

    pub fn market_cap_change_24h_pct(&self) -> Option<f64> {
        self.market_cap_change_24h_pct
    }
}

/// Why a market data fetch produced no usable data.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("{endpoint}: request failed: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("{endpoint}: unexpected http status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("{endpoint}: malformed response: {reason}")]
    Malformed { endpoint: String, reason: String },
}

impl FetchError {
    pub fn malformed(endpoint: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            endpoint: endpoint.to_string(),
            reason: reason.into(),
        }
    }
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_covers_every_valid_index() {
        for i in 0..=100 {
            let expected = match i {
                0..=24 => SentimentLabel::ExtremeFear,
                25..=49 => SentimentLabel::Fear,
                50..=74 => SentimentLabel::Greed,
                _ => SentimentLabel::ExtremeGreed,
            };
            assert_eq!(classify(i), expected, "index {i}");
        }
    }

    #[test]
    fn classify_boundaries() {
        assert_eq!(classify(24), SentimentLabel::ExtremeFear);
        assert_eq!(classify(25), SentimentLabel::Fear);
        assert_eq!(classify(49), SentimentLabel::Fear);
        assert_eq!(classify(50), SentimentLabel::Greed);
        assert_eq!(classify(74), SentimentLabel::Greed);
        assert_eq!(classify(75), SentimentLabel::ExtremeGreed);
    }

    #[test]
    fn classify_rejects_out_of_range_values() {
        for i in [-1, 101, i64::MIN, i64::MAX] {
            assert_eq!(classify(i), SentimentLabel::Invalid);
        }
        assert_eq!(SentimentLabel::Invalid.text(Locale::En), "Invalid value");
    }

    #[test]
    fn altcoin_dominance_is_complement_of_btc() {
        for btc in [0.0, 12.345, 49.999, 52.1, 61.87654321, 100.0] {
            let snap = MarketSnapshot::new(50, btc);
            let sum = snap.altcoin_dominance_pct() + snap.btc_dominance_pct();
            assert!((sum - 100.0).abs() < 1e-9, "btc {btc}: sum {sum}");
        }
    }

    #[test]
    fn snapshot_label_follows_index() {
        let snap = MarketSnapshot::new(12, 55.0).with_market_cap(2.4e12, Some(-1.5));
        assert_eq!(snap.sentiment_label(), SentimentLabel::ExtremeFear);
        assert_eq!(snap.total_market_cap_usd(), Some(2.4e12));
        assert_eq!(snap.market_cap_change_24h_pct(), Some(-1.5));
    }
}
