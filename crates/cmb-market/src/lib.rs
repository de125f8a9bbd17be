//! Market data adapter (CoinGecko + alternative.me Fear & Greed).
//!
//! Implements the `cmb-core` MarketDataSource port over plain HTTP GETs:
//! - `{coingecko}/simple/price` for spot prices and 24h change
//! - `{coingecko}/global` for BTC dominance and total market cap
//! - `{fear_greed}` for the sentiment index
//!
//! No retries and no caching: one request per endpoint per report.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, warn};

use cmb_core::{
    config::Config,
    domain::AssetId,
    errors::Error,
    market::{FetchError, FetchResult, MarketSnapshot, PriceQuote},
    ports::MarketDataSource,
    Result,
};

const USER_AGENT: &str = concat!("cmb/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug)]
pub struct MarketApiClient {
    http: reqwest::Client,
    coingecko_url: String,
    fear_greed_url: String,
}

impl MarketApiClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(cfg.http_connect_timeout)
            .timeout(cfg.http_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::External(format!("http client build failed: {e}")))?;

        Ok(Self {
            http,
            coingecko_url: cfg.coingecko_api_url.clone(),
            fear_greed_url: cfg.fear_greed_api_url.clone(),
        })
    }

    fn price_url(&self) -> String {
        format!("{}/simple/price", self.coingecko_url)
    }

    fn global_url(&self) -> String {
        format!("{}/global", self.coingecko_url)
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> FetchResult<serde_json::Value> {
        debug!("GET {url}");
        let resp = self.http.get(url).query(query).send().await.map_err(|e| {
            warn!("market data request to {url} failed: {e}");
            FetchError::Transport {
                endpoint: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(
                "market data request to {url} returned {status}: {}",
                body.chars().take(200).collect::<String>()
            );
            return Err(FetchError::Status {
                endpoint: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.json::<serde_json::Value>().await.map_err(|e| {
            warn!("market data response from {url} is not valid json: {e}");
            FetchError::malformed(url, e.to_string())
        })
    }
}

#[async_trait]
impl MarketDataSource for MarketApiClient {
    async fn fetch_prices(&self, assets: &[AssetId]) -> FetchResult<Vec<PriceQuote>> {
        let url = self.price_url();
        let ids = assets
            .iter()
            .map(AssetId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let body = self
            .get_json(
                &url,
                &[
                    ("ids", ids.as_str()),
                    ("vs_currencies", "usd"),
                    ("include_24hr_change", "true"),
                ],
            )
            .await?;

        parse_prices(&url, body, assets).inspect_err(|e| warn!("{e}"))
    }

    async fn fetch_snapshot(&self) -> FetchResult<MarketSnapshot> {
        let fng = self.get_json(&self.fear_greed_url, &[]).await?;
        let sentiment_index =
            parse_fear_greed(&self.fear_greed_url, fng).inspect_err(|e| warn!("{e}"))?;

        let url = self.global_url();
        let global = self.get_json(&url, &[]).await?;
        let global = parse_global(&url, global).inspect_err(|e| warn!("{e}"))?;

        let snapshot = MarketSnapshot::new(sentiment_index, global.btc_dominance_pct);
        Ok(match global.total_market_cap_usd {
            Some(cap) => snapshot.with_market_cap(cap, global.market_cap_change_24h_pct),
            None => snapshot,
        })
    }
}

// === Response parsing ===

#[derive(Debug, Deserialize)]
struct SimplePrice {
    usd: Option<f64>,
    usd_24h_change: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FearGreedResponse {
    data: Vec<FearGreedData>,
}

#[derive(Debug, Deserialize)]
struct FearGreedData {
    // Published as a numeric string ("45").
    value: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GlobalResponse {
    data: GlobalData,
}

#[derive(Debug, Deserialize)]
struct GlobalData {
    market_cap_percentage: HashMap<String, f64>,
    #[serde(default)]
    total_market_cap: HashMap<String, f64>,
    market_cap_change_percentage_24h_usd: Option<f64>,
}

/// Dominance and market cap figures from `/global`.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobalStats {
    pub btc_dominance_pct: f64,
    pub total_market_cap_usd: Option<f64>,
    pub market_cap_change_24h_pct: Option<f64>,
}

fn decode<T: DeserializeOwned>(endpoint: &str, body: serde_json::Value) -> FetchResult<T> {
    serde_json::from_value(body).map_err(|e| FetchError::malformed(endpoint, e.to_string()))
}

/// Quotes in the order the response lists them. Every requested asset must be
/// present with both a price and a 24h change; ids that were not requested are
/// skipped.
pub fn parse_prices(
    endpoint: &str,
    body: serde_json::Value,
    assets: &[AssetId],
) -> FetchResult<Vec<PriceQuote>> {
    // Object key order is kept (serde_json `preserve_order`).
    let serde_json::Value::Object(entries) = body else {
        return Err(FetchError::malformed(endpoint, "expected an object keyed by asset id"));
    };
    if let Some(id) = assets.iter().find(|id| !entries.contains_key(id.as_str())) {
        return Err(FetchError::malformed(endpoint, format!("no quote for {id}")));
    }

    entries
        .into_iter()
        .filter_map(|(key, value)| {
            assets
                .iter()
                .find(|id| id.as_str() == key)
                .map(|id| (id.clone(), value))
        })
        .map(|(id, value)| -> FetchResult<PriceQuote> {
            let entry: SimplePrice = decode(endpoint, value)?;
            let usd_price = entry
                .usd
                .ok_or_else(|| FetchError::malformed(endpoint, format!("{id}: missing usd")))?;
            let change_24h_pct = entry.usd_24h_change.ok_or_else(|| {
                FetchError::malformed(endpoint, format!("{id}: missing usd_24h_change"))
            })?;
            Ok(PriceQuote {
                symbol: id,
                usd_price,
                change_24h_pct,
            })
        })
        .collect()
}

/// Latest sentiment index (`data[0].value`). Out-of-range values are passed
/// through; classification handles them.
pub fn parse_fear_greed(endpoint: &str, body: serde_json::Value) -> FetchResult<i64> {
    let resp: FearGreedResponse = decode(endpoint, body)?;
    let latest = resp
        .data
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::malformed(endpoint, "empty data array"))?;

    let parsed = match &latest.value {
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        serde_json::Value::Number(n) => n.as_i64(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        FetchError::malformed(
            endpoint,
            format!("data[0].value is not an integer: {}", latest.value),
        )
    })
}

pub fn parse_global(endpoint: &str, body: serde_json::Value) -> FetchResult<GlobalStats> {
    let resp: GlobalResponse = decode(endpoint, body)?;
    let btc_dominance_pct = resp
        .data
        .market_cap_percentage
        .get("btc")
        .copied()
        .ok_or_else(|| FetchError::malformed(endpoint, "missing market_cap_percentage.btc"))?;

    Ok(GlobalStats {
        btc_dominance_pct,
        total_market_cap_usd: resp.data.total_market_cap.get("usd").copied(),
        market_cap_change_24h_pct: resp.data.market_cap_change_percentage_24h_usd,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;

    fn assets(ids: &[&str]) -> Vec<AssetId> {
        ids.iter().map(|s| AssetId::new(*s)).collect()
    }

    fn assert_malformed<T: std::fmt::Debug>(res: FetchResult<T>) {
        match res {
            Err(FetchError::Malformed { .. }) => {}
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn prices_follow_response_order() {
        let body = json!({
            "binancecoin": {"usd": 580.1, "usd_24h_change": 0.5},
            "bitcoin": {"usd": 65432.1, "usd_24h_change": -3.456},
            "solana": {"usd": 145.0, "usd_24h_change": 4.0},
            "ethereum": {"usd": 3120.5, "usd_24h_change": 1.2}
        });
        let quotes = parse_prices(
            "price",
            body,
            &assets(&["bitcoin", "ethereum", "binancecoin", "solana"]),
        )
        .unwrap();

        let ids: Vec<&str> = quotes.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(ids, vec!["binancecoin", "bitcoin", "solana", "ethereum"]);
        assert_eq!(quotes[1].usd_price, 65432.1);
        assert_eq!(quotes[1].change_24h_pct, -3.456);
    }

    #[test]
    fn raw_response_order_is_kept_and_extra_ids_skipped() {
        let body: serde_json::Value = serde_json::from_str(
            r#"{
                "solana": {"usd": 145.0, "usd_24h_change": 4.0},
                "dogecoin": {"usd": 0.1},
                "bitcoin": {"usd": 65432.1, "usd_24h_change": -3.456}
            }"#,
        )
        .unwrap();
        let quotes = parse_prices("price", body, &assets(&["bitcoin", "solana"])).unwrap();

        let ids: Vec<&str> = quotes.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(ids, vec!["solana", "bitcoin"]);
    }

    #[test]
    fn missing_asset_or_field_fails_whole_price_fetch() {
        let ids = assets(&["bitcoin", "solana"]);
        assert_malformed(parse_prices(
            "price",
            json!({"bitcoin": {"usd": 1.0, "usd_24h_change": 0.1}}),
            &ids,
        ));
        assert_malformed(parse_prices(
            "price",
            json!({
                "bitcoin": {"usd": 1.0, "usd_24h_change": 0.1},
                "solana": {"usd": 2.0}
            }),
            &ids,
        ));
        assert_malformed(parse_prices(
            "price",
            json!({"error": "rate limited"}),
            &ids,
        ));
    }

    #[test]
    fn fear_greed_value_accepts_string_or_number() {
        let body = json!({
            "name": "Fear and Greed Index",
            "data": [{"value": "45", "value_classification": "Fear", "timestamp": "1718928000"}],
            "metadata": {"error": null}
        });
        assert_eq!(parse_fear_greed("fng", body).unwrap(), 45);
        assert_eq!(
            parse_fear_greed("fng", json!({"data": [{"value": 77}]})).unwrap(),
            77
        );
        // Out of range is passed through for the classifier to flag.
        assert_eq!(
            parse_fear_greed("fng", json!({"data": [{"value": "140"}]})).unwrap(),
            140
        );
    }

    #[test]
    fn fear_greed_rejects_missing_or_garbage_values() {
        assert_malformed(parse_fear_greed("fng", json!({"data": []})));
        assert_malformed(parse_fear_greed("fng", json!({"data": [{"value": "high"}]})));
        assert_malformed(parse_fear_greed("fng", json!({"data": [{}]})));
        assert_malformed(parse_fear_greed("fng", json!({"metadata": {}})));
    }

    #[test]
    fn global_stats_with_and_without_market_cap() {
        let full = json!({
            "data": {
                "active_cryptocurrencies": 14000,
                "total_market_cap": {"usd": 2.41e12, "eur": 2.2e12},
                "market_cap_percentage": {"btc": 54.3, "eth": 16.1},
                "market_cap_change_percentage_24h_usd": -1.75
            }
        });
        assert_eq!(
            parse_global("global", full).unwrap(),
            GlobalStats {
                btc_dominance_pct: 54.3,
                total_market_cap_usd: Some(2.41e12),
                market_cap_change_24h_pct: Some(-1.75),
            }
        );

        let minimal = json!({"data": {"market_cap_percentage": {"btc": 50.0}}});
        assert_eq!(
            parse_global("global", minimal).unwrap(),
            GlobalStats {
                btc_dominance_pct: 50.0,
                total_market_cap_usd: None,
                market_cap_change_24h_pct: None,
            }
        );
    }

    #[test]
    fn global_stats_require_btc_dominance() {
        assert_malformed(parse_global(
            "global",
            json!({"data": {"market_cap_percentage": {"eth": 16.1}}}),
        ));
        assert_malformed(parse_global("global", json!({"status": "down"})));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_failure() {
        let cfg = Config::from_lookup(|key| match key {
            "TELEGRAM_TOKEN" => Some("t".to_string()),
            "CHANNEL_ID" => Some("1".to_string()),
            "COINGECKO_API_URL" => Some("http://127.0.0.1:9/api/v3".to_string()),
            "FEAR_GREED_API_URL" => Some("http://127.0.0.1:9/fng/".to_string()),
            "HTTP_TIMEOUT_SECS" => Some("2".to_string()),
            _ => None,
        })
        .unwrap();
        let client = MarketApiClient::new(&cfg).unwrap();

        match client.fetch_prices(&assets(&["bitcoin"])).await {
            Err(FetchError::Transport { endpoint, .. }) => {
                assert_eq!(endpoint, "http://127.0.0.1:9/api/v3/simple/price")
            }
            other => panic!("expected transport failure, got {other:?}"),
        }
        assert!(matches!(
            client.fetch_snapshot().await,
            Err(FetchError::Transport { .. })
        ));
    }

    /// Local HTTP server answering every request with `response`.
    async fn serve_fixed(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut sock, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let mut request = Vec::new();
                    loop {
                        let n = sock.read(&mut buf).await.unwrap_or(0);
                        if n == 0 {
                            break;
                        }
                        request.extend_from_slice(&buf[..n]);
                        if request.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                    let _ = sock.write_all(response.as_bytes()).await;
                    let _ = sock.shutdown().await;
                });
            }
        });
        format!("http://{addr}")
    }

    fn client_for(base: &str) -> MarketApiClient {
        let cfg = Config::from_lookup(|key| match key {
            "TELEGRAM_TOKEN" => Some("t".to_string()),
            "CHANNEL_ID" => Some("1".to_string()),
            "COINGECKO_API_URL" => Some(format!("{base}/api/v3")),
            "FEAR_GREED_API_URL" => Some(format!("{base}/fng/")),
            "HTTP_TIMEOUT_SECS" => Some("5".to_string()),
            _ => None,
        })
        .unwrap();
        MarketApiClient::new(&cfg).unwrap()
    }

    #[tokio::test]
    async fn rate_limited_response_is_a_status_failure() {
        let base = serve_fixed(
            "HTTP/1.1 429 Too Many Requests\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let client = client_for(&base);

        match client.fetch_prices(&assets(&["bitcoin"])).await {
            Err(FetchError::Status { endpoint, status }) => {
                assert_eq!(status, 429);
                assert_eq!(endpoint, format!("{base}/api/v3/simple/price"));
            }
            other => panic!("expected status failure, got {other:?}"),
        }
        assert!(matches!(
            client.fetch_snapshot().await,
            Err(FetchError::Status { status: 429, .. })
        ));
    }

    #[tokio::test]
    async fn non_json_success_body_is_malformed() {
        let base = serve_fixed(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 17\r\nConnection: close\r\n\r\n<html>oops</html>",
        )
        .await;
        let client = client_for(&base);

        assert_malformed(client.fetch_prices(&assets(&["bitcoin"])).await);
        assert_malformed(client.fetch_snapshot().await);
    }
}
