use std::{
    env, fs,
    path::Path,
    time::Duration,
};

use crate::{
    domain::{AssetId, Recipient},
    errors::Error,
    locale::Locale,
    scheduler::DailyTime,
    Result,
};

pub const DEFAULT_ASSETS: &[&str] = &["bitcoin", "ethereum", "binancecoin", "solana"];
pub const DEFAULT_REPORT_TIMES: &str = "08:00";
pub const DEFAULT_COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_FEAR_GREED_API_URL: &str = "https://api.alternative.me/fng/";

/// Typed configuration, loaded once at startup from the environment
/// (plus an optional `.env` file).
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub telegram_token: String,
    pub channel: Recipient,

    // Report
    pub assets: Vec<AssetId>,
    pub report_times: Vec<DailyTime>,
    pub locale: Locale,

    // Market data APIs
    pub coingecko_api_url: String,
    pub fear_greed_api_url: String,
    pub http_connect_timeout: Duration,
    pub http_timeout: Duration,

    // Scheduler
    pub scheduler_tick: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the process environment
    /// in production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        // Required env vars
        let telegram_token = get("TELEGRAM_TOKEN").ok_or_else(|| {
            Error::Config("TELEGRAM_TOKEN environment variable is required".to_string())
        })?;
        let channel = get("CHANNEL_ID")
            .as_deref()
            .and_then(Recipient::parse)
            .ok_or_else(|| {
                Error::Config("CHANNEL_ID environment variable is required".to_string())
            })?;

        let assets = parse_csv(get("TRACKED_ASSETS"))
            .map(|ids| ids.into_iter().map(|s| AssetId(s.to_lowercase())).collect())
            .unwrap_or_else(|| DEFAULT_ASSETS.iter().map(|s| AssetId::new(*s)).collect());

        let report_times = parse_report_times(
            &get("REPORT_TIMES").unwrap_or_else(|| DEFAULT_REPORT_TIMES.to_string()),
        )?;

        let locale = match get("REPORT_LOCALE") {
            Some(v) => v.parse()?,
            None => Locale::default(),
        };

        let coingecko_api_url = get("COINGECKO_API_URL")
            .unwrap_or_else(|| DEFAULT_COINGECKO_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let fear_greed_api_url =
            get("FEAR_GREED_API_URL").unwrap_or_else(|| DEFAULT_FEAR_GREED_API_URL.to_string());

        // Explicit timeouts; the APIs are public and occasionally slow.
        let http_connect_timeout = Duration::from_secs(5);
        let http_timeout = Duration::from_secs(
            parse_positive_u64(&get, "HTTP_TIMEOUT_SECS")?.unwrap_or(10),
        );
        let scheduler_tick = Duration::from_secs(
            parse_positive_u64(&get, "SCHEDULER_TICK_SECS")?.unwrap_or(60),
        );

        Ok(Self {
            telegram_token,
            channel,
            assets,
            report_times,
            locale,
            coingecko_api_url,
            fear_greed_api_url,
            http_connect_timeout,
            http_timeout,
            scheduler_tick,
        })
    }
}

/// Parse a CSV of `HH:MM` times. Duplicates are collapsed.
pub fn parse_report_times(raw: &str) -> Result<Vec<DailyTime>> {
    let mut times = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<DailyTime>)
        .collect::<Result<Vec<_>>>()?;
    times.sort();
    times.dedup();

    if times.is_empty() {
        return Err(Error::Config(
            "REPORT_TIMES must contain at least one HH:MM time".to_string(),
        ));
    }
    Ok(times)
}

fn parse_positive_u64(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u64>> {
    let Some(raw) = get(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(v) if v > 0 => Ok(Some(v)),
        _ => Err(Error::Config(format!(
            "{key} must be a positive integer, got {raw:?}"
        ))),
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn parse_csv(v: Option<String>) -> Option<Vec<String>> {
    let out = v?
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
