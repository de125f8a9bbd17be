//! Plain-text market report rendering.
//!
//! Everything here is pure: given fetched quotes and a snapshot, produce the
//! text that gets posted. A failed fetch on either side yields the fixed
//! failure message instead of a partial report.

use crate::{
    locale::Locale,
    market::{FetchResult, MarketSnapshot, PriceQuote},
};

/// Short ticker for the assets we know about.
const DISPLAY_SYMBOLS: &[(&str, &str)] = &[
    ("bitcoin", "BTC"),
    ("ethereum", "ETH"),
    ("binancecoin", "BNB"),
    ("solana", "SOL"),
];

pub fn build_report(
    prices: &FetchResult<Vec<PriceQuote>>,
    snapshot: &FetchResult<MarketSnapshot>,
    locale: Locale,
) -> String {
    let (Ok(prices), Ok(snapshot)) = (prices, snapshot) else {
        return locale.failure_message().to_string();
    };

    let mut lines = Vec::with_capacity(prices.len() + 8);
    lines.push(locale.header().to_string());
    lines.push(String::new());

    for quote in prices {
        lines.push(format_quote_line(quote));
    }

    lines.push(String::new());
    if let Some(cap) = snapshot.total_market_cap_usd() {
        let mut line = format!("- {} ≈ ${}", locale.market_cap(), format_usd(cap, 0));
        if let Some(change) = snapshot.market_cap_change_24h_pct() {
            line.push_str(&format!(" ({}%)", format_signed_pct(change)));
        }
        lines.push(line);
    }
    lines.push(format!(
        "- {}: {} ({})",
        locale.fear_greed(),
        snapshot.sentiment_index(),
        snapshot.sentiment_label().text(locale)
    ));
    lines.push(format!(
        "- {}: {:.2}%",
        locale.btc_dominance(),
        snapshot.btc_dominance_pct()
    ));
    lines.push(format!(
        "- {}: {:.2}%",
        locale.altcoin_dominance(),
        snapshot.altcoin_dominance_pct()
    ));

    lines.join("\n")
}

/// `- BTC: $65,432.10 (-3.46%)`
pub fn format_quote_line(quote: &PriceQuote) -> String {
    format!(
        "- {}: ${} ({}%)",
        display_symbol(quote.symbol.as_str()),
        format_usd(quote.usd_price, 2),
        format_signed_pct(quote.change_24h_pct)
    )
}

/// Ticker for a CoinGecko id, falling back to the upper-cased id.
pub fn display_symbol(asset_id: &str) -> String {
    DISPLAY_SYMBOLS
        .iter()
        .find(|(id, _)| *id == asset_id)
        .map(|(_, sym)| (*sym).to_string())
        .unwrap_or_else(|| asset_id.to_uppercase())
}

/// Fixed-point amount with `,` thousands separators.
pub fn format_usd(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rendered = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rendered.as_str(), None),
    };

    let mut out = String::with_capacity(rendered.len() + rendered.len() / 3 + 1);
    if value < 0.0 {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Percentage with two decimals and an explicit sign (`+1.20`, `-3.46`).
pub fn format_signed_pct(value: f64) -> String {
    format!("{value:+.2}")
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
