use std::sync::Arc;

use cmb_core::config::Config;
use cmb_market::MarketApiClient;

#[tokio::main]
async fn main() -> Result<(), cmb_core::Error> {
    cmb_core::logging::init("cmb")?;

    let cfg = Arc::new(Config::load()?);
    tracing::info!(
        "Daily reports at: {}",
        cfg.report_times
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let source = Arc::new(MarketApiClient::new(&cfg)?);

    cmb_telegram::router::run_polling(cfg, source)
        .await
        .map_err(|e| cmb_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
