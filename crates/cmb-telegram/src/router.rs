use std::sync::Arc;

use chrono::Local;
use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use cmb_core::{
    config::Config,
    messaging::port::MessagingPort,
    ports::MarketDataSource,
    scheduler::{DailyScheduler, ScheduledAction},
    service::ReportService,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub service: Arc<ReportService>,
    /// Own username from `getMe`; `/cmd@other_bot` is ignored against it.
    pub bot_username: Option<String>,
}

/// Build the report service, start the daily scheduler and serve bot commands
/// until the dispatcher stops.
pub async fn run_polling(
    cfg: Arc<Config>,
    source: Arc<dyn MarketDataSource>,
) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_token.clone());

    // Basic startup info.
    let bot_username = match bot.get_me().await {
        Ok(me) => {
            info!("cmb started: @{}", me.username());
            me.user.username.clone()
        }
        Err(e) => {
            warn!("could not fetch bot identity, accepting only unaddressed commands: {e}");
            None
        }
    };
    info!("Report channel: {}", cfg.channel);
    info!(
        "Tracked assets: {}",
        cfg.assets
            .iter()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let service = Arc::new(ReportService::new(
        source,
        messenger,
        cfg.channel.clone(),
        cfg.assets.clone(),
        cfg.locale,
    ));

    let scheduler = build_scheduler(&cfg, service.clone());
    let cancel = CancellationToken::new();
    let scheduler_task = tokio::spawn(scheduler.run(cancel.clone()));

    let state = Arc::new(AppState {
        cfg: cfg.clone(),
        service,
        bot_username,
    });

    let handler =
        dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    cancel.cancel();
    scheduler_task.await?;

    Ok(())
}

/// One scheduler entry per configured report time, all driving the same service.
fn build_scheduler(cfg: &Config, service: Arc<ReportService>) -> DailyScheduler {
    let entries = cfg
        .report_times
        .iter()
        .map(|at| (*at, service.clone() as Arc<dyn ScheduledAction>))
        .collect();
    DailyScheduler::new(entries, cfg.scheduler_tick, Local::now())
}
