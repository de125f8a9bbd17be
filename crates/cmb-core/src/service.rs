//! Report pipeline: fetch, format, deliver.
//!
//! Both trigger kinds end up here. The scheduler calls
//! [`ReportService::deliver_to_channel`] through [`ScheduledAction`]; the
//! Telegram router calls [`ReportService::handle_command`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::{
    commands::BotCommand,
    domain::{AssetId, MessageRef, Recipient},
    locale::Locale,
    messaging::port::MessagingPort,
    ports::MarketDataSource,
    report::build_report,
    scheduler::ScheduledAction,
    Result,
};

pub struct ReportService {
    source: Arc<dyn MarketDataSource>,
    messenger: Arc<dyn MessagingPort>,
    channel: Recipient,
    assets: Vec<AssetId>,
    locale: Locale,
}

impl ReportService {
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        messenger: Arc<dyn MessagingPort>,
        channel: Recipient,
        assets: Vec<AssetId>,
        locale: Locale,
    ) -> Self {
        Self {
            source,
            messenger,
            channel,
            assets,
            locale,
        }
    }

    pub fn channel(&self) -> &Recipient {
        &self.channel
    }

    /// Fetch fresh data and render it. Never fails: fetch errors collapse into
    /// the fixed failure message.
    pub async fn build_report(&self) -> String {
        let prices = self.source.fetch_prices(&self.assets).await;
        let snapshot = self.source.fetch_snapshot().await;

        if prices.is_err() || snapshot.is_err() {
            info!("market data unavailable, report falls back to the failure message");
        }

        build_report(&prices, &snapshot, self.locale)
    }

    /// Build a report and post it to the configured channel.
    pub async fn deliver_to_channel(&self) -> Result<MessageRef> {
        let report = self.build_report().await;
        match self.messenger.send_text(&self.channel, &report).await {
            Ok(msg) => {
                info!("market report posted to {}", self.channel);
                Ok(msg)
            }
            Err(e) => {
                error!("failed to post market report to {}: {e}", self.channel);
                Err(e)
            }
        }
    }

    /// Run one command-triggered cycle. `origin` is the command message.
    pub async fn handle_command(&self, cmd: BotCommand, origin: MessageRef) -> Result<()> {
        info!(chat_id = origin.chat_id.0, "handling command {cmd:?}");

        let reply = match cmd {
            BotCommand::Start => match self.deliver_to_channel().await {
                Ok(_) => self.locale.start_ack().to_string(),
                Err(_) => self.locale.start_failed().to_string(),
            },
            BotCommand::Update => self.build_report().await,
            BotCommand::Help => self.locale.help().to_string(),
        };

        self.messenger.reply_text(origin, &reply).await.map(|_| ())
    }
}

#[async_trait]
impl ScheduledAction for ReportService {
    async fn run(&self) {
        // Delivery errors are already logged; the scheduler keeps going.
        let _ = self.deliver_to_channel().await;
    }
}
