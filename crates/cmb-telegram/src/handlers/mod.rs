//! Telegram update handlers.
//!
//! Only commands are acted on; any other message is ignored.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use crate::router::AppState;
mod commands;

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    if !text.trim_start().starts_with('/') {
        return Ok(());
    }

    commands::handle_command(bot, msg, state).await
}
