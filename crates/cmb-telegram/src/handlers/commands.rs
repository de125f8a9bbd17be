use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{debug, error, info};

use cmb_core::{
    commands::{command_name, is_addressed_to, BotCommand},
    domain::{ChatId, MessageId, MessageRef},
    locale::Locale,
};

use crate::router::AppState;

pub async fn handle_command(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let text = msg.text().unwrap_or("");
    if !is_addressed_to(text, state.bot_username.as_deref()) {
        debug!(chat_id = msg.chat.id.0, "ignoring command for another bot: {text:?}");
        return Ok(());
    }
    let origin = MessageRef {
        chat_id: ChatId(msg.chat.id.0),
        message_id: MessageId(msg.id.0),
    };
    let username = msg
        .from()
        .and_then(|u| u.username.clone())
        .unwrap_or_default();

    let Some(cmd) = BotCommand::parse(text) else {
        info!(chat_id = origin.chat_id.0, "ignoring unknown command {text:?}");
        let reply = unknown_command_reply(text, state.cfg.locale);
        bot.send_message(msg.chat.id, reply)
            .reply_to_message_id(msg.id)
            .await?;
        return Ok(());
    };

    info!(chat_id = origin.chat_id.0, user = %username, "command {cmd:?}");
    if let Err(e) = state.service.handle_command(cmd, origin).await {
        error!("command {cmd:?} failed: {e}");
    }

    Ok(())
}

fn unknown_command_reply(text: &str, locale: Locale) -> String {
    let name = command_name(text).unwrap_or_default();
    format!("{}: /{name}\n\n{}", locale.unknown_command(), locale.help())
}
