//! Telegram adapter (teloxide).
//!
//! This crate implements the `cmb-core` MessagingPort over Telegram Bot API and
//! routes bot commands into the report service.

use async_trait::async_trait;

use teloxide::prelude::*;

pub mod handlers;
pub mod router;

use cmb_core::{
    domain::{ChatId, MessageId, MessageRef, Recipient},
    errors::Error,
    messaging::port::MessagingPort,
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn tg_recipient(to: &Recipient) -> teloxide::types::Recipient {
        match to {
            Recipient::Chat(id) => teloxide::types::Recipient::Id(Self::tg_chat(*id)),
            Recipient::Channel(name) => teloxide::types::Recipient::ChannelUsername(name.clone()),
        }
    }

    fn msg_ref(msg: &teloxide::types::Message) -> MessageRef {
        MessageRef {
            chat_id: ChatId(msg.chat.id.0),
            message_id: MessageId(msg.id.0),
        }
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::Delivery(format!("telegram error: {e}"))
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_text(&self, to: &Recipient, text: &str) -> Result<MessageRef> {
        let msg = self
            .bot
            .send_message(Self::tg_recipient(to), text.to_string())
            .await
            .map_err(Self::map_err)?;
        Ok(Self::msg_ref(&msg))
    }

    async fn reply_text(&self, to: MessageRef, text: &str) -> Result<MessageRef> {
        let msg = self
            .bot
            .send_message(Self::tg_chat(to.chat_id), text.to_string())
            .reply_to_message_id(Self::tg_msg_id(to.message_id))
            .await
            .map_err(Self::map_err)?;
        Ok(Self::msg_ref(&msg))
    }
}
