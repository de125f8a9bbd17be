use async_trait::async_trait;

use crate::{
    domain::{MessageRef, Recipient},
    Result,
};

/// Outbound messaging port.
///
/// Telegram is the only implementation; the core only needs "post to a chat or
/// channel" and "reply to a message".
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(&self, to: &Recipient, text: &str) -> Result<MessageRef>;

    async fn reply_text(&self, to: MessageRef, text: &str) -> Result<MessageRef>;
}
