use std::fmt;

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Where an outgoing message is posted.
///
/// Channels can be addressed either by numeric id (`-100...`) or by public
/// username (`@channel`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Recipient {
    Chat(ChatId),
    Channel(String),
}

impl Recipient {
    /// Parse a `CHANNEL_ID` value. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.parse::<i64>() {
            Ok(id) => Some(Self::Chat(ChatId(id))),
            Err(_) if raw.starts_with('@') => Some(Self::Channel(raw.to_string())),
            Err(_) => Some(Self::Channel(format!("@{raw}"))),
        }
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chat(id) => write!(f, "{}", id.0),
            Self::Channel(name) => f.write_str(name),
        }
    }
}

/// CoinGecko asset identifier (`bitcoin`, `ethereum`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AssetId(pub String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
