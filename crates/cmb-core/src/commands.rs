/// Bot commands understood by the report service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BotCommand {
    /// Post the report to the channel and acknowledge the requester.
    Start,
    /// Reply with the report to the requester only.
    Update,
    Help,
}

impl BotCommand {
    /// Parse the command word of a message. Returns `None` for plain text and
    /// unknown commands.
    pub fn parse(text: &str) -> Option<Self> {
        match command_name(text)?.as_str() {
            "start" => Some(Self::Start),
            "update" => Some(Self::Update),
            "help" => Some(Self::Help),
            _ => None,
        }
    }
}

/// Extract the lower-cased command word from `/cmd`, `/cmd args` or `/cmd@botname`.
pub fn command_name(text: &str) -> Option<String> {
    let first = text.trim().split_whitespace().next()?;
    let name = first
        .strip_prefix('/')?
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Whether a command is meant for this bot. `/cmd` is addressed to every bot in
/// the chat; `/cmd@name` only to the bot whose username is `name`. Without a
/// known username only unsuffixed commands are accepted.
pub fn is_addressed_to(text: &str, bot_username: Option<&str>) -> bool {
    let Some(first) = text.trim().split_whitespace().next() else {
        return false;
    };
    match first.split_once('@') {
        None => true,
        Some((_, target)) => bot_username
            .map(|me| me.trim_start_matches('@'))
            .is_some_and(|me| !me.is_empty() && me.eq_ignore_ascii_case(target)),
    }
}
