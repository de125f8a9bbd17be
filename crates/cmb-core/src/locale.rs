//! Fixed user-facing strings, per report language.

use std::str::FromStr;

use crate::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::En => "Unable to fetch data for the report.",
            Self::Ru => "Не удалось получить данные для отчета.",
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            Self::En => "📊 Morning market snapshot",
            Self::Ru => "📊 Утреннее состояние рынка",
        }
    }

    pub fn market_cap(self) -> &'static str {
        match self {
            Self::En => "Market cap",
            Self::Ru => "Капитализация рынка",
        }
    }

    pub fn fear_greed(self) -> &'static str {
        match self {
            Self::En => "Fear & Greed Index",
            Self::Ru => "Индекс страха и жадности",
        }
    }

    pub fn btc_dominance(self) -> &'static str {
        match self {
            Self::En => "BTC dominance",
            Self::Ru => "Доминация BTC",
        }
    }

    pub fn altcoin_dominance(self) -> &'static str {
        match self {
            Self::En => "Altcoin dominance",
            Self::Ru => "Доминация альткоинов",
        }
    }

    pub fn start_ack(self) -> &'static str {
        match self {
            Self::En => "✅ Market report posted to the channel.",
            Self::Ru => "✅ Отчет о рынке отправлен в канал.",
        }
    }

    pub fn start_failed(self) -> &'static str {
        match self {
            Self::En => "❌ Could not post the market report to the channel.",
            Self::Ru => "❌ Не удалось отправить отчет в канал.",
        }
    }

    pub fn unknown_command(self) -> &'static str {
        match self {
            Self::En => "Unknown command",
            Self::Ru => "Неизвестная команда",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            Self::En => {
                "/start - post the market report to the channel\n\
                 /update - show the current market report here"
            }
            Self::Ru => {
                "/start - отправить отчет о рынке в канал\n\
                 /update - показать текущий отчет о рынке здесь"
            }
        }
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "en" | "english" => Ok(Self::En),
            "ru" | "russian" => Ok(Self::Ru),
            other => Err(Error::Config(format!("unsupported report locale: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_locale_names() {
        assert_eq!("EN".parse::<Locale>().unwrap(), Locale::En);
        assert_eq!(" ru ".parse::<Locale>().unwrap(), Locale::Ru);
        assert!("de".parse::<Locale>().is_err());
    }
}
