use crate::market::FetchError;

/// Core error type for the bot.
///
/// Adapter crates should map their specific errors into this type so the core
/// can handle failures consistently (failure report vs logged delivery error).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("delivery error: {0}")]
    Delivery(String),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failures_convert_with_endpoint_in_message() {
        let err: Error = FetchError::Status {
            endpoint: "https://api.example/global".to_string(),
            status: 429,
        }
        .into();
        assert!(matches!(err, Error::Fetch(FetchError::Status { status: 429, .. })));
        assert!(err.to_string().contains("https://api.example/global"));
    }
}
