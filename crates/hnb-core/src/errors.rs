use crate::{domain::ItemId, pagination::TokenError};

/// Core error type for the bot.
///
/// Adapter crates map their specific errors into this type so the browser can
/// decide per interaction what the user sees (apology, diagnostic, nothing).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("content api unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("item {0} not found")]
    ItemNotFound(ItemId),

    #[error("invalid navigation token: {0}")]
    Parse(#[from] TokenError),

    #[error("transport error: {0}")]
    Transport(String),
}

impl Error {
    /// Failures caused by the content API rather than by the caller.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::RemoteUnavailable(_) | Error::ItemNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
