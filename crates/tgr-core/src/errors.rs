/// Core error type for the gateway.
///
/// Adapter crates map their specific errors into this type so the HTTP layer
/// can pick a status code consistently (bad input vs everything else).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Caller-supplied input that cannot be used (maps to HTTP 400).
    #[error("{0}")]
    InvalidInput(String),

    #[error("Client not initialized")]
    NotInitialized,

    #[error("{0}")]
    External(String),
}

impl Error {
    /// Prefix an error message with the operation that produced it.
    pub fn context(self, what: &str) -> Self {
        match self {
            Error::NotInitialized => Error::NotInitialized,
            other => Error::External(format!("{what}: {other}")),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
