//! Error hierarchy for the watch engine and its transaction plumbing.
//!
//! Failures are grouped by where they originate: configuration loading
//! or a request to the Consul agent.

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Settings could not be loaded or failed validation
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A request to the agent failed
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The transport could not deliver the request or reported a failure
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The service answered with a body of the wrong shape
    #[error("Invalid transaction response: {0}")]
    InvalidResponse(String),

    /// Payload could not be encoded
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Dispatch(DispatchError::Serialization(e))
    }
}
