//! Error types for cinetrend-client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timeout")]
    Timeout,

    #[error("Catalog returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Malformed catalog response: {0}")]
    Malformed(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// True for failures where no response was received
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::Connection(_) | ClientError::Transport(_) | ClientError::Timeout
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else if e.is_connect() {
            ClientError::Connection(e.to_string())
        } else if e.is_decode() {
            ClientError::Malformed(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
