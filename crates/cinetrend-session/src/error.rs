//! Error types for cinetrend-session

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session task '{task}' panicked: {message}")]
    TaskPanicked { task: &'static str, message: String },
}

pub type Result<T> = std::result::Result<T, SessionError>;
