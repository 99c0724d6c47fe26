//! Error types for cinetrend-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Search term is empty after normalization")]
    EmptyTerm,

    #[error("Invalid sort order: {0}")]
    InvalidSortOrder(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
