//! Error types for the core library
//!
//! None of these reach the transport layer: the dispatcher converts every
//! variant into a user-facing reply string.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No tasks recorded for {0}")]
    NotFound(String),

    #[error("No task number {number} for {date}")]
    InvalidPosition { date: String, number: usize },

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
