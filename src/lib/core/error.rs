//! Error types for the solofeat library

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SoloError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Cannot merge cell counts: {0}")]
    CountMerge(String),
}

pub type Result<T> = std::result::Result<T, SoloError>;

