use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PeakError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Computation failed: {0}")]
    Computation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PeakError>;
