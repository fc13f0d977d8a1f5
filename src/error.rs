use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Malformed recognition record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Not implemented: {0}")]
    Unimplemented(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TableError>;
