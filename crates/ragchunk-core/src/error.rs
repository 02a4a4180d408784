use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Token limit exceeded: {tokens} > {limit} for model '{model}'")]
    TokenLimitExceeded {
        model: String,
        tokens: u64,
        limit: u64,
    },

    #[error("Invalid pattern: {0}")]
    Pattern(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
