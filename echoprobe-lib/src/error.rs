use thiserror::Error;

/// Errors that can occur in the echo backend and the probe harness
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credential hashing error: {0}")]
    Credentials(#[from] bcrypt::BcryptError),
}

pub type Result<T> = std::result::Result<T, ProbeError>;
