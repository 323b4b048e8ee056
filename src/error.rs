use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScaleError {
    #[error("Connection error on {port}: {reason}")]
    Connection { port: String, reason: String },

    #[error("Communication error: {0}")]
    Communication(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Not connected: {0}")]
    NotConnected(String),

    #[error("No valid readings out of {0} attempts")]
    EmptyBatch(usize),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type ScaleResult<T> = std::result::Result<T, ScaleError>;
