use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("storage file error: {0}")]
    File(String),

    #[error("corrupt value for '{key}': {reason}")]
    Corrupt { key: String, reason: String },

    #[error("{0}")]
    Other(String),
}
