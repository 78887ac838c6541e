use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),
    #[error("out of bounds: {0}")]
    OutOfBounds(String),
}
