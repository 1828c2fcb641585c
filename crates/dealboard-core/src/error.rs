use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Invalid move: index {index} out of range in bucket '{bucket}'")]
    InvalidMove { bucket: String, index: usize },

    #[error("Unknown bucket: {0}")]
    UnknownBucket(String),

    #[error("Duplicate card: {0}")]
    DuplicateCard(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BoardError {
    pub fn invalid_move(bucket: impl ToString, index: usize) -> Self {
        Self::InvalidMove {
            bucket: bucket.to_string(),
            index,
        }
    }

    pub fn is_invalid_move(&self) -> bool {
        matches!(self, Self::InvalidMove { .. })
    }
}
