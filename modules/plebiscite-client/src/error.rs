use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlebisciteError>;

#[derive(Debug, Error)]
pub enum PlebisciteError {
    #[error("MongoDB error: {0}")]
    Database(#[from] mongodb::error::Error),
}
