use thiserror::Error;

pub type Result<T> = std::result::Result<T, PsychonautError>;

#[derive(Debug, Error)]
pub enum PsychonautError {
    #[error("Upstream API error: {0}")]
    Upstream(String),

    #[error("Unexpected upstream payload: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for PsychonautError {
    fn from(err: reqwest::Error) -> Self {
        PsychonautError::Upstream(err.to_string())
    }
}

impl From<serde_json::Error> for PsychonautError {
    fn from(err: serde_json::Error) -> Self {
        PsychonautError::Parse(err.to_string())
    }
}
