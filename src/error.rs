use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("Invalid event payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("Unknown target framework: {0}")]
    UnknownFramework(String),
}

pub type Result<T> = std::result::Result<T, RecorderError>;
