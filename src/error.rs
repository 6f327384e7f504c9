use thiserror::Error;

/// Errors produced by the ladder model and its surrounding tooling
#[derive(Debug, Error)]
pub enum LadderError {
    #[error("invalid ladder configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("input code {0} does not fit in 3 bits")]
    InvalidCode(u8),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LadderError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        LadderError::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LadderError>;
