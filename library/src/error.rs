use std::collections::TryReserveError;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    /// Normal termination: upstream has no more frames to give.
    #[error("end of stream")]
    Eof,
    #[error("out of memory: {0}")]
    OutOfMemory(String),
    /// The graph broke the handoff contract (empty slot after a successful
    /// request, or a delivery into an occupied slot).
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SinkError {
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        SinkError::InvalidState(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        SinkError::InvalidArgument(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        SinkError::Upstream(msg.into())
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, SinkError::Eof)
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, SinkError::InvalidState(_))
    }
}

impl From<TryReserveError> for SinkError {
    fn from(err: TryReserveError) -> Self {
        SinkError::OutOfMemory(err.to_string())
    }
}

pub type SinkResult<T> = Result<T, SinkError>;
