// src/error.rs
use thiserror::Error;

use crate::reference_space::ReferenceSpaceType;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("reference space {0} is unavailable")]
    ReferenceSpaceUnavailable(ReferenceSpaceType),

    #[error("session feature '{0}' was not requested")]
    FeatureNotRequested(String),

    #[error("failed to load hand model from {url}: {reason}")]
    ModelLoad { url: String, reason: String },

    #[error("unknown color '{0}'")]
    UnknownColor(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
