//! Session errors.

use std::path::PathBuf;

use da_engine::AudioError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to read session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid session file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error("Unknown clip: {0}")]
    UnknownClip(String),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    #[error("Invalid run parameters: {0}")]
    InvalidRun(String),

    #[error("Duplicate {kind} name: {name}")]
    Duplicate { kind: &'static str, name: String },
}

pub type SessionResult<T> = Result<T, SessionError>;
