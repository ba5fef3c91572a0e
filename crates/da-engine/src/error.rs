//! Error and warning types for the playback engine.

use da_ir::{ClipKey, ParseEffectError};
use thiserror::Error;

/// Error type for engine operations.
#[derive(Debug, Error)]
pub enum AudioError {
    /// No free voice and auto-expand is disabled.
    #[error("No free voice in pool (capacity: {capacity})")]
    PoolExhausted {
        /// Number of pooled voices.
        capacity: usize,
    },

    /// Effect value outside the recognized set.
    #[error(transparent)]
    UnknownEffect(#[from] ParseEffectError),

    /// Clip key not present in the clip bank.
    #[error("Unknown clip: {0:?}")]
    UnknownClip(ClipKey),

    /// Rejected manager configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for engine operations.
pub type AudioResult<T> = Result<T, AudioError>;

/// Non-fatal conditions reported while binding requests.
///
/// Playback proceeds (or the request is dropped) regardless; these exist
/// so misconfigured calls are visible in the log.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum PlaybackWarning {
    #[error("No available voice in the pool of {capacity}; consider a larger pool or enabling auto-expand")]
    PoolExhausted { capacity: usize },

    #[error("Follow target is set but spatial blend is 2D; set a spatial blend above 0 to use 3D")]
    FollowWithout3d,

    #[error("Position is set but spatial blend is 2D; set a spatial blend above 0 to use 3D")]
    PositionWithout3d,

    #[error("UI follow target at full 3D blend; a spatial blend of 0.7-0.9 is recommended")]
    UiTargetFull3d,
}
