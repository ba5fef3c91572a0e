//! Playback engine for daudio.
//!
//! Binds play requests to pooled voices, runs fades and tweens as tasks
//! polled once per tick, keeps followed voices on their targets and owns
//! the single music channel.

mod config;
mod error;
mod follow;
mod manager;
mod melody;
mod mix;
mod preset;
mod request;
pub mod tween;
mod voice;
mod voice_pool;

pub use config::ManagerConfig;
pub use error::{AudioError, AudioResult, PlaybackWarning};
pub use follow::{FollowBinding, FollowTracker};
pub use manager::{AudioManager, WARNING_HISTORY};
pub use melody::{MelodyGenerator, MelodySource};
pub use mix::MixState;
pub use preset::{ClipMode, Preset};
pub use request::{PlayBuilder, PlayOutcome, PlayRequest, RANDOM_PITCH_MAX, RANDOM_PITCH_MIN};
pub use tween::{Property, Scheduler};
pub use voice::Voice;
pub use voice_pool::{Acquired, VoicePool};
