//! Core value types for the daudio playback layer.
//!
//! This crate defines the vocabulary shared by the engine, the output
//! devices and the composition root: clips, voice parameters, effects and
//! filters, and the traits through which the engine talks to the audio
//! device and the scene graph.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod audio_traits;
mod clip;
mod effects;
mod pitch;
mod vec3;
mod voice_params;

pub use audio_traits::{Scene, VoiceOutput};
pub use clip::{Clip, ClipBank, ClipKey, CLIP_NAME_LEN};
pub use effects::{AudioEffect, Filter, FilterBank, FilterKind, FilterSlot, ParseEffectError, ReverbPreset};
pub use pitch::{semitones_to_ratio, PITCH_EPSILON};
pub use vec3::Vec3;
pub use voice_params::{TargetId, VoiceId, VoiceParams};
