//! Parameter snapshot pushed from the engine to the audio device.

use crate::clip::ClipKey;
use crate::effects::FilterBank;
use crate::vec3::Vec3;

slotmap::new_key_type! {
    /// Identifier for a playback voice (pooled or music).
    pub struct VoiceId;
}

/// Identifier for a scene object a voice can follow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetId(pub u64);

/// Everything the device needs to render one voice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiceParams {
    /// Bound clip (None = free)
    pub clip: Option<ClipKey>,
    /// Output volume (0.0-1.0), master mix already applied
    pub volume: f32,
    /// Playback rate (1.0 = original pitch)
    pub pitch: f32,
    pub looped: bool,
    /// World position of the emitter
    pub position: Vec3,
    /// 0.0 = 2D, 1.0 = fully positional
    pub spatial_blend: f32,
    pub doppler_level: f32,
    pub filters: FilterBank,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            clip: None,
            volume: 1.0,
            pitch: 1.0,
            looped: false,
            position: Vec3::ZERO,
            spatial_blend: 0.0,
            doppler_level: 0.0,
            filters: FilterBank::new(),
        }
    }
}
