//! Voice: a reusable playback channel.

use da_ir::{AudioEffect, ClipKey, TargetId, Vec3, VoiceParams};

/// A single playback channel.
///
/// Parameter state is authoritative here and pushed to the device on
/// change; `playing` mirrors what the device last reported.
#[derive(Clone, Debug)]
pub struct Voice {
    params: VoiceParams,
    /// Is the device producing audio for this voice?
    playing: bool,
    /// Effect requested at bind time.
    effect: AudioEffect,
    /// Target this voice follows, if any.
    follow: Option<TargetId>,
    /// Caller's volume scale, before the master/bus mix.
    volume_scale: f32,
    /// Parameters changed since the last push to the device.
    dirty: bool,
}

impl Default for Voice {
    fn default() -> Self {
        Self::new()
    }
}

impl Voice {
    /// Create an idle voice: not playing, no loop, 2D, no doppler, no effect.
    pub fn new() -> Self {
        Self {
            params: VoiceParams::default(),
            playing: false,
            effect: AudioEffect::None,
            follow: None,
            volume_scale: 1.0,
            dirty: false,
        }
    }

    pub fn params(&self) -> &VoiceParams {
        &self.params
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// A voice is free iff it is not playing.
    pub fn is_free(&self) -> bool {
        !self.playing
    }

    pub fn clip(&self) -> Option<ClipKey> {
        self.params.clip
    }

    pub fn volume(&self) -> f32 {
        self.params.volume
    }

    pub fn pitch(&self) -> f32 {
        self.params.pitch
    }

    pub fn position(&self) -> Vec3 {
        self.params.position
    }

    pub fn effect(&self) -> AudioEffect {
        self.effect
    }

    pub fn follow_target(&self) -> Option<TargetId> {
        self.follow
    }

    pub fn volume_scale(&self) -> f32 {
        self.volume_scale
    }

    /// Drop per-bind state so nothing leaks into the next request.
    pub(crate) fn reset_for_bind(&mut self) {
        self.params.filters.clear();
        self.effect = AudioEffect::None;
        self.follow = None;
        self.volume_scale = 1.0;
        self.dirty = true;
    }

    pub(crate) fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub(crate) fn set_clip(&mut self, clip: ClipKey, looped: bool) {
        self.params.clip = Some(clip);
        self.params.looped = looped;
        self.dirty = true;
    }

    pub(crate) fn set_volume(&mut self, volume: f32) {
        self.params.volume = volume;
        self.dirty = true;
    }

    pub(crate) fn set_pitch(&mut self, pitch: f32) {
        self.params.pitch = pitch;
        self.dirty = true;
    }

    pub(crate) fn set_position(&mut self, position: Vec3) {
        self.params.position = position;
        self.dirty = true;
    }

    pub(crate) fn set_spatial(&mut self, spatial_blend: f32, doppler_level: f32) {
        self.params.spatial_blend = spatial_blend;
        self.params.doppler_level = doppler_level;
        self.dirty = true;
    }

    pub(crate) fn set_effect(&mut self, effect: AudioEffect) {
        self.params.filters.apply(effect);
        self.effect = effect;
        self.dirty = true;
    }

    pub(crate) fn set_follow(&mut self, target: Option<TargetId>) {
        self.follow = target;
    }

    pub(crate) fn set_volume_scale(&mut self, scale: f32) {
        self.volume_scale = scale;
    }

    /// Clear and return the dirty flag.
    pub(crate) fn take_dirty(&mut self) -> bool {
        core::mem::take(&mut self.dirty)
    }
}
