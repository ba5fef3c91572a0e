//! Play requests and the chainable builder that submits them.

use da_ir::{AudioEffect, ClipKey, Scene, TargetId, Vec3, VoiceId, VoiceOutput};
use rand::Rng;

use crate::manager::AudioManager;

/// Default bounds for [`PlayBuilder::randomize_pitch`].
pub const RANDOM_PITCH_MIN: f32 = 0.9;
pub const RANDOM_PITCH_MAX: f32 = 1.2;

/// A fully configured intent to play one clip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayRequest {
    /// Clip to play; `None` makes the request a no-op.
    pub clip: Option<ClipKey>,
    /// Multiplier on top of master × sfx.
    pub volume_scale: f32,
    pub pitch: f32,
    pub looped: bool,
    /// Fade-in length in seconds (0 = start at full volume).
    pub fade_duration: f32,
    /// Start delay in seconds.
    pub delay: f32,
    /// Explicit world position; `None` places the voice at the manager.
    pub position: Option<Vec3>,
    pub spatial_blend: f32,
    pub follow: Option<TargetId>,
    pub doppler_level: f32,
    pub effect: AudioEffect,
}

impl Default for PlayRequest {
    fn default() -> Self {
        Self {
            clip: None,
            volume_scale: 1.0,
            pitch: 1.0,
            looped: false,
            fade_duration: 0.0,
            delay: 0.0,
            position: None,
            spatial_blend: 0.0,
            follow: None,
            doppler_level: 0.0,
            effect: AudioEffect::None,
        }
    }
}

impl PlayRequest {
    pub fn new(clip: Option<ClipKey>) -> Self {
        Self { clip, ..Self::default() }
    }
}

/// How a submitted request was handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Bound to a voice and started.
    Started(VoiceId),
    /// Queued behind a start delay.
    Scheduled,
    /// No clip, or no voice available.
    Dropped,
}

impl PlayOutcome {
    pub fn voice(&self) -> Option<VoiceId> {
        match self {
            PlayOutcome::Started(id) => Some(*id),
            _ => None,
        }
    }
}

/// Accumulates request parameters, then submits once with [`play`](Self::play).
#[must_use = "nothing plays until `play` is called"]
pub struct PlayBuilder<'m, O: VoiceOutput, S: Scene> {
    manager: &'m mut AudioManager<O, S>,
    request: PlayRequest,
}

impl<'m, O: VoiceOutput, S: Scene> PlayBuilder<'m, O, S> {
    pub(crate) fn new(manager: &'m mut AudioManager<O, S>, request: PlayRequest) -> Self {
        Self { manager, request }
    }

    /// The request as configured so far.
    pub fn request(&self) -> &PlayRequest {
        &self.request
    }

    pub fn volume(mut self, volume_scale: f32) -> Self {
        self.request.volume_scale = volume_scale;
        self
    }

    pub fn pitch(mut self, pitch: f32) -> Self {
        self.request.pitch = pitch;
        self
    }

    /// Pitch drawn uniformly from [0.9, 1.2).
    pub fn randomize_pitch(self) -> Self {
        self.randomize_pitch_between(RANDOM_PITCH_MIN, RANDOM_PITCH_MAX)
    }

    /// Pitch drawn uniformly from [min, max). An empty range yields `min`.
    pub fn randomize_pitch_between(mut self, min: f32, max: f32) -> Self {
        self.request.pitch = if max > min { self.manager.rng.gen_range(min..max) } else { min };
        self
    }

    /// Pitch from the next note of the melody source.
    pub fn randomize_melodic_pitch(mut self) -> Self {
        self.request.pitch = self.manager.next_melodic_pitch();
        self
    }

    pub fn looped(mut self, looped: bool) -> Self {
        self.request.looped = looped;
        self
    }

    pub fn fade(mut self, seconds: f32) -> Self {
        self.request.fade_duration = seconds;
        self
    }

    pub fn delay(mut self, seconds: f32) -> Self {
        self.request.delay = seconds;
        self
    }

    pub fn at_position(mut self, position: Vec3) -> Self {
        self.request.position = Some(position);
        self
    }

    pub fn follow(mut self, target: TargetId) -> Self {
        self.request.follow = Some(target);
        self
    }

    pub fn spatial_blend(mut self, blend: f32) -> Self {
        self.request.spatial_blend = blend.clamp(0.0, 1.0);
        self
    }

    pub fn doppler_level(mut self, level: f32) -> Self {
        self.request.doppler_level = level.max(0.0);
        self
    }

    pub fn effect(mut self, effect: AudioEffect) -> Self {
        self.request.effect = effect;
        self
    }

    /// Submit the request. With a delay the bind happens on a later tick.
    pub fn play(self) -> PlayOutcome {
        self.manager.submit(self.request)
    }
}
