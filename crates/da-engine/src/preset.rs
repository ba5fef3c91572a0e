//! Presets: reusable play settings with clip-selection policy.

use da_ir::{AudioEffect, ClipKey};
use rand::Rng;

use crate::request::{PlayRequest, RANDOM_PITCH_MAX, RANDOM_PITCH_MIN};

/// How a preset picks the next clip from its set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClipMode {
    /// Uniform pick, repeats allowed.
    #[default]
    Random,
    /// Cycle in order, wrapping.
    Sequential,
    /// Uniform pick excluding the clip played last.
    RandomNoRepeat,
}

/// Play settings shared by every use of a sound.
#[derive(Clone, Debug, PartialEq)]
pub struct Preset {
    pub name: String,
    pub mode: ClipMode,
    pub clips: Vec<ClipKey>,
    pub volume_scale: f32,
    pub looped: bool,
    pub fade_duration: f32,
    pub delay: f32,
    pub effect: AudioEffect,
    pub pitch: f32,
    /// Draw pitch from `min_pitch..max_pitch` instead of using `pitch`.
    pub randomize_pitch: bool,
    pub min_pitch: f32,
    pub max_pitch: f32,
    /// Draw pitch from the melody source (wins over `randomize_pitch`).
    pub melodic_pitch: bool,
    last_clip_played: Option<ClipKey>,
}

impl Preset {
    pub fn new(name: impl Into<String>, clips: Vec<ClipKey>) -> Self {
        Self {
            name: name.into(),
            mode: ClipMode::Random,
            clips,
            volume_scale: 1.0,
            looped: false,
            fade_duration: 0.0,
            delay: 0.0,
            effect: AudioEffect::None,
            pitch: 1.0,
            randomize_pitch: false,
            min_pitch: RANDOM_PITCH_MIN,
            max_pitch: RANDOM_PITCH_MAX,
            melodic_pitch: false,
            last_clip_played: None,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: ClipMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn last_clip_played(&self) -> Option<ClipKey> {
        self.last_clip_played
    }

    /// Pick the next clip per [`ClipMode`] and remember it.
    /// Returns `None` for an empty clip set.
    pub fn next_clip<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<ClipKey> {
        if self.clips.is_empty() {
            return None;
        }
        let clip = match self.mode {
            ClipMode::Random => self.clips[rng.gen_range(0..self.clips.len())],
            ClipMode::Sequential => {
                let next = self
                    .last_clip_played
                    .and_then(|last| self.clips.iter().position(|c| *c == last))
                    .map_or(0, |i| i + 1);
                self.clips[next % self.clips.len()]
            }
            ClipMode::RandomNoRepeat => {
                // drops a single copy; duplicates of the last clip stay eligible
                let mut candidates = self.clips.clone();
                if let Some(i) = self.last_clip_played.and_then(|last| candidates.iter().position(|c| *c == last)) {
                    candidates.remove(i);
                }
                if candidates.is_empty() {
                    // only the last clip is left to play
                    self.clips[0]
                } else {
                    candidates[rng.gen_range(0..candidates.len())]
                }
            }
        };
        self.last_clip_played = Some(clip);
        Some(clip)
    }

    /// Request pre-populated from the preset's fixed fields. Pitch
    /// randomization is applied by the builder.
    pub(crate) fn base_request(&self, clip: Option<ClipKey>) -> PlayRequest {
        PlayRequest {
            clip,
            volume_scale: self.volume_scale,
            pitch: self.pitch,
            looped: self.looped,
            fade_duration: self.fade_duration,
            delay: self.delay,
            effect: self.effect,
            ..PlayRequest::default()
        }
    }
}
