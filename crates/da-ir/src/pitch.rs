//! Pitch helpers.

/// Pitches within this distance of 1.0 count as "unset" and follow the
/// master pitch instead.
pub const PITCH_EPSILON: f32 = 0.01;

/// Equal-tempered semitone offset to playback-rate ratio.
pub fn semitones_to_ratio(semitones: i32) -> f32 {
    libm::powf(2.0, semitones as f32 / 12.0)
}
