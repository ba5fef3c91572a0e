//! Global mix state.

use crate::config::ManagerConfig;

/// Master/bus volumes and master pitch.
///
/// Setters clamp; the manager propagates every change to playing voices
/// before returning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MixState {
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    master_pitch: f32,
    pitch_min: f32,
    pitch_max: f32,
}

impl MixState {
    pub fn new(config: &ManagerConfig) -> Self {
        let (pitch_min, pitch_max) = config.pitch_range;
        let mut mix = Self {
            master_volume: 1.0,
            sfx_volume: 1.0,
            music_volume: 1.0,
            master_pitch: 1.0,
            pitch_min,
            pitch_max,
        };
        mix.set_master_volume(config.master_volume);
        mix.set_sfx_volume(config.sfx_volume);
        mix.set_music_volume(config.music_volume);
        mix.set_master_pitch(config.master_pitch);
        mix
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    pub fn sfx_volume(&self) -> f32 {
        self.sfx_volume
    }

    pub fn music_volume(&self) -> f32 {
        self.music_volume
    }

    pub fn master_pitch(&self) -> f32 {
        self.master_pitch
    }

    /// master × sfx
    pub fn sfx_gain(&self) -> f32 {
        self.master_volume * self.sfx_volume
    }

    /// master × music
    pub fn music_gain(&self) -> f32 {
        self.master_volume * self.music_volume
    }

    pub(crate) fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = clamp01(volume);
    }

    pub(crate) fn set_sfx_volume(&mut self, volume: f32) {
        self.sfx_volume = clamp01(volume);
    }

    pub(crate) fn set_music_volume(&mut self, volume: f32) {
        self.music_volume = clamp01(volume);
    }

    pub(crate) fn set_master_pitch(&mut self, pitch: f32) {
        self.master_pitch = if pitch.is_nan() { 1.0 } else { pitch }.clamp(self.pitch_min, self.pitch_max);
    }
}

pub(crate) fn clamp01(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volumes_clamp_to_unit_range() {
        let mut mix = MixState::new(&ManagerConfig::default());
        mix.set_master_volume(1.5);
        mix.set_sfx_volume(-0.5);
        assert_eq!(mix.master_volume(), 1.0);
        assert_eq!(mix.sfx_volume(), 0.0);
    }

    #[test]
    fn pitch_clamps_to_configured_range() {
        let mut mix = MixState::new(&ManagerConfig::default());
        mix.set_master_pitch(10.0);
        assert_eq!(mix.master_pitch(), 3.0);
        mix.set_master_pitch(0.0);
        assert_eq!(mix.master_pitch(), 0.1);
    }

    #[test]
    fn gains_multiply() {
        let mix = MixState::new(&ManagerConfig::default().with_volumes(0.5, 0.8, 0.25));
        assert!((mix.sfx_gain() - 0.4).abs() < 1e-6);
        assert!((mix.music_gain() - 0.125).abs() < 1e-6);
    }
}
