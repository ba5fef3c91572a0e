//! Manager configuration.

use da_ir::{ClipKey, Vec3};

use crate::error::{AudioError, AudioResult};

/// Playback manager configuration.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Pooled SFX voices created up front.
    pub pool_size: usize,
    /// Grow the pool instead of dropping requests when it is full.
    pub auto_expand: bool,
    /// Log misconfiguration and exhaustion warnings.
    pub show_warnings: bool,
    /// Master volume (0.0-1.0).
    pub master_volume: f32,
    /// SFX bus volume (0.0-1.0).
    pub sfx_volume: f32,
    /// Music bus volume (0.0-1.0).
    pub music_volume: f32,
    /// Master pitch, clamped to `pitch_range`.
    pub master_pitch: f32,
    /// Allowed master pitch range (inclusive).
    pub pitch_range: (f32, f32),
    /// Music started by [`AudioManager::start`](crate::AudioManager::start).
    pub default_music: Option<ClipKey>,
    /// Fade-in for the default music, in seconds.
    pub default_music_fade: f32,
    /// Where non-positional voices are placed.
    pub origin: Vec3,
    /// Seed for pitch and clip randomization; entropy when unset.
    pub seed: Option<u64>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            pool_size: 10,
            auto_expand: true,
            show_warnings: true,
            master_volume: 1.0,
            sfx_volume: 1.0,
            music_volume: 1.0,
            master_pitch: 1.0,
            pitch_range: (0.1, 3.0),
            default_music: None,
            default_music_fade: 5.0,
            origin: Vec3::ZERO,
            seed: None,
        }
    }
}

impl ManagerConfig {
    #[must_use]
    pub const fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    #[must_use]
    pub const fn with_auto_expand(mut self, enabled: bool) -> Self {
        self.auto_expand = enabled;
        self
    }

    #[must_use]
    pub const fn with_warnings(mut self, enabled: bool) -> Self {
        self.show_warnings = enabled;
        self
    }

    /// Set master, SFX and music volume in one go.
    #[must_use]
    pub const fn with_volumes(mut self, master: f32, sfx: f32, music: f32) -> Self {
        self.master_volume = master;
        self.sfx_volume = sfx;
        self.music_volume = music;
        self
    }

    #[must_use]
    pub const fn with_master_pitch(mut self, pitch: f32) -> Self {
        self.master_pitch = pitch;
        self
    }

    #[must_use]
    pub const fn with_default_music(mut self, clip: ClipKey) -> Self {
        self.default_music = Some(clip);
        self
    }

    #[must_use]
    pub const fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject settings the manager cannot run with.
    pub fn validate(&self) -> AudioResult<()> {
        let (min, max) = self.pitch_range;
        if !(min > 0.0 && min <= max) {
            return Err(AudioError::InvalidConfig(format!(
                "pitch range must satisfy 0 < min <= max, got {min}..={max}"
            )));
        }
        if self.default_music_fade < 0.0 {
            return Err(AudioError::InvalidConfig("default music fade must not be negative".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = ManagerConfig::default();
        assert_eq!(cfg.pool_size, 10);
        assert!(cfg.auto_expand);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn inverted_pitch_range_is_rejected() {
        let mut cfg = ManagerConfig::default();
        cfg.pitch_range = (2.0, 1.0);
        assert!(matches!(cfg.validate(), Err(AudioError::InvalidConfig(_))));
    }

    #[test]
    fn zero_pitch_floor_is_rejected() {
        let mut cfg = ManagerConfig::default();
        cfg.pitch_range = (0.0, 1.0);
        assert!(cfg.validate().is_err());
    }
}
