//! Session files: clips, presets, scene targets and a cue timeline in TOML.
//!
//! ```toml
//! [manager]
//! pool_size = 8
//! default_music = "theme"
//!
//! [[clips]]
//! name = "theme"
//! duration = 30.0
//!
//! [[cues]]
//! at = 1.0
//! action = "play"
//! clip = "blip"
//! ```
//!
//! Every field except names and cue times has a default.

use std::path::Path;

use da_engine::ClipMode;
use serde::Deserialize;

use crate::error::{SessionError, SessionResult};

/// A parsed session file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    #[serde(default)]
    pub manager: ManagerSection,
    #[serde(default)]
    pub clips: Vec<ClipEntry>,
    #[serde(default)]
    pub presets: Vec<PresetEntry>,
    #[serde(default)]
    pub targets: Vec<TargetEntry>,
    #[serde(default)]
    pub cues: Vec<Cue>,
}

impl SessionConfig {
    pub fn from_toml(text: &str) -> SessionResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> SessionResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| SessionError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml(&text)
    }
}

/// `[manager]`: mirrors the engine's manager configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManagerSection {
    pub pool_size: usize,
    pub auto_expand: bool,
    pub show_warnings: bool,
    pub master_volume: f32,
    pub sfx_volume: f32,
    pub music_volume: f32,
    pub master_pitch: f32,
    pub pitch_range: (f32, f32),
    /// Clip name
    pub default_music: Option<String>,
    pub default_music_fade: f32,
    pub origin: [f32; 3],
    pub seed: Option<u64>,
}

impl Default for ManagerSection {
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
            origin: [0.0; 3],
            seed: None,
        }
    }
}

/// `[[clips]]`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClipEntry {
    pub name: String,
    /// Seconds at pitch 1.0
    pub duration: f32,
}

/// Clip selection mode as written in session files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeEntry {
    #[default]
    Random,
    Sequential,
    RandomNoRepeat,
}

impl From<ModeEntry> for ClipMode {
    fn from(mode: ModeEntry) -> Self {
        match mode {
            ModeEntry::Random => ClipMode::Random,
            ModeEntry::Sequential => ClipMode::Sequential,
            ModeEntry::RandomNoRepeat => ClipMode::RandomNoRepeat,
        }
    }
}

/// `[[presets]]`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PresetEntry {
    pub name: String,
    pub clips: Vec<String>,
    #[serde(default)]
    pub mode: ModeEntry,
    #[serde(default = "one")]
    pub volume: f32,
    #[serde(default)]
    pub looped: bool,
    #[serde(default)]
    pub fade: f32,
    #[serde(default)]
    pub delay: f32,
    /// Effect name, e.g. "echo"
    #[serde(default)]
    pub effect: Option<String>,
    #[serde(default = "one")]
    pub pitch: f32,
    #[serde(default)]
    pub randomize_pitch: bool,
    #[serde(default = "default_min_pitch")]
    pub min_pitch: f32,
    #[serde(default = "default_max_pitch")]
    pub max_pitch: f32,
    #[serde(default)]
    pub melodic_pitch: bool,
}

/// `[[targets]]`: a scene object sounds can follow.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetEntry {
    pub name: String,
    #[serde(default)]
    pub position: [f32; 3],
    /// Units per second
    #[serde(default)]
    pub velocity: [f32; 3],
    /// Screen-space element
    #[serde(default)]
    pub ui: bool,
    /// Session time at which the target is destroyed
    #[serde(default)]
    pub despawn_at: Option<f32>,
}

/// `[[cues]]`: an action fired once the session clock reaches `at`.
#[derive(Debug, Clone, Deserialize)]
pub struct Cue {
    pub at: f32,
    #[serde(flatten)]
    pub action: CueAction,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CueAction {
    Play(PlayCue),
    Preset {
        preset: String,
    },
    PlayMusic {
        clip: String,
        #[serde(default = "yes")]
        looped: bool,
        #[serde(default)]
        fade: f32,
    },
    StopMusic {
        #[serde(default)]
        fade: f32,
    },
    Duck {
        volume: f32,
        duration: f32,
    },
    Crossfade {
        clip: String,
        duration: f32,
    },
    SetVolume {
        bus: Bus,
        value: f32,
    },
    SetPitch {
        value: f32,
    },
    SlowMo {
        factor: f32,
    },
    ResetPitch,
}

/// Mix bus addressed by a `set_volume` cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bus {
    Master,
    Sfx,
    Music,
}

/// A one-off play request.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayCue {
    pub clip: String,
    #[serde(default = "one")]
    pub volume: f32,
    #[serde(default)]
    pub pitch: Option<f32>,
    #[serde(default)]
    pub randomize_pitch: bool,
    #[serde(default)]
    pub melodic: bool,
    #[serde(default)]
    pub looped: bool,
    #[serde(default)]
    pub fade: f32,
    #[serde(default)]
    pub delay: f32,
    #[serde(default)]
    pub position: Option<[f32; 3]>,
    /// Target name
    #[serde(default)]
    pub follow: Option<String>,
    #[serde(default)]
    pub spatial_blend: f32,
    #[serde(default)]
    pub doppler: f32,
    #[serde(default)]
    pub effect: Option<String>,
}

fn one() -> f32 {
    1.0
}

fn yes() -> bool {
    true
}

fn default_min_pitch() -> f32 {
    da_engine::RANDOM_PITCH_MIN
}

fn default_max_pitch() -> f32 {
    da_engine::RANDOM_PITCH_MAX
}
