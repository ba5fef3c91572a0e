//! Session runtime: a manager wired to a virtual device and a stage,
//! replaying a cue timeline as the clock advances.

use std::collections::HashMap;

use da_device::{DeviceEvent, VirtualOutput};
use da_engine::{AudioError, AudioManager, ManagerConfig, Preset};
use da_ir::{AudioEffect, Clip, ClipBank, ClipKey, TargetId};
use tracing::{debug, info};

use crate::error::{SessionError, SessionResult};
use crate::report::SessionReport;
use crate::session::{Bus, Cue, CueAction, PlayCue, PresetEntry, SessionConfig};
use crate::stage::{to_vec3, Stage};

pub type SessionManager = AudioManager<VirtualOutput, Stage>;

pub struct Session {
    manager: SessionManager,
    clip_names: HashMap<String, ClipKey>,
    presets: HashMap<String, Preset>,
    /// Sorted by time; equal times keep file order.
    cues: Vec<Cue>,
    next_cue: usize,
    /// Session seconds, kept in f64 so tiny ticks still advance it.
    elapsed: f64,
    report: SessionReport,
}

impl Session {
    /// Resolve names, check every cue, build the manager and start the
    /// default music.
    pub fn build(config: &SessionConfig) -> SessionResult<Self> {
        let mut clips = ClipBank::with_key();
        let mut clip_names = HashMap::new();
        for entry in &config.clips {
            if clip_names.contains_key(&entry.name) {
                return Err(SessionError::Duplicate { kind: "clip", name: entry.name.clone() });
            }
            let key = clips.insert(Clip::new(&entry.name, entry.duration));
            clip_names.insert(entry.name.clone(), key);
        }
        let lookup = |name: &str| -> SessionResult<ClipKey> {
            clip_names.get(name).copied().ok_or_else(|| SessionError::UnknownClip(name.to_string()))
        };

        let mut presets = HashMap::new();
        for entry in &config.presets {
            if presets.contains_key(&entry.name) {
                return Err(SessionError::Duplicate { kind: "preset", name: entry.name.clone() });
            }
            presets.insert(entry.name.clone(), build_preset(entry, &lookup)?);
        }

        let stage = Stage::from_entries(&config.targets);
        for cue in &config.cues {
            check_cue(&cue.action, &lookup, &presets, &stage)?;
        }

        let section = &config.manager;
        let manager_config = ManagerConfig {
            pool_size: section.pool_size,
            auto_expand: section.auto_expand,
            show_warnings: section.show_warnings,
            master_volume: section.master_volume,
            sfx_volume: section.sfx_volume,
            music_volume: section.music_volume,
            master_pitch: section.master_pitch,
            pitch_range: section.pitch_range,
            default_music: section.default_music.as_deref().map(&lookup).transpose()?,
            default_music_fade: section.default_music_fade,
            origin: to_vec3(section.origin),
            seed: section.seed,
        };

        let mut manager = AudioManager::new(manager_config, clips, VirtualOutput::new(), stage)?;
        manager.start()?;

        let mut cues = config.cues.clone();
        cues.sort_by(|a, b| a.at.total_cmp(&b.at));
        info!(clips = clip_names.len(), presets = presets.len(), cues = cues.len(), "session built");

        let report = SessionReport { pool_capacity: manager.pool().capacity(), ..Default::default() };
        Ok(Self { manager, clip_names, presets, cues, next_cue: 0, elapsed: 0.0, report })
    }

    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut SessionManager {
        &mut self.manager
    }

    pub fn clip(&self, name: &str) -> Option<ClipKey> {
        self.clip_names.get(name).copied()
    }

    /// Session seconds elapsed.
    pub fn clock(&self) -> f64 {
        self.elapsed
    }

    /// Cues not yet fired.
    pub fn pending_cues(&self) -> usize {
        self.cues.len() - self.next_cue
    }

    /// Fire due cues, then advance the stage, the device and the manager
    /// by `dt` seconds.
    pub fn step(&mut self, dt: f32) -> SessionResult<()> {
        while let Some(cue) = self.cues.get(self.next_cue) {
            if f64::from(cue.at) > self.elapsed {
                break;
            }
            let action = cue.action.clone();
            self.next_cue += 1;
            self.fire(action)?;
            self.report.cues_fired += 1;
        }

        self.manager.scene_mut().advance(dt);
        self.manager.output_mut().advance(dt);
        self.manager.update(dt);

        let finished = self
            .manager
            .output_mut()
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, DeviceEvent::Finished(_)))
            .count();
        self.report.finished += finished;
        self.report.ticks += 1;
        self.elapsed += f64::from(dt);
        self.report.peak_active_voices = self.report.peak_active_voices.max(self.manager.pool().active_count());
        Ok(())
    }

    /// Step until the clock reaches `duration`.
    pub fn run(&mut self, duration: f32, dt: f32) -> SessionResult<SessionReport> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SessionError::InvalidRun(format!("tick length must be positive, got {dt}")));
        }
        for _ in 0..self.ticks_until(duration, dt) {
            self.step(dt)?;
        }
        Ok(self.report())
    }

    /// Ticks of length `dt` needed to bring the clock up to `duration`.
    pub fn ticks_until(&self, duration: f32, dt: f32) -> u64 {
        let remaining = (f64::from(duration) - self.elapsed) / f64::from(dt);
        // absorbs the rounding in dt = 1 / tick_rate
        let ticks = (remaining - 1e-4).ceil();
        if ticks > 0.0 {
            ticks as u64
        } else {
            0
        }
    }

    /// Snapshot of the run so far.
    pub fn report(&self) -> SessionReport {
        let mut report = self.report.clone();
        report.duration = self.elapsed as f32;
        report.dropped = self.manager.dropped_requests();
        report.pool_capacity = self.manager.pool().capacity();
        report.warnings = self.manager.recent_warnings().map(ToString::to_string).collect();
        report
    }

    fn fire(&mut self, action: CueAction) -> SessionResult<()> {
        debug!(at = self.elapsed, ?action, "cue");
        match action {
            CueAction::Play(play) => self.fire_play(&play)?,
            CueAction::Preset { preset } => {
                let preset = self.presets.get_mut(&preset).ok_or(SessionError::UnknownPreset(preset))?;
                let outcome = self.manager.play_preset(preset);
                self.report.record(outcome);
            }
            CueAction::PlayMusic { clip, looped, fade } => {
                let clip = self.lookup(&clip)?;
                self.manager.play_music(clip, looped, fade)?;
                self.report.music_changes += 1;
            }
            CueAction::StopMusic { fade } => self.manager.stop_music(fade),
            CueAction::Duck { volume, duration } => self.manager.duck_music(volume, duration),
            CueAction::Crossfade { clip, duration } => {
                let clip = self.lookup(&clip)?;
                self.manager.crossfade_music(clip, duration)?;
                self.report.music_changes += 1;
            }
            CueAction::SetVolume { bus, value } => match bus {
                Bus::Master => self.manager.set_master_volume(value),
                Bus::Sfx => self.manager.set_sfx_volume(value),
                Bus::Music => self.manager.set_music_volume(value),
            },
            CueAction::SetPitch { value } => self.manager.set_master_pitch(value),
            CueAction::SlowMo { factor } => self.manager.apply_slow_mo(factor),
            CueAction::ResetPitch => self.manager.reset_pitch(),
        }
        Ok(())
    }

    fn fire_play(&mut self, play: &PlayCue) -> SessionResult<()> {
        let clip = self.lookup(&play.clip)?;
        let effect = parse_effect(play.effect.as_deref())?;
        let follow = match &play.follow {
            Some(name) => Some(resolve_target(self.manager.scene(), name)?),
            None => None,
        };

        let mut builder = self
            .manager
            .sound(clip)
            .volume(play.volume)
            .looped(play.looped)
            .fade(play.fade)
            .delay(play.delay)
            .spatial_blend(play.spatial_blend)
            .doppler_level(play.doppler)
            .effect(effect);
        if let Some(pitch) = play.pitch {
            builder = builder.pitch(pitch);
        }
        if play.melodic {
            builder = builder.randomize_melodic_pitch();
        } else if play.randomize_pitch {
            builder = builder.randomize_pitch();
        }
        if let Some(position) = play.position {
            builder = builder.at_position(to_vec3(position));
        }
        if let Some(target) = follow {
            builder = builder.follow(target);
        }
        let outcome = builder.play();
        self.report.record(outcome);
        Ok(())
    }

    fn lookup(&self, name: &str) -> SessionResult<ClipKey> {
        self.clip(name).ok_or_else(|| SessionError::UnknownClip(name.to_string()))
    }
}

fn parse_effect(name: Option<&str>) -> SessionResult<AudioEffect> {
    match name {
        Some(name) => Ok(name.parse::<AudioEffect>().map_err(AudioError::from)?),
        None => Ok(AudioEffect::None),
    }
}

fn resolve_target(stage: &Stage, name: &str) -> SessionResult<TargetId> {
    stage.resolve(name).ok_or_else(|| SessionError::UnknownTarget(name.to_string()))
}

fn build_preset(
    entry: &PresetEntry,
    lookup: &impl Fn(&str) -> SessionResult<ClipKey>,
) -> SessionResult<Preset> {
    let clips = entry.clips.iter().map(|name| lookup(name)).collect::<SessionResult<Vec<_>>>()?;
    let mut preset = Preset::new(entry.name.clone(), clips).with_mode(entry.mode.into());
    preset.volume_scale = entry.volume;
    preset.looped = entry.looped;
    preset.fade_duration = entry.fade;
    preset.delay = entry.delay;
    preset.effect = parse_effect(entry.effect.as_deref())?;
    preset.pitch = entry.pitch;
    preset.randomize_pitch = entry.randomize_pitch;
    preset.min_pitch = entry.min_pitch;
    preset.max_pitch = entry.max_pitch;
    preset.melodic_pitch = entry.melodic_pitch;
    Ok(preset)
}

fn check_cue(
    action: &CueAction,
    lookup: &impl Fn(&str) -> SessionResult<ClipKey>,
    presets: &HashMap<String, Preset>,
    stage: &Stage,
) -> SessionResult<()> {
    match action {
        CueAction::Play(play) => {
            lookup(&play.clip)?;
            parse_effect(play.effect.as_deref())?;
            if let Some(name) = &play.follow {
                resolve_target(stage, name)?;
            }
        }
        CueAction::Preset { preset } if !presets.contains_key(preset) => {
            return Err(SessionError::UnknownPreset(preset.clone()));
        }
        CueAction::PlayMusic { clip, .. } | CueAction::Crossfade { clip, .. } => {
            lookup(clip)?;
        }
        _ => {}
    }
    Ok(())
}
