//! AudioManager: binds play requests to voices and drives them per tick.
//!
//! All mutation happens on the caller's thread. `update(dt)` is the single
//! per-frame entry point: it syncs playback state from the device, advances
//! the scheduler, repositions followed voices and pushes dirty parameters.

use da_ir::{
    semitones_to_ratio, ClipBank, ClipKey, Scene, TargetId, Vec3, VoiceId, VoiceOutput, PITCH_EPSILON,
};
use heapless::Deque;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::config::ManagerConfig;
use crate::error::{AudioError, AudioResult, PlaybackWarning};
use crate::follow::FollowTracker;
use crate::melody::{MelodyGenerator, MelodySource};
use crate::mix::{clamp01, MixState};
use crate::preset::Preset;
use crate::request::{PlayBuilder, PlayOutcome, PlayRequest};
use crate::tween::{Deferred, Fired, OnComplete, Property, Scheduler, Tween};
use crate::voice::Voice;
use crate::voice_pool::VoicePool;

/// Number of recent warnings kept for inspection.
pub const WARNING_HISTORY: usize = 16;

const SLOW_MO_TWEEN: f32 = 0.35;
const RESET_PITCH_TWEEN: f32 = 0.25;

/// The playback service.
///
/// Owns the voice pool, the music channel, the scheduler and the follow
/// tracker, plus the output device and scene it talks to.
pub struct AudioManager<O: VoiceOutput, S: Scene = ()> {
    config: ManagerConfig,
    mix: MixState,
    clips: ClipBank,
    pool: VoicePool,
    follow: FollowTracker,
    scheduler: Scheduler,
    output: O,
    scene: S,
    /// Primary music voice.
    music: Option<VoiceId>,
    /// Voice fading in during a crossfade.
    music_incoming: Option<VoiceId>,
    melody: Box<dyn MelodySource>,
    pub(crate) rng: StdRng,
    /// Seconds since construction.
    clock: f32,
    /// Requests dropped for lack of a voice, delayed ones included.
    dropped: usize,
    warnings: Deque<PlaybackWarning, WARNING_HISTORY>,
}

impl<O: VoiceOutput, S: Scene> AudioManager<O, S> {
    /// Create the manager and its initial pool.
    pub fn new(config: ManagerConfig, clips: ClipBank, mut output: O, scene: S) -> AudioResult<Self> {
        config.validate()?;
        if let Some(clip) = config.default_music {
            if !clips.contains_key(clip) {
                return Err(AudioError::UnknownClip(clip));
            }
        }

        let pool = VoicePool::new(config.pool_size, config.auto_expand);
        for id in pool.voices() {
            output.create_voice(id);
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        info!(
            pool_size = config.pool_size,
            auto_expand = config.auto_expand,
            clips = clips.len(),
            "audio manager ready"
        );

        Ok(Self {
            mix: MixState::new(&config),
            config,
            clips,
            pool,
            follow: FollowTracker::new(),
            scheduler: Scheduler::new(),
            output,
            scene,
            music: None,
            music_incoming: None,
            melody: Box::new(MelodyGenerator::new()),
            rng,
            clock: 0.0,
            dropped: 0,
            warnings: Deque::new(),
        })
    }

    /// Replace the melody source used for melodic pitch.
    #[must_use]
    pub fn with_melody(mut self, melody: impl MelodySource + 'static) -> Self {
        self.melody = Box::new(melody);
        self
    }

    /// Start the configured default music, if any.
    pub fn start(&mut self) -> AudioResult<()> {
        if let Some(clip) = self.config.default_music {
            self.play_music(clip, true, self.config.default_music_fade)?;
        }
        Ok(())
    }

    /// Stop and release every voice, returning the device.
    pub fn shutdown(mut self) -> O {
        let ids = self.pool.all_ids();
        for id in &ids {
            self.output.stop(*id);
            self.output.destroy_voice(*id);
        }
        self.scheduler.clear();
        info!(voices = ids.len(), "audio manager shut down");
        self.output
    }

    // === Requests ===

    /// Start building a request for `clip`. `None` builds a request that
    /// plays nothing.
    pub fn sound(&mut self, clip: impl Into<Option<ClipKey>>) -> PlayBuilder<'_, O, S> {
        PlayBuilder::new(self, PlayRequest::new(clip.into()))
    }

    /// Start building a request from a preset: the next clip per its
    /// selection mode, its fixed fields, and pitch randomization per its
    /// flags (melodic wins over uniform).
    pub fn preset(&mut self, preset: &mut Preset) -> PlayBuilder<'_, O, S> {
        let clip = preset.next_clip(&mut self.rng);
        let request = preset.base_request(clip);
        let builder = PlayBuilder::new(self, request);
        if preset.melodic_pitch {
            builder.randomize_melodic_pitch()
        } else if preset.randomize_pitch {
            builder.randomize_pitch_between(preset.min_pitch, preset.max_pitch)
        } else {
            builder
        }
    }

    pub fn play_preset(&mut self, preset: &mut Preset) -> PlayOutcome {
        self.preset(preset).play()
    }

    /// Play `clip` with default settings.
    pub fn play_clip_simple(&mut self, clip: ClipKey) -> PlayOutcome {
        self.sound(clip).play()
    }

    /// Play `clip` at the next melodic pitch.
    pub fn play_clip_simple_melodic(&mut self, clip: ClipKey) -> PlayOutcome {
        self.sound(clip).randomize_melodic_pitch().play()
    }

    pub(crate) fn submit(&mut self, request: PlayRequest) -> PlayOutcome {
        if request.clip.is_none() {
            return PlayOutcome::Dropped;
        }
        if request.delay > 0.0 {
            self.scheduler.delay(request.delay, Deferred::Play(request));
            return PlayOutcome::Scheduled;
        }
        self.bind_and_play(request)
    }

    pub(crate) fn next_melodic_pitch(&mut self) -> f32 {
        semitones_to_ratio(self.melody.next_semitone(self.clock, &mut self.rng))
    }

    fn bind_and_play(&mut self, request: PlayRequest) -> PlayOutcome {
        let Some(clip_key) = request.clip else {
            return PlayOutcome::Dropped;
        };
        let Some(clip) = self.clips.get(clip_key).copied() else {
            debug!(?clip_key, "play request for unknown clip dropped");
            return PlayOutcome::Dropped;
        };

        let acquired = match self.pool.acquire_or_expand() {
            Ok(acquired) => acquired,
            Err(_) => {
                self.dropped += 1;
                self.warn(PlaybackWarning::PoolExhausted { capacity: self.pool.capacity() });
                return PlayOutcome::Dropped;
            }
        };
        let id = acquired.id;
        if acquired.created {
            self.output.create_voice(id);
            debug!(capacity = self.pool.capacity(), "voice pool expanded");
        }

        // nothing from the previous bind may reach this one
        self.follow.unbind(id);
        self.scheduler.cancel(id);

        let gain = self.mix.sfx_gain() * request.volume_scale;
        let pitch = if (request.pitch - 1.0).abs() > PITCH_EPSILON {
            request.pitch
        } else {
            self.mix.master_pitch()
        };
        let (position, doppler, follow) = self.place(&request);
        let fading = request.fade_duration > 0.0;

        let Some(voice) = self.pool.get_mut(id) else {
            return PlayOutcome::Dropped;
        };
        voice.reset_for_bind();
        voice.set_effect(request.effect);
        voice.set_clip(clip_key, request.looped);
        voice.set_pitch(pitch);
        voice.set_volume_scale(request.volume_scale);
        voice.set_position(position);
        voice.set_spatial(request.spatial_blend, doppler);
        voice.set_follow(follow);
        voice.set_volume(if fading { 0.0 } else { gain });
        voice.set_playing(true);
        voice.take_dirty();
        let params = *voice.params();
        self.output.play(id, &clip, &params);

        if let Some(target) = follow {
            self.follow.bind(id, target);
        }
        if fading {
            self.scheduler
                .tween(Tween::new(id, Property::Volume, 0.0, gain, request.fade_duration).following_mix());
        }
        debug!(clip = %clip.name, volume = gain, pitch, effect = %request.effect, "voice bound");
        PlayOutcome::Started(id)
    }

    /// Resolve position, doppler level and follow target for a request:
    /// follow target first, then explicit position, then the origin.
    fn place(&mut self, request: &PlayRequest) -> (Vec3, f32, Option<TargetId>) {
        if let Some(target) = request.follow {
            if let Some(position) = self.scene.position(target) {
                let ui = self.scene.is_ui_element(target);
                if request.spatial_blend == 0.0 {
                    self.warn(PlaybackWarning::FollowWithout3d);
                } else if ui && request.spatial_blend >= 1.0 {
                    self.warn(PlaybackWarning::UiTargetFull3d);
                }
                let doppler = if ui { 0.0 } else { request.doppler_level };
                return (position, doppler, Some(target));
            }
            debug!(target = target.0, "follow target not in scene");
        }
        if let Some(position) = request.position {
            if request.spatial_blend == 0.0 {
                self.warn(PlaybackWarning::PositionWithout3d);
            }
            return (position, request.doppler_level, None);
        }
        (self.config.origin, request.doppler_level, None)
    }

    // === Music ===

    /// Play `clip` on the music channel, creating it on first use.
    pub fn play_music(&mut self, clip: ClipKey, looped: bool, fade: f32) -> AudioResult<VoiceId> {
        let data = self.clips.get(clip).copied().ok_or(AudioError::UnknownClip(clip))?;
        self.settle_crossfade();

        let id = match self.music.filter(|id| self.pool.contains(*id)) {
            Some(id) => id,
            None => {
                let id = self.pool.insert_detached(Voice::new());
                self.output.create_voice(id);
                self.music = Some(id);
                id
            }
        };
        self.scheduler.cancel(id);

        let gain = self.mix.music_gain();
        let fading = fade > 0.0;
        let pitch = self.mix.master_pitch();
        let Some(voice) = self.pool.get_mut(id) else {
            return Err(AudioError::UnknownClip(clip));
        };
        voice.reset_for_bind();
        voice.set_clip(clip, looped);
        voice.set_pitch(pitch);
        voice.set_volume(if fading { 0.0 } else { gain });
        voice.set_playing(true);
        voice.take_dirty();
        let params = *voice.params();
        self.output.play(id, &data, &params);

        if fading {
            self.scheduler.tween(Tween::new(id, Property::Volume, 0.0, gain, fade).following_mix());
        }
        info!(clip = %data.name, looped, fade, "music started");
        Ok(id)
    }

    /// Stop the music, fading out over `fade` seconds when positive.
    pub fn stop_music(&mut self, fade: f32) {
        self.settle_crossfade();
        let Some(id) = self.music else {
            return;
        };
        let Some(volume) = self.pool.get(id).filter(|v| v.is_playing()).map(Voice::volume) else {
            return;
        };
        self.scheduler.cancel_property(id, Property::Volume);
        if fade > 0.0 {
            self.scheduler
                .tween(Tween::new(id, Property::Volume, volume, 0.0, fade).then(OnComplete::Stop));
        } else {
            self.stop_voice(id);
        }
        info!(fade, "music stopped");
    }

    /// Dip the music to `volume` over `duration`, then snap back to the
    /// mix level once `duration` has elapsed.
    pub fn duck_music(&mut self, volume: f32, duration: f32) {
        let Some(id) = self.music else {
            return;
        };
        let Some(current) = self.pool.get(id).map(Voice::volume) else {
            return;
        };
        self.scheduler.tween(Tween::new(id, Property::Volume, current, clamp01(volume), duration));
        self.scheduler.delay(duration, Deferred::RestoreMusicVolume);
        debug!(volume, duration, "music ducked");
    }

    /// Fade the current music out and `clip` in over `duration`. Without
    /// music playing this is a looped fade-in.
    pub fn crossfade_music(&mut self, clip: ClipKey, duration: f32) -> AudioResult<VoiceId> {
        let data = self.clips.get(clip).copied().ok_or(AudioError::UnknownClip(clip))?;
        self.settle_crossfade();

        let playing = self.music.filter(|id| self.pool.get(*id).is_some_and(Voice::is_playing));
        let Some(outgoing) = playing else {
            return self.play_music(clip, true, duration);
        };

        let gain = self.mix.music_gain();
        let pitch = self.mix.master_pitch();
        let mut voice = Voice::new();
        voice.set_clip(clip, true);
        voice.set_pitch(pitch);
        voice.set_volume(0.0);
        voice.set_playing(true);
        voice.take_dirty();
        let params = *voice.params();
        let incoming = self.pool.insert_detached(voice);
        self.output.create_voice(incoming);
        self.output.play(incoming, &data, &params);

        let from = self.pool.get(outgoing).map_or(gain, Voice::volume);
        self.scheduler.cancel_property(outgoing, Property::Volume);
        self.scheduler.tween(Tween::new(outgoing, Property::Volume, from, 0.0, duration));
        self.scheduler
            .tween(Tween::new(incoming, Property::Volume, 0.0, gain, duration).following_mix());
        self.scheduler.delay(duration, Deferred::CompleteCrossfade { outgoing, incoming });
        self.music_incoming = Some(incoming);
        info!(clip = %data.name, duration, "music crossfade started");
        Ok(incoming)
    }

    fn settle_crossfade(&mut self) {
        if let (Some(outgoing), Some(incoming)) = (self.music, self.music_incoming) {
            self.complete_crossfade(outgoing, incoming);
        }
    }

    fn complete_crossfade(&mut self, outgoing: VoiceId, incoming: VoiceId) {
        if self.music != Some(outgoing) || self.music_incoming != Some(incoming) {
            return;
        }
        self.output.stop(outgoing);
        self.output.destroy_voice(outgoing);
        self.pool.remove_detached(outgoing);

        self.scheduler.cancel_property(incoming, Property::Volume);
        let gain = self.mix.music_gain();
        if let Some(voice) = self.pool.get_mut(incoming) {
            voice.set_volume(gain);
        }
        self.music = Some(incoming);
        self.music_incoming = None;
        debug!("music crossfade complete");
    }

    fn restore_music_volume(&mut self) {
        let gain = self.mix.music_gain();
        if let Some(voice) = self.music.and_then(|id| self.pool.get_mut(id)) {
            voice.set_volume(gain);
        }
    }

    // === Mix ===

    pub fn set_master_volume(&mut self, volume: f32) {
        self.mix.set_master_volume(volume);
        self.propagate();
    }

    pub fn set_sfx_volume(&mut self, volume: f32) {
        self.mix.set_sfx_volume(volume);
        self.propagate();
    }

    pub fn set_music_volume(&mut self, volume: f32) {
        self.mix.set_music_volume(volume);
        self.propagate();
    }

    pub fn set_master_pitch(&mut self, pitch: f32) {
        self.mix.set_master_pitch(pitch);
        self.propagate();
    }

    /// Push the mix to every playing SFX voice and the music channel.
    /// Running fade-ins are retargeted instead of overwritten.
    fn propagate(&mut self) {
        let sfx = self.mix.sfx_gain();
        let music = self.mix.music_gain();
        let pitch = self.mix.master_pitch();

        for id in self.pool.playing_voices() {
            let Some(voice) = self.pool.get_mut(id) else {
                continue;
            };
            let volume = sfx * voice.volume_scale();
            if !self.scheduler.retarget(id, Property::Volume, volume) {
                voice.set_volume(volume);
            }
            voice.set_pitch(pitch);
        }
        for id in [self.music, self.music_incoming].into_iter().flatten() {
            let Some(voice) = self.pool.get_mut(id) else {
                continue;
            };
            if !self.scheduler.retarget(id, Property::Volume, music) {
                voice.set_volume(music);
            }
            voice.set_pitch(pitch);
        }
        self.flush();
    }

    /// Tween every playing voice, music included, toward a slowed pitch.
    pub fn apply_slow_mo(&mut self, factor: f32) {
        let pitch = clamp01(factor * 2.0 + 0.15);
        self.tween_pitch_all(pitch, SLOW_MO_TWEEN);
    }

    /// Tween every playing voice back to the master pitch.
    pub fn reset_pitch(&mut self) {
        self.tween_pitch_all(self.mix.master_pitch(), RESET_PITCH_TWEEN);
    }

    fn tween_pitch_all(&mut self, to: f32, duration: f32) {
        let mut ids = self.pool.playing_voices();
        if let Some(music) = self.music.filter(|id| self.pool.get(*id).is_some_and(Voice::is_playing)) {
            ids.push(music);
        }
        for id in ids {
            if let Some(from) = self.pool.get(id).map(Voice::pitch) {
                self.scheduler.tween(Tween::new(id, Property::Pitch, from, to, duration));
            }
        }
    }

    // === Tick ===

    /// Advance the manager by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.clock += dt;

        for id in self.pool.all_ids() {
            let device_playing = self.output.is_playing(id);
            if let Some(voice) = self.pool.get_mut(id) {
                if voice.is_playing() && !device_playing {
                    voice.set_playing(false);
                }
            }
        }

        for fired in self.scheduler.advance(dt, &mut self.pool.slots) {
            match fired {
                Fired::Stop(id) => self.stop_voice(id),
                Fired::Run(Deferred::Play(request)) => {
                    self.bind_and_play(request);
                }
                Fired::Run(Deferred::RestoreMusicVolume) => self.restore_music_volume(),
                Fired::Run(Deferred::CompleteCrossfade { outgoing, incoming }) => {
                    self.complete_crossfade(outgoing, incoming);
                }
            }
        }

        self.follow.update(&mut self.pool.slots, &self.scene);
        self.flush();
    }

    fn stop_voice(&mut self, id: VoiceId) {
        self.output.stop(id);
        if let Some(voice) = self.pool.get_mut(id) {
            voice.set_playing(false);
        }
    }

    /// Push changed voice parameters to the device.
    fn flush(&mut self) {
        for id in self.pool.all_ids() {
            if let Some(voice) = self.pool.get_mut(id) {
                if voice.take_dirty() {
                    self.output.apply(id, voice.params());
                }
            }
        }
    }

    fn warn(&mut self, warning: PlaybackWarning) {
        if !self.config.show_warnings {
            return;
        }
        warn!("{warning}");
        if self.warnings.is_full() {
            self.warnings.pop_front();
        }
        let _ = self.warnings.push_back(warning);
    }

    // === Accessors ===

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn mix(&self) -> &MixState {
        &self.mix
    }

    pub fn clips(&self) -> &ClipBank {
        &self.clips
    }

    pub fn pool(&self) -> &VoicePool {
        &self.pool
    }

    pub fn voice(&self, id: VoiceId) -> Option<&Voice> {
        self.pool.get(id)
    }

    pub fn music_voice(&self) -> Option<VoiceId> {
        self.music
    }

    /// Voice fading in while a crossfade is pending.
    pub fn music_incoming(&self) -> Option<VoiceId> {
        self.music_incoming
    }

    pub fn follow(&self) -> &FollowTracker {
        &self.follow
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    /// Most recent warnings, oldest first.
    pub fn recent_warnings(&self) -> impl Iterator<Item = &PlaybackWarning> {
        self.warnings.iter()
    }

    /// Tweens and delayed calls still pending.
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    /// Seconds advanced through `update`.
    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Requests dropped because the pool was exhausted, counted whether
    /// or not warnings are shown.
    pub fn dropped_requests(&self) -> usize {
        self.dropped
    }
}
