//! Headless voice output.

use da_ir::{Clip, ClipKey, VoiceId, VoiceOutput, VoiceParams};
use slotmap::SecondaryMap;
use tracing::trace;

/// Events kept when the log is never drained; the oldest half is
/// discarded once the log reaches this length.
pub const EVENT_LOG_CAPACITY: usize = 4096;

/// Something the device did, in the order it happened.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DeviceEvent {
    Started { voice: VoiceId, clip: Option<ClipKey> },
    Stopped(VoiceId),
    /// A non-looping clip reached its end.
    Finished(VoiceId),
    Destroyed(VoiceId),
}

#[derive(Clone, Debug, Default)]
struct VoiceState {
    params: VoiceParams,
    /// Clip length in seconds at pitch 1.0
    duration: f32,
    /// Seconds into the clip
    playhead: f32,
    playing: bool,
    plays: u32,
    stops: u32,
}

/// Voice output that tracks playheads instead of rendering audio.
///
/// Playheads advance by `dt × pitch` in [`advance`](Self::advance).
/// Looping voices wrap; others stop once they reach the clip's end.
/// The event log holds at most [`EVENT_LOG_CAPACITY`] entries.
#[derive(Clone, Debug, Default)]
pub struct VirtualOutput {
    voices: SecondaryMap<VoiceId, VoiceState>,
    /// One entry per slot; a later destroy in the same slot replaces it.
    destroyed: SecondaryMap<VoiceId, ()>,
    events: Vec<DeviceEvent>,
}

impl VirtualOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance every playing voice by `dt` seconds of wall time.
    pub fn advance(&mut self, dt: f32) {
        for (id, state) in self.voices.iter_mut() {
            if !state.playing {
                continue;
            }
            state.playhead += dt * state.params.pitch.max(0.0);
            if state.playhead < state.duration {
                continue;
            }
            if state.params.looped && state.duration > 0.0 {
                state.playhead %= state.duration;
            } else if !state.params.looped {
                state.playhead = state.duration;
                state.playing = false;
                log(&mut self.events, DeviceEvent::Finished(id));
                trace!(?id, "voice finished");
            }
        }
    }

    /// Last parameters pushed to `voice`.
    pub fn params(&self, voice: VoiceId) -> Option<&VoiceParams> {
        self.voices.get(voice).map(|s| &s.params)
    }

    pub fn playhead(&self, voice: VoiceId) -> Option<f32> {
        self.voices.get(voice).map(|s| s.playhead)
    }

    /// Times `voice` was started.
    pub fn play_count(&self, voice: VoiceId) -> u32 {
        self.voices.get(voice).map_or(0, |s| s.plays)
    }

    /// Times `voice` was stopped explicitly.
    pub fn stop_count(&self, voice: VoiceId) -> u32 {
        self.voices.get(voice).map_or(0, |s| s.stops)
    }

    pub fn is_destroyed(&self, voice: VoiceId) -> bool {
        self.destroyed.contains_key(voice)
    }

    /// Voices currently allocated.
    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn playing_count(&self) -> usize {
        self.voices.values().filter(|s| s.playing).count()
    }

    pub fn events(&self) -> &[DeviceEvent] {
        &self.events
    }

    /// Drain the event log.
    pub fn take_events(&mut self) -> Vec<DeviceEvent> {
        core::mem::take(&mut self.events)
    }
}

impl VoiceOutput for VirtualOutput {
    fn create_voice(&mut self, voice: VoiceId) {
        self.voices.insert(voice, VoiceState::default());
        trace!(?voice, "voice created");
    }

    fn destroy_voice(&mut self, voice: VoiceId) {
        if self.voices.remove(voice).is_some() {
            self.destroyed.insert(voice, ());
            log(&mut self.events, DeviceEvent::Destroyed(voice));
            trace!(?voice, "voice destroyed");
        }
    }

    fn play(&mut self, voice: VoiceId, clip: &Clip, params: &VoiceParams) {
        if !self.voices.contains_key(voice) {
            self.voices.insert(voice, VoiceState::default());
        }
        let Some(state) = self.voices.get_mut(voice) else {
            return;
        };
        state.params = *params;
        state.duration = clip.duration;
        state.playhead = 0.0;
        state.playing = true;
        state.plays += 1;
        log(&mut self.events, DeviceEvent::Started { voice, clip: params.clip });
        trace!(?voice, clip = %clip.name, "voice started");
    }

    fn stop(&mut self, voice: VoiceId) {
        if let Some(state) = self.voices.get_mut(voice) {
            state.playing = false;
            state.stops += 1;
            log(&mut self.events, DeviceEvent::Stopped(voice));
        }
    }

    fn apply(&mut self, voice: VoiceId, params: &VoiceParams) {
        if let Some(state) = self.voices.get_mut(voice) {
            state.params = *params;
        }
    }

    fn is_playing(&self, voice: VoiceId) -> bool {
        self.voices.get(voice).is_some_and(|s| s.playing)
    }
}

fn log(events: &mut Vec<DeviceEvent>, event: DeviceEvent) {
    if events.len() >= EVENT_LOG_CAPACITY {
        events.drain(..EVENT_LOG_CAPACITY / 2);
    }
    events.push(event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids(n: usize) -> Vec<VoiceId> {
        let mut arena: SlotMap<VoiceId, ()> = SlotMap::with_key();
        (0..n).map(|_| arena.insert(())).collect()
    }

    fn started(out: &mut VirtualOutput, id: VoiceId, duration: f32, pitch: f32, looped: bool) {
        out.create_voice(id);
        let params = VoiceParams { pitch, looped, ..VoiceParams::default() };
        out.play(id, &Clip::new("c", duration), &params);
    }

    #[test]
    fn one_shot_finishes_at_clip_end() {
        let id = ids(1)[0];
        let mut out = VirtualOutput::new();
        started(&mut out, id, 1.0, 1.0, false);
        out.advance(0.5);
        assert!(out.is_playing(id));
        out.advance(0.5);
        assert!(!out.is_playing(id));
        assert_eq!(out.playhead(id), Some(1.0));
        assert!(out.events().contains(&DeviceEvent::Finished(id)));
    }

    #[test]
    fn pitch_scales_playhead() {
        let id = ids(1)[0];
        let mut out = VirtualOutput::new();
        started(&mut out, id, 1.0, 2.0, false);
        out.advance(0.25);
        assert_eq!(out.playhead(id), Some(0.5));
        out.advance(0.25);
        assert!(!out.is_playing(id));
    }

    #[test]
    fn looped_voice_wraps() {
        let id = ids(1)[0];
        let mut out = VirtualOutput::new();
        started(&mut out, id, 1.0, 1.0, true);
        out.advance(1.25);
        assert!(out.is_playing(id));
        assert!((out.playhead(id).unwrap() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn stop_and_destroy_are_recorded() {
        let v = ids(2);
        let mut out = VirtualOutput::new();
        started(&mut out, v[0], 1.0, 1.0, false);
        started(&mut out, v[1], 1.0, 1.0, false);
        out.stop(v[0]);
        out.destroy_voice(v[1]);
        assert_eq!(out.stop_count(v[0]), 1);
        assert_eq!(out.play_count(v[0]), 1);
        assert!(out.is_destroyed(v[1]));
        assert!(!out.is_playing(v[1]));
        assert_eq!(out.voice_count(), 1);
        assert_eq!(out.playing_count(), 0);
        assert_eq!(out.take_events().len(), 4);
        assert!(out.events().is_empty());
    }

    #[test]
    fn undrained_log_stays_bounded() {
        let id = ids(1)[0];
        let mut out = VirtualOutput::new();
        out.create_voice(id);
        for _ in 0..EVENT_LOG_CAPACITY * 3 {
            out.play(id, &Clip::new("c", 1.0), &VoiceParams::default());
            out.stop(id);
        }
        assert!(out.events().len() <= EVENT_LOG_CAPACITY);
        assert_eq!(out.events().last(), Some(&DeviceEvent::Stopped(id)));
    }

    #[test]
    fn destroyed_set_is_per_slot() {
        let mut arena: SlotMap<VoiceId, ()> = SlotMap::with_key();
        let mut out = VirtualOutput::new();
        let first = arena.insert(());
        out.create_voice(first);
        out.destroy_voice(first);
        arena.remove(first);

        let mut last = first;
        for _ in 0..100 {
            let id = arena.insert(());
            out.create_voice(id);
            out.destroy_voice(id);
            arena.remove(id);
            last = id;
        }
        assert!(out.is_destroyed(last));
        assert_eq!(out.destroyed.len(), 1);
    }
}
