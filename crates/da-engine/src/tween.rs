//! Transition scheduler.
//!
//! Fades, pitch tweens and delayed calls are plain task values kept in a
//! list and advanced once per tick. A tween interpolates linearly from its
//! start value to its target, lands exactly on the target once
//! `elapsed >= duration`, then completes. Tasks address voices by id; a
//! task whose voice has been destroyed is dropped without effect.

use da_ir::VoiceId;
use slotmap::SlotMap;

use crate::request::PlayRequest;
use crate::voice::Voice;

/// Voice property a tween drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Property {
    Volume,
    Pitch,
}

/// What happens when a tween reaches its target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OnComplete {
    #[default]
    Nothing,
    /// Stop the voice (fade-out).
    Stop,
}

/// A linear transition of one voice property.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    pub voice: VoiceId,
    pub property: Property,
    pub from: f32,
    pub to: f32,
    /// Seconds advanced so far.
    pub elapsed: f32,
    /// Total length in seconds.
    pub duration: f32,
    pub on_complete: OnComplete,
    /// Target tracks the mix gain and is retargeted when it changes.
    pub follows_mix: bool,
}

impl Tween {
    pub fn new(voice: VoiceId, property: Property, from: f32, to: f32, duration: f32) -> Self {
        Self {
            voice,
            property,
            from,
            to,
            elapsed: 0.0,
            duration,
            on_complete: OnComplete::Nothing,
            follows_mix: false,
        }
    }

    #[must_use]
    pub fn following_mix(mut self) -> Self {
        self.follows_mix = true;
        self
    }

    #[must_use]
    pub fn then(mut self, on_complete: OnComplete) -> Self {
        self.on_complete = on_complete;
        self
    }

    /// A NaN or non-positive duration counts as already finished.
    pub fn is_finished(&self) -> bool {
        self.duration.is_nan() || self.elapsed >= self.duration
    }

    /// Interpolated value at the current elapsed time, never past `to`.
    pub fn value(&self) -> f32 {
        if self.is_finished() {
            return self.to;
        }
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }
}

/// Work deferred to a later tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Deferred {
    /// Bind a delayed play request.
    Play(PlayRequest),
    /// Snap the music voice back to master × music after a duck.
    RestoreMusicVolume,
    /// Destroy the outgoing music voice and promote the incoming one.
    CompleteCrossfade { outgoing: VoiceId, incoming: VoiceId },
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Task {
    Tween(Tween),
    /// Counts up like a tween; equal lengths complete on the same tick.
    Delayed { elapsed: f32, delay: f32, action: Deferred },
}

/// Completion side effects the scheduler cannot apply itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fired {
    Stop(VoiceId),
    Run(Deferred),
}

/// Task list polled once per tick.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    tasks: Vec<Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a tween; it is first advanced on the next tick.
    pub fn tween(&mut self, tween: Tween) {
        self.tasks.push(Task::Tween(tween));
    }

    /// Run `action` once `delay` seconds have elapsed.
    pub fn delay(&mut self, delay: f32, action: Deferred) {
        self.tasks.push(Task::Delayed { elapsed: 0.0, delay, action });
    }

    /// Advance every task by `dt` seconds, writing tween values into
    /// `voices`. Returns completion effects in task order.
    pub fn advance(&mut self, dt: f32, voices: &mut SlotMap<VoiceId, Voice>) -> Vec<Fired> {
        let mut fired = Vec::new();
        self.tasks.retain_mut(|task| match task {
            Task::Tween(tween) => {
                let Some(voice) = voices.get_mut(tween.voice) else {
                    return false;
                };
                tween.elapsed += dt;
                let value = tween.value();
                match tween.property {
                    Property::Volume => voice.set_volume(value),
                    Property::Pitch => voice.set_pitch(value),
                }
                if !tween.is_finished() {
                    return true;
                }
                if tween.on_complete == OnComplete::Stop {
                    fired.push(Fired::Stop(tween.voice));
                }
                false
            }
            Task::Delayed { elapsed, delay, action } => {
                *elapsed += dt;
                if *elapsed < *delay {
                    return true;
                }
                fired.push(Fired::Run(*action));
                false
            }
        });
        fired
    }

    /// Point every mix-following tween of `property` on `voice` at a new
    /// target. Returns whether any tween was affected.
    pub fn retarget(&mut self, voice: VoiceId, property: Property, to: f32) -> bool {
        let mut found = false;
        for task in &mut self.tasks {
            if let Task::Tween(t) = task {
                if t.voice == voice && t.property == property && t.follows_mix {
                    t.to = to;
                    found = true;
                }
            }
        }
        found
    }

    /// Whether a tween of `property` is running on `voice`.
    pub fn is_tweening(&self, voice: VoiceId, property: Property) -> bool {
        self.tasks
            .iter()
            .any(|task| matches!(task, Task::Tween(t) if t.voice == voice && t.property == property))
    }

    /// Drop every tween on `voice`. Delayed calls are kept.
    pub fn cancel(&mut self, voice: VoiceId) {
        self.tasks.retain(|task| !matches!(task, Task::Tween(t) if t.voice == voice));
    }

    /// Drop the tweens of one `property` on `voice`.
    pub fn cancel_property(&mut self, voice: VoiceId, property: Property) {
        self.tasks
            .retain(|task| !matches!(task, Task::Tween(t) if t.voice == voice && t.property == property));
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Drop every pending task.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}
