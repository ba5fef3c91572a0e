//! Follow tracker: keeps voices on moving scene targets.

use da_ir::{Scene, TargetId, VoiceId};
use slotmap::SlotMap;

use crate::voice::Voice;

/// One voice tracking one target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FollowBinding {
    pub voice: VoiceId,
    pub target: TargetId,
}

/// Follow bindings, at most one per voice.
#[derive(Clone, Debug, Default)]
pub struct FollowTracker {
    bindings: Vec<FollowBinding>,
}

impl FollowTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `voice` to `target`, replacing any existing binding for it.
    pub fn bind(&mut self, voice: VoiceId, target: TargetId) {
        match self.bindings.iter_mut().find(|b| b.voice == voice) {
            Some(binding) => binding.target = target,
            None => self.bindings.push(FollowBinding { voice, target }),
        }
    }

    /// Remove the binding for `voice`. Returns whether one existed.
    pub fn unbind(&mut self, voice: VoiceId) -> bool {
        let before = self.bindings.len();
        self.bindings.retain(|b| b.voice != voice);
        self.bindings.len() != before
    }

    pub fn contains(&self, voice: VoiceId) -> bool {
        self.bindings.iter().any(|b| b.voice == voice)
    }

    pub fn target_of(&self, voice: VoiceId) -> Option<TargetId> {
        self.bindings.iter().find(|b| b.voice == voice).map(|b| b.target)
    }

    pub fn bindings(&self) -> &[FollowBinding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Move every followed voice to its target's position.
    ///
    /// Bindings whose voice is gone, stopped or clipless, or whose target
    /// no longer resolves, are collected during the pass and removed
    /// after it. Returns the number of bindings removed.
    pub fn update<S: Scene + ?Sized>(&mut self, voices: &mut SlotMap<VoiceId, Voice>, scene: &S) -> usize {
        let mut stale = Vec::new();
        for binding in &self.bindings {
            let Some(voice) = voices.get_mut(binding.voice) else {
                stale.push(binding.voice);
                continue;
            };
            if !voice.is_playing() || voice.clip().is_none() {
                stale.push(binding.voice);
                continue;
            }
            match scene.position(binding.target) {
                Some(position) => voice.set_position(position),
                None => stale.push(binding.voice),
            }
        }

        for id in &stale {
            if let Some(voice) = voices.get_mut(*id) {
                voice.set_follow(None);
            }
            self.bindings.retain(|b| b.voice != *id);
        }
        stale.len()
    }
}
