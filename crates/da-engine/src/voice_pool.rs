//! VoicePool: reusable SFX voices plus detached music voices.

use da_ir::VoiceId;
use slotmap::SlotMap;

use crate::error::{AudioError, AudioResult};
use crate::voice::Voice;

/// Result of a successful [`VoicePool::acquire_or_expand`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Acquired {
    pub id: VoiceId,
    /// The pool grew to satisfy the request.
    pub created: bool,
}

/// Pool of playback voices.
///
/// Pooled voices are scanned in creation order and never removed. Music
/// voices live in the same arena so tasks can address them uniformly, but
/// they are not part of the scan and can be destroyed.
pub struct VoicePool {
    /// Every live voice, pooled or detached.
    pub(crate) slots: SlotMap<VoiceId, Voice>,
    /// Pooled voices in scan order.
    pooled: Vec<VoiceId>,
    auto_expand: bool,
}

impl VoicePool {
    /// Create a pool with `size` idle voices.
    pub fn new(size: usize, auto_expand: bool) -> Self {
        let mut slots = SlotMap::with_capacity_and_key(size + 2);
        let pooled = (0..size).map(|_| slots.insert(Voice::new())).collect();
        Self { slots, pooled, auto_expand }
    }

    /// Number of pooled voices.
    pub fn capacity(&self) -> usize {
        self.pooled.len()
    }

    pub fn auto_expand(&self) -> bool {
        self.auto_expand
    }

    /// First free pooled voice in scan order.
    pub fn acquire(&self) -> Option<VoiceId> {
        self.pooled.iter().copied().find(|id| self.slots[*id].is_free())
    }

    /// Acquire a free voice, appending a new one if the pool is full and
    /// auto-expand is on.
    pub fn acquire_or_expand(&mut self) -> AudioResult<Acquired> {
        if let Some(id) = self.acquire() {
            return Ok(Acquired { id, created: false });
        }
        if !self.auto_expand {
            return Err(AudioError::PoolExhausted { capacity: self.capacity() });
        }
        let id = self.slots.insert(Voice::new());
        self.pooled.push(id);
        Ok(Acquired { id, created: true })
    }

    /// Snapshot of the pooled voice ids in scan order.
    pub fn voices(&self) -> Vec<VoiceId> {
        self.pooled.clone()
    }

    /// Snapshot of the pooled voices currently playing.
    pub fn playing_voices(&self) -> Vec<VoiceId> {
        self.pooled.iter().copied().filter(|id| self.slots[*id].is_playing()).collect()
    }

    /// Count of playing pooled voices.
    pub fn active_count(&self) -> usize {
        self.pooled.iter().filter(|id| self.slots[**id].is_playing()).count()
    }

    /// Get a voice, pooled or detached.
    pub fn get(&self, id: VoiceId) -> Option<&Voice> {
        self.slots.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: VoiceId) -> Option<&mut Voice> {
        self.slots.get_mut(id)
    }

    pub fn contains(&self, id: VoiceId) -> bool {
        self.slots.contains_key(id)
    }

    pub fn is_pooled(&self, id: VoiceId) -> bool {
        self.pooled.contains(&id)
    }

    /// Add a voice outside the scan order (music channel).
    pub(crate) fn insert_detached(&mut self, voice: Voice) -> VoiceId {
        self.slots.insert(voice)
    }

    /// Remove a detached voice. Pooled voices are never removed.
    pub(crate) fn remove_detached(&mut self, id: VoiceId) -> Option<Voice> {
        if self.is_pooled(id) {
            return None;
        }
        self.slots.remove(id)
    }

    /// Every live voice id, pooled or detached.
    pub(crate) fn all_ids(&self) -> Vec<VoiceId> {
        self.slots.keys().collect()
    }
}
