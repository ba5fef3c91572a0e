//! Audio clip handles.

use arrayvec::ArrayString;
use slotmap::SlotMap;

/// Maximum clip name length in bytes (longer names are truncated).
pub const CLIP_NAME_LEN: usize = 32;

slotmap::new_key_type! {
    /// Key for referencing clips in a [`ClipBank`].
    pub struct ClipKey;
}

/// Clip storage shared by the manager and the composition root.
pub type ClipBank = SlotMap<ClipKey, Clip>;

/// A decoded clip as seen by the playback layer.
///
/// Sample data stays with the audio device; the playback layer only needs
/// a name for diagnostics and the duration for bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Clip {
    /// Clip name
    pub name: ArrayString<CLIP_NAME_LEN>,
    /// Length in seconds at pitch 1.0
    pub duration: f32,
}

impl Clip {
    /// Create a clip with the given name and duration.
    pub fn new(name: &str, duration: f32) -> Self {
        let mut clip = Self { name: ArrayString::new(), duration: duration.max(0.0) };
        for ch in name.chars() {
            if clip.name.try_push(ch).is_err() {
                break;
            }
        }
        clip
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_names_are_truncated() {
        let clip = Clip::new("an-exceptionally-long-clip-name-that-overflows", 1.0);
        assert_eq!(clip.name.len(), CLIP_NAME_LEN);
        assert!(clip.name.starts_with("an-exceptionally"));
    }

    #[test]
    fn negative_duration_clamps_to_zero() {
        assert_eq!(Clip::new("x", -2.0).duration, 0.0);
    }
}
