//! Voice effects and the filters that realize them.

use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

/// A named effect a request can ask for.
///
/// Each effect maps to exactly one filter with fixed parameters; see
/// [`AudioEffect::filter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AudioEffect {
    #[default]
    None,
    /// Low-pass at 800 Hz
    Muffled,
    /// Distortion at level 0.5
    Robot,
    /// 500 ms echo
    Echo,
    /// Reverb with the cave preset
    Cave,
    /// 40 ms chorus
    Chorus,
}

impl AudioEffect {
    /// All effects in declaration order.
    pub const ALL: [AudioEffect; 6] = [
        AudioEffect::None,
        AudioEffect::Muffled,
        AudioEffect::Robot,
        AudioEffect::Echo,
        AudioEffect::Cave,
        AudioEffect::Chorus,
    ];

    /// Returns the variant name as a static string.
    pub fn name(&self) -> &'static str {
        match self {
            AudioEffect::None => "None",
            AudioEffect::Muffled => "Muffled",
            AudioEffect::Robot => "Robot",
            AudioEffect::Echo => "Echo",
            AudioEffect::Cave => "Cave",
            AudioEffect::Chorus => "Chorus",
        }
    }

    /// Look up an effect by its numeric index (declaration order).
    pub fn from_index(index: u8) -> Result<Self, ParseEffectError> {
        Self::ALL
            .get(index as usize)
            .copied()
            .ok_or_else(|| ParseEffectError(index.to_string()))
    }

    /// The filter this effect enables, or `None` for [`AudioEffect::None`].
    pub fn filter(&self) -> Option<Filter> {
        match self {
            AudioEffect::None => None,
            AudioEffect::Muffled => Some(Filter::LowPass { cutoff_hz: 800.0 }),
            AudioEffect::Robot => Some(Filter::Distortion { level: 0.5 }),
            AudioEffect::Echo => Some(Filter::Echo { delay_ms: 500.0, decay: 0.5, wet_mix: 1.0, dry_mix: 1.0 }),
            AudioEffect::Cave => Some(Filter::Reverb { preset: ReverbPreset::Cave }),
            AudioEffect::Chorus => Some(Filter::Chorus { delay_ms: 40.0, rate: 0.8, depth: 0.7 }),
        }
    }
}

impl fmt::Display for AudioEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AudioEffect {
    type Err = ParseEffectError;

    /// Case-insensitive match on the variant name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEffectError(s.to_string()))
    }
}

/// An effect value outside the recognized set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseEffectError(pub String);

impl fmt::Display for ParseEffectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown audio effect: {}", self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseEffectError {}

/// Reverb room presets understood by the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReverbPreset {
    Off,
    Cave,
}

/// Filter kinds, one slot each in a [`FilterBank`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterKind {
    LowPass,
    Distortion,
    Echo,
    Reverb,
    Chorus,
}

impl FilterKind {
    const COUNT: usize = 5;

    fn slot(self) -> usize {
        match self {
            FilterKind::LowPass => 0,
            FilterKind::Distortion => 1,
            FilterKind::Echo => 2,
            FilterKind::Reverb => 3,
            FilterKind::Chorus => 4,
        }
    }
}

/// A configured filter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Filter {
    LowPass { cutoff_hz: f32 },
    Distortion { level: f32 },
    Echo { delay_ms: f32, decay: f32, wet_mix: f32, dry_mix: f32 },
    Reverb { preset: ReverbPreset },
    Chorus { delay_ms: f32, rate: f32, depth: f32 },
}

impl Filter {
    pub fn kind(&self) -> FilterKind {
        match self {
            Filter::LowPass { .. } => FilterKind::LowPass,
            Filter::Distortion { .. } => FilterKind::Distortion,
            Filter::Echo { .. } => FilterKind::Echo,
            Filter::Reverb { .. } => FilterKind::Reverb,
            Filter::Chorus { .. } => FilterKind::Chorus,
        }
    }
}

/// A filter attached to a voice, which may be switched off.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterSlot {
    pub filter: Filter,
    pub enabled: bool,
}

/// Per-voice filter chain.
///
/// Slots are created on first use and afterwards only toggled, so a voice
/// that once ran an echo keeps a disabled echo slot around.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FilterBank {
    slots: [Option<FilterSlot>; FilterKind::COUNT],
}

impl FilterBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable every attached filter.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.enabled = false;
        }
    }

    /// Make `effect` the only enabled filter. [`AudioEffect::None`] leaves
    /// every filter disabled.
    pub fn apply(&mut self, effect: AudioEffect) {
        self.clear();
        if let Some(filter) = effect.filter() {
            self.slots[filter.kind().slot()] = Some(FilterSlot { filter, enabled: true });
        }
    }

    /// The slot for `kind`, if a filter of that kind was ever attached.
    pub fn get(&self, kind: FilterKind) -> Option<&FilterSlot> {
        self.slots[kind.slot()].as_ref()
    }

    pub fn is_enabled(&self, kind: FilterKind) -> bool {
        self.get(kind).is_some_and(|s| s.enabled)
    }

    /// Iterate over the enabled filters.
    pub fn enabled(&self) -> impl Iterator<Item = &Filter> {
        self.slots.iter().flatten().filter(|s| s.enabled).map(|s| &s.filter)
    }

    /// Number of attached slots, enabled or not.
    pub fn attached_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effect_parses_case_insensitively() {
        assert_eq!("muffled".parse::<AudioEffect>(), Ok(AudioEffect::Muffled));
        assert_eq!(" Cave ".parse::<AudioEffect>(), Ok(AudioEffect::Cave));
    }

    #[test]
    fn unknown_effect_is_rejected() {
        let err = "underwater".parse::<AudioEffect>().unwrap_err();
        assert_eq!(err, ParseEffectError("underwater".into()));
        assert!(AudioEffect::from_index(6).is_err());
        assert_eq!(AudioEffect::from_index(5), Ok(AudioEffect::Chorus));
    }

    #[test]
    fn fixed_filter_parameters() {
        assert_eq!(AudioEffect::Muffled.filter(), Some(Filter::LowPass { cutoff_hz: 800.0 }));
        assert_eq!(AudioEffect::Robot.filter(), Some(Filter::Distortion { level: 0.5 }));
        assert_eq!(
            AudioEffect::Echo.filter(),
            Some(Filter::Echo { delay_ms: 500.0, decay: 0.5, wet_mix: 1.0, dry_mix: 1.0 })
        );
        assert_eq!(AudioEffect::Cave.filter(), Some(Filter::Reverb { preset: ReverbPreset::Cave }));
        assert_eq!(
            AudioEffect::Chorus.filter(),
            Some(Filter::Chorus { delay_ms: 40.0, rate: 0.8, depth: 0.7 })
        );
        assert_eq!(AudioEffect::None.filter(), None);
    }

    #[test]
    fn apply_is_exclusive() {
        let mut bank = FilterBank::new();
        bank.apply(AudioEffect::Muffled);
        bank.apply(AudioEffect::Echo);
        assert!(bank.is_enabled(FilterKind::Echo));
        assert!(!bank.is_enabled(FilterKind::LowPass));
        // the low-pass slot stays attached, just switched off
        assert_eq!(bank.attached_count(), 2);
        assert_eq!(bank.enabled().count(), 1);
    }

    #[test]
    fn apply_none_disables_everything() {
        let mut bank = FilterBank::new();
        bank.apply(AudioEffect::Robot);
        bank.apply(AudioEffect::None);
        assert_eq!(bank.enabled().count(), 0);
    }
}
