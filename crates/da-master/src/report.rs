//! Summary of a session run.

use std::fmt;

use da_engine::PlayOutcome;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionReport {
    /// Simulated seconds
    pub duration: f32,
    pub ticks: u64,
    pub cues_fired: usize,
    pub started: usize,
    pub scheduled: usize,
    /// Requests the pool could not take, delayed ones included
    pub dropped: usize,
    /// play_music and crossfade cues
    pub music_changes: usize,
    /// Non-looping voices that played to the end
    pub finished: usize,
    pub peak_active_voices: usize,
    pub pool_capacity: usize,
    /// Most recent playback warnings, oldest first
    pub warnings: Vec<String>,
}

impl SessionReport {
    pub(crate) fn record(&mut self, outcome: PlayOutcome) {
        match outcome {
            PlayOutcome::Started(_) => self.started += 1,
            PlayOutcome::Scheduled => self.scheduled += 1,
            // the manager counts drops, including delayed requests
            PlayOutcome::Dropped => {}
        }
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Session: {:.2}s in {} ticks, {} cues", self.duration, self.ticks, self.cues_fired)?;
        writeln!(
            f,
            "  sfx: {} started, {} scheduled, {} dropped, {} finished",
            self.started, self.scheduled, self.dropped, self.finished
        )?;
        writeln!(f, "  music changes: {}", self.music_changes)?;
        writeln!(f, "  voices: peak {} active, pool capacity {}", self.peak_active_voices, self.pool_capacity)?;
        if self.warnings.is_empty() {
            write!(f, "  warnings: none")
        } else {
            write!(f, "  warnings:")?;
            for warning in &self.warnings {
                write!(f, "\n    {}", warning)?;
            }
            Ok(())
        }
    }
}
