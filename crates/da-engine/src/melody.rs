//! Procedural melody: semitone offsets that wander along a scale.

use rand::{Rng, RngCore};

/// Source of melodic pitch offsets.
pub trait MelodySource {
    /// Next semitone offset from the root, at manager time `now` (seconds).
    fn next_semitone(&mut self, now: f32, rng: &mut dyn RngCore) -> i32;
}

/// Major and natural minor, as semitone offsets.
pub const SCALES: [[i32; 7]; 2] = [
    [0, 2, 4, 5, 7, 9, 11],
    [0, 2, 3, 5, 7, 8, 10],
];

/// Seconds of silence after which the generator switches scale.
pub const INACTIVITY_THRESHOLD: f32 = 2.0;

/// Random walk over a scale with momentum.
///
/// Each note moves up, down or stays on the scale. After a move the same
/// direction is favoured (50% continue, 30% hold, 20% reverse); from rest
/// the three choices are about equally likely. A pause longer than
/// [`INACTIVITY_THRESHOLD`] switches to the other scale and restarts at
/// the root.
#[derive(Clone, Debug)]
pub struct MelodyGenerator {
    scale: usize,
    note: usize,
    last_note_time: f32,
    last_move: i32,
    inactivity_threshold: f32,
}

impl Default for MelodyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MelodyGenerator {
    pub fn new() -> Self {
        Self {
            scale: 0,
            note: 0,
            last_note_time: 0.0,
            last_move: 0,
            inactivity_threshold: INACTIVITY_THRESHOLD,
        }
    }

    #[must_use]
    pub fn with_inactivity_threshold(mut self, seconds: f32) -> Self {
        self.inactivity_threshold = seconds;
        self
    }

    /// Index into [`SCALES`] currently in use.
    pub fn scale_index(&self) -> usize {
        self.scale
    }

    fn change_scale(&mut self, rng: &mut dyn RngCore) {
        let mut next = rng.gen_range(0..SCALES.len());
        if next == self.scale {
            next = (self.scale + 1) % SCALES.len();
        }
        self.scale = next;
    }

    fn choose_move(&self, roll: f32) -> i32 {
        match self.last_move.signum() {
            1 if roll < 0.5 => 1,
            1 if roll < 0.8 => 0,
            1 => -1,
            -1 if roll < 0.5 => -1,
            -1 if roll < 0.8 => 0,
            -1 => 1,
            _ if roll < 0.33 => -1,
            _ if roll < 0.66 => 0,
            _ => 1,
        }
    }
}

impl MelodySource for MelodyGenerator {
    fn next_semitone(&mut self, now: f32, rng: &mut dyn RngCore) -> i32 {
        if now - self.last_note_time > self.inactivity_threshold {
            self.change_scale(rng);
            self.note = 0;
        }
        self.last_note_time = now;

        let scale = &SCALES[self.scale];
        let step = self.choose_move(rng.gen::<f32>());
        let next = (self.note as i32 + step).clamp(0, scale.len() as i32 - 1) as usize;
        self.last_move = next as i32 - self.note as i32;
        self.note = next;
        scale[self.note]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn notes_stay_on_scale() {
        let mut melody = MelodyGenerator::new();
        let mut rng = StdRng::seed_from_u64(42);
        for i in 0..200 {
            let s = melody.next_semitone(i as f32 * 0.1, &mut rng);
            assert!(SCALES[melody.scale_index()].contains(&s));
        }
    }

    #[test]
    fn steps_move_at_most_one_degree() {
        let mut melody = MelodyGenerator::new();
        let mut rng = StdRng::seed_from_u64(5);
        let mut prev = melody.note;
        for i in 0..200 {
            melody.next_semitone(i as f32 * 0.1, &mut rng);
            assert!((melody.note as i32 - prev as i32).abs() <= 1);
            prev = melody.note;
        }
    }

    #[test]
    fn inactivity_switches_scale_and_resets_root() {
        let mut melody = MelodyGenerator::new();
        let mut rng = StdRng::seed_from_u64(9);
        melody.next_semitone(0.5, &mut rng);
        assert_eq!(melody.scale_index(), 0);
        melody.next_semitone(5.0, &mut rng);
        assert_eq!(melody.scale_index(), 1);
        // restarted at the root, so at most one degree away from it
        assert!(melody.note <= 1);
    }

    #[test]
    fn momentum_table() {
        let mut melody = MelodyGenerator::new();
        melody.last_move = 1;
        assert_eq!(melody.choose_move(0.1), 1);
        assert_eq!(melody.choose_move(0.6), 0);
        assert_eq!(melody.choose_move(0.9), -1);
        melody.last_move = -1;
        assert_eq!(melody.choose_move(0.1), -1);
        assert_eq!(melody.choose_move(0.9), 1);
        melody.last_move = 0;
        assert_eq!(melody.choose_move(0.2), -1);
        assert_eq!(melody.choose_move(0.5), 0);
        assert_eq!(melody.choose_move(0.7), 1);
    }
}
