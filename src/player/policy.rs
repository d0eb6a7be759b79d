//! Difficulty policies for the virtual player

use crate::game::generator::Play;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Expert,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Expert => write!(f, "expert"),
        }
    }
}

/// One row of the easy player's score table: with probability `chance`,
/// aim for a play scoring within `min..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub chance: f64,
    pub min: u32,
    pub max: u32,
}

impl ScoreRange {
    pub const fn new(chance: f64, min: u32, max: u32) -> Self {
        Self { chance, min, max }
    }

    pub fn contains(&self, score: u32) -> bool {
        (self.min..=self.max).contains(&score)
    }
}

/// 60% of 0-30, 30% of 31-60, 10% of anything above.
pub fn default_score_ranges() -> Vec<ScoreRange> {
    vec![
        ScoreRange::new(0.6, 0, 30),
        ScoreRange::new(0.3, 31, 60),
        ScoreRange::new(0.1, 61, u32::MAX),
    ]
}

/// What the Decide step rolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Exchange,
    Skip,
    Play,
}

/// Tunable behavior of a virtual player.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualPolicy {
    pub difficulty: Difficulty,
    /// Chance of exchanging instead of playing.
    pub exchange_chance: f64,
    /// Chance of skipping instead of playing.
    pub skip_chance: f64,
    pub score_ranges: Vec<ScoreRange>,
    /// Runner-up plays to report next to the chosen one.
    pub alternatives: usize,
    /// Cap on generator steps per turn; None searches every anchor.
    pub max_generation_steps: Option<usize>,
}

impl VirtualPolicy {
    pub fn easy() -> Self {
        Self {
            difficulty: Difficulty::Easy,
            exchange_chance: 0.1,
            skip_chance: 0.1,
            score_ranges: default_score_ranges(),
            alternatives: 3,
            max_generation_steps: None,
        }
    }

    /// Always plays its best move; never gives up a turn voluntarily.
    pub fn expert() -> Self {
        Self {
            difficulty: Difficulty::Expert,
            exchange_chance: 0.0,
            skip_chance: 0.0,
            ..Self::easy()
        }
    }

    /// Roll the turn intent. Exchanging needs letters left in the reserve.
    pub fn decide<R: Rng>(&self, rng: &mut R, reserve_len: usize) -> Intent {
        if self.difficulty == Difficulty::Expert {
            return Intent::Play;
        }

        let mut roll: f64 = rng.random();
        if roll < self.exchange_chance && reserve_len > 0 {
            return Intent::Exchange;
        }
        roll -= self.exchange_chance;
        if roll < self.skip_chance {
            return Intent::Skip;
        }
        Intent::Play
    }

    /// Pick a row of the score table by its chance. Falls back to an
    /// empty 0..=0 range when the chances sum below the roll.
    pub fn sample_range<R: Rng>(&self, rng: &mut R) -> ScoreRange {
        let mut roll: f64 = rng.random();
        for range in &self.score_ranges {
            if roll < range.chance {
                return *range;
            }
            roll -= range.chance;
        }
        ScoreRange::new(0.0, 0, 0)
    }

    /// Choose a play from `plays` (sorted by descending score).
    ///
    /// Expert takes the first; easy samples a score range and picks
    /// uniformly among the plays inside it. None means nothing fits.
    pub fn select_play<'p, R: Rng>(&self, plays: &'p [Play], rng: &mut R) -> Option<&'p Play> {
        match self.difficulty {
            Difficulty::Expert => plays.first(),
            Difficulty::Easy => {
                let range = self.sample_range(rng);
                select_in_range(plays, range, rng)
            }
        }
    }
}

impl Default for VirtualPolicy {
    fn default() -> Self {
        Self::easy()
    }
}

/// Uniform pick among the plays whose score lies in `range`.
pub fn select_in_range<'p, R: Rng>(
    plays: &'p [Play],
    range: ScoreRange,
    rng: &mut R,
) -> Option<&'p Play> {
    let candidates: Vec<&Play> = plays.iter().filter(|play| range.contains(play.score)).collect();
    candidates.choose(rng).copied()
}
