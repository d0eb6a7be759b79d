//! Placement validation and scoring
//!
//! Checks a batch of placements against the board and dictionary, in order:
//! 1. Every placement is a letter on a free, in-bounds, distinct square
//! 2. Placements share a row or column and leave no gap
//! 3. The first move covers the center; later moves touch existing letters
//! 4. Every word formed this turn is in the dictionary
//!
//! Validation never mutates the board. Failures are values, not errors.

use super::board::{Axis, Board, Placement, Position};
use super::dictionary::Dictionary;
use super::rack::Rack;
use super::{letter_value, RACK_OUT_BONUS, RACK_SIZE};
use std::collections::{HashMap, HashSet};

/// Scoring constants that vary with the game configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringRules {
    pub rack_size: usize,
    pub rack_out_bonus: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            rack_size: RACK_SIZE,
            rack_out_bonus: RACK_OUT_BONUS,
        }
    }
}

/// One letter of a formed word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedLetter {
    pub letter: char,
    pub position: Position,
    /// Placed this turn (as opposed to already on the board).
    pub is_new: bool,
}

/// A word formed by a move, with its contribution to the score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordBreakdown {
    pub letters: Vec<PlacedLetter>,
    pub score: u32,
}

impl WordBreakdown {
    /// The word in lowercase.
    pub fn word(&self) -> String {
        self.letters
            .iter()
            .map(|l| l.letter.to_ascii_lowercase())
            .collect()
    }
}

/// Why a move was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    NoPlacement,
    InvalidLetter { letter: char },
    OutOfBounds { position: Position },
    DuplicatePosition { position: Position },
    Collision { position: Position },
    NotAligned,
    NotContiguous,
    MissingCenter,
    Disconnected,
    InvalidWord { word: String },
    LetterNotInRack { letter: char },
}

impl ValidationFailure {
    /// Returns a user-friendly error message
    pub fn message(&self) -> String {
        match self {
            ValidationFailure::NoPlacement => "No letters placed".to_string(),
            ValidationFailure::InvalidLetter { letter } => {
                format!("'{}' is not a letter", letter)
            }
            ValidationFailure::OutOfBounds { position } => {
                format!("Square {} is off the board", position)
            }
            ValidationFailure::DuplicatePosition { position } => {
                format!("Square {} is used twice", position)
            }
            ValidationFailure::Collision { position } => {
                format!("Square {} is already taken", position)
            }
            ValidationFailure::NotAligned => "Letters must share a row or column".to_string(),
            ValidationFailure::NotContiguous => "Letters must not leave gaps".to_string(),
            ValidationFailure::MissingCenter => "First word must cover the center".to_string(),
            ValidationFailure::Disconnected => {
                "Word must touch a letter already on the board".to_string()
            }
            ValidationFailure::InvalidWord { word } => {
                format!("'{}' is not in the dictionary", word)
            }
            ValidationFailure::LetterNotInRack { letter } => {
                format!("Letter '{}' is not in your rack", letter)
            }
        }
    }
}

/// Outcome of validating a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Success {
        score: u32,
        words: Vec<WordBreakdown>,
    },
    Failure(ValidationFailure),
}

impl ValidationResult {
    pub fn score(&self) -> Option<u32> {
        match self {
            ValidationResult::Success { score, .. } => Some(*score),
            ValidationResult::Failure(_) => None,
        }
    }
}

impl From<ValidationFailure> for ValidationResult {
    fn from(failure: ValidationFailure) -> Self {
        ValidationResult::Failure(failure)
    }
}

/// Move checker bound to one dictionary and rule set.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    dictionary: &'a Dictionary,
    rules: ScoringRules,
}

impl<'a> Validator<'a> {
    pub fn new(dictionary: &'a Dictionary, rules: ScoringRules) -> Self {
        Self { dictionary, rules }
    }

    pub fn dictionary(&self) -> &'a Dictionary {
        self.dictionary
    }

    /// Check a move and score it, leaving the board untouched.
    pub fn validate(&self, board: &Board, placements: &[Placement]) -> ValidationResult {
        match self.evaluate(board, placements) {
            Ok((score, words)) => ValidationResult::Success { score, words },
            Err(failure) => ValidationResult::Failure(failure),
        }
    }

    /// Check that the rack holds every tile the placements consume.
    pub fn check_rack(rack: &Rack, placements: &[Placement]) -> Result<(), ValidationFailure> {
        let needed: Vec<char> = placements.iter().map(Placement::rack_letter).collect();
        match rack.missing(&needed) {
            Some(letter) => Err(ValidationFailure::LetterNotInRack { letter }),
            None => Ok(()),
        }
    }

    /// Drop placements that repeat a letter already on the board.
    ///
    /// A placement on a square holding a different letter is a collision.
    pub fn retrieve_new_letters(
        board: &Board,
        placements: &[Placement],
    ) -> Result<Vec<Placement>, ValidationFailure> {
        let mut fresh = Vec::with_capacity(placements.len());
        for placement in placements {
            if !board.contains(placement.position) {
                return Err(ValidationFailure::OutOfBounds {
                    position: placement.position,
                });
            }
            match board.letter_at(placement.position) {
                Some(existing) if existing.eq_ignore_ascii_case(&placement.letter) => {}
                Some(_) => {
                    return Err(ValidationFailure::Collision {
                        position: placement.position,
                    })
                }
                None => fresh.push(*placement),
            }
        }
        Ok(fresh)
    }

    fn evaluate(
        &self,
        board: &Board,
        placements: &[Placement],
    ) -> Result<(u32, Vec<WordBreakdown>), ValidationFailure> {
        check_squares(board, placements)?;
        let axis = placement_axis(placements)?;

        let placed: HashMap<Position, char> = placements
            .iter()
            .map(|p| (p.position, p.letter))
            .collect();
        let overlay = Overlay { board, placed: &placed };

        check_contiguous(&overlay, placements, axis)?;

        let first_move = board.is_empty();
        if first_move {
            if !placed.contains_key(&board.center()) {
                return Err(ValidationFailure::MissingCenter);
            }
        } else if !placements
            .iter()
            .any(|p| board.has_filled_neighbor(p.position))
        {
            return Err(ValidationFailure::Disconnected);
        }

        let mut words = Vec::new();
        let main = overlay.run(placements[0].position, axis);
        if main.len() >= 2 {
            words.push(main.clone());
        }
        for placement in placements {
            let cross = overlay.run(placement.position, axis.perpendicular());
            if cross.len() >= 2 {
                words.push(cross);
            }
        }
        if words.is_empty() {
            // Only a lone first tile gets here: it stands as a one-letter word.
            if !first_move {
                return Err(ValidationFailure::Disconnected);
            }
            words.push(main);
        }

        let mut breakdowns = Vec::with_capacity(words.len());
        for letters in words {
            let word: String = letters
                .iter()
                .map(|l| l.letter.to_ascii_lowercase())
                .collect();
            if !self.dictionary.contains(&word) {
                return Err(ValidationFailure::InvalidWord { word });
            }
            let score = score_word(board, &letters);
            breakdowns.push(WordBreakdown { letters, score });
        }

        let mut total: u32 = breakdowns.iter().map(|w| w.score).sum();
        if placements.len() == self.rules.rack_size {
            total += self.rules.rack_out_bonus;
        }
        Ok((total, breakdowns))
    }
}

/// Board letters plus the letters of the move being checked.
struct Overlay<'b> {
    board: &'b Board,
    placed: &'b HashMap<Position, char>,
}

impl Overlay<'_> {
    fn letter_at(&self, position: Position) -> Option<(char, bool)> {
        if let Some(&letter) = self.placed.get(&position) {
            return Some((letter, true));
        }
        self.board.letter_at(position).map(|letter| (letter, false))
    }

    /// Maximal run of letters through `position` along `axis`, in reading order.
    fn run(&self, position: Position, axis: Axis) -> Vec<PlacedLetter> {
        let size = self.board.size();
        let mut start = position;
        while let Some(previous) = start.step(axis.backward(), size) {
            if self.letter_at(previous).is_none() {
                break;
            }
            start = previous;
        }

        let mut letters = Vec::new();
        let mut current = Some(start);
        while let Some(position) = current {
            match self.letter_at(position) {
                Some((letter, is_new)) => letters.push(PlacedLetter {
                    letter,
                    position,
                    is_new,
                }),
                None => break,
            }
            current = position.step(axis.forward(), size);
        }
        letters
    }
}

fn check_squares(board: &Board, placements: &[Placement]) -> Result<(), ValidationFailure> {
    if placements.is_empty() {
        return Err(ValidationFailure::NoPlacement);
    }

    let mut seen = HashSet::with_capacity(placements.len());
    for placement in placements {
        if !placement.letter.is_ascii_alphabetic() {
            return Err(ValidationFailure::InvalidLetter {
                letter: placement.letter,
            });
        }
        let position = placement.position;
        if !board.contains(position) {
            return Err(ValidationFailure::OutOfBounds { position });
        }
        if board.is_filled(position) {
            return Err(ValidationFailure::Collision { position });
        }
        if !seen.insert(position) {
            return Err(ValidationFailure::DuplicatePosition { position });
        }
    }
    Ok(())
}

fn placement_axis(placements: &[Placement]) -> Result<Axis, ValidationFailure> {
    let first = placements[0].position;
    if placements.iter().all(|p| p.position.y == first.y) {
        Ok(Axis::Horizontal)
    } else if placements.iter().all(|p| p.position.x == first.x) {
        Ok(Axis::Vertical)
    } else {
        Err(ValidationFailure::NotAligned)
    }
}

fn check_contiguous(
    overlay: &Overlay<'_>,
    placements: &[Placement],
    axis: Axis,
) -> Result<(), ValidationFailure> {
    let line = placements[0].position;
    let coordinates = placements.iter().map(|p| axis.coordinate(p.position));
    let (low, high) = coordinates.fold((usize::MAX, 0), |(lo, hi), c| (lo.min(c), hi.max(c)));

    if (low..=high).all(|i| overlay.letter_at(axis.at(line, i)).is_some()) {
        Ok(())
    } else {
        Err(ValidationFailure::NotContiguous)
    }
}

/// Letter bonuses apply to new tiles only; the word takes the highest
/// word bonus among its new tiles.
fn score_word(board: &Board, letters: &[PlacedLetter]) -> u32 {
    let mut sum = 0;
    let mut multiplier = 1;
    for placed in letters {
        let value = letter_value(placed.letter);
        if placed.is_new {
            let bonus = board
                .get(placed.position)
                .map(|square| square.bonus)
                .unwrap_or_default();
            sum += value * bonus.letter_multiplier();
            multiplier = multiplier.max(bonus.word_multiplier());
        } else {
            sum += value;
        }
    }
    sum * multiplier
}
