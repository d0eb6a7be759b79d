//! Candidate play search
//!
//! Words are grown from anchor squares: every filled square, or the center of
//! an empty board. At each anchor the existing run along an axis is extended
//! one rack letter at a time, forward while the dictionary knows a longer word
//! starting with the fragment and backward while it knows one ending with it.
//! Every complete word is handed to the validator, which has the final say.
//!
//! The search is stateful and single-use: call `generate_next` until it
//! returns false (or a budget runs out), then read `ordered_plays`.

use super::board::{Axis, Board, Placement, Position};
use super::rack::Rack;
use super::validation::{ValidationResult, Validator, WordBreakdown};
use super::WILDCARD;
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// A validated, scored move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Play {
    pub placements: Vec<Placement>,
    pub score: u32,
    pub words: Vec<WordBreakdown>,
}

impl Play {
    /// The main word, as shown in logs and the move list.
    pub fn word(&self) -> String {
        self.words
            .iter()
            .max_by_key(|w| w.letters.iter().filter(|l| l.is_new).count())
            .map(WordBreakdown::word)
            .unwrap_or_default()
    }
}

/// How the next anchor is picked from the queue.
#[derive(Debug, Clone)]
pub enum AnchorOrder {
    Random(StdRng),
    /// Board placement order; used by tests.
    Sequential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extension {
    Forward,
    Backward,
}

/// A word under construction and the index of its first letter on the line.
#[derive(Debug, Clone)]
struct Fragment {
    letters: Vec<char>,
    start: usize,
}

impl Fragment {
    fn extended(&self, letter: char, way: Extension, size: usize) -> Option<Fragment> {
        let mut letters = Vec::with_capacity(self.letters.len() + 1);
        let start = match way {
            Extension::Forward => {
                if self.start + self.letters.len() >= size {
                    return None;
                }
                letters.extend_from_slice(&self.letters);
                letters.push(letter);
                self.start
            }
            Extension::Backward => {
                let start = self.start.checked_sub(1)?;
                letters.push(letter);
                letters.extend_from_slice(&self.letters);
                start
            }
        };
        Some(Fragment { letters, start })
    }

    fn word(&self) -> String {
        self.letters.iter().collect()
    }
}

pub struct PlayGenerator<'a> {
    validator: Validator<'a>,
    board: &'a Board,
    letters: Vec<char>,
    anchors: Vec<Position>,
    order: AnchorOrder,
    plays: Vec<Play>,
    tried: HashSet<Vec<Placement>>,
}

impl<'a> PlayGenerator<'a> {
    pub fn new(validator: Validator<'a>, board: &'a Board, rack: &Rack, order: AnchorOrder) -> Self {
        let anchors = if board.is_empty() {
            vec![board.center()]
        } else {
            board.filled_positions().to_vec()
        };

        Self {
            validator,
            board,
            letters: rack.letters(),
            anchors,
            order,
            plays: Vec::new(),
            tried: HashSet::new(),
        }
    }

    /// Search one anchor along both axes. Returns whether anchors remain.
    pub fn generate_next(&mut self) -> bool {
        let Some(anchor) = self.next_anchor() else {
            return false;
        };

        for axis in Axis::BOTH {
            self.try_generate(anchor, axis);
        }

        if self.anchors.is_empty() {
            debug!(plays = self.plays.len(), "play generation finished");
        }
        !self.anchors.is_empty()
    }

    /// Run the search to exhaustion.
    pub fn generate_all(&mut self) {
        while self.generate_next() {}
    }

    /// Accumulated plays by descending score. Equal scores keep discovery order.
    pub fn ordered_plays(&self) -> Vec<Play> {
        let mut plays = self.plays.clone();
        plays.sort_by(|a, b| b.score.cmp(&a.score));
        plays
    }

    pub fn into_ordered_plays(mut self) -> Vec<Play> {
        self.plays.sort_by(|a, b| b.score.cmp(&a.score));
        self.plays
    }

    pub fn plays_generated(&self) -> usize {
        self.plays.len()
    }

    pub fn remaining_anchors(&self) -> usize {
        self.anchors.len()
    }

    fn next_anchor(&mut self) -> Option<Position> {
        if self.anchors.is_empty() {
            return None;
        }
        match &mut self.order {
            AnchorOrder::Random(rng) => {
                let index = rng.random_range(0..self.anchors.len());
                Some(self.anchors.swap_remove(index))
            }
            AnchorOrder::Sequential => Some(self.anchors.remove(0)),
        }
    }

    fn try_generate(&mut self, anchor: Position, axis: Axis) {
        let start = self.run_start(anchor, axis);
        let existing = self.read_run(start, axis);

        for (begin, word) in self.find_words(existing, axis.coordinate(start)) {
            let placements: Vec<Placement> = word
                .chars()
                .enumerate()
                .map(|(i, letter)| Placement::new(letter, axis.at(start, begin + i)))
                .collect();

            let Ok(fresh) = Validator::retrieve_new_letters(self.board, &placements) else {
                continue;
            };
            if fresh.is_empty() {
                continue;
            }

            let mut key = fresh.clone();
            key.sort_by_key(|p| p.position);
            if !self.tried.insert(key) {
                continue;
            }

            if let ValidationResult::Success { score, words } = self.validator.validate(self.board, &fresh) {
                self.plays.push(Play {
                    placements: fresh,
                    score,
                    words,
                });
            }
        }
    }

    /// First square of the filled run through `anchor`.
    fn run_start(&self, anchor: Position, axis: Axis) -> Position {
        let size = self.board.size();
        let mut start = anchor;
        while let Some(previous) = start.step(axis.backward(), size) {
            if !self.board.is_filled(previous) {
                break;
            }
            start = previous;
        }
        start
    }

    fn read_run(&self, start: Position, axis: Axis) -> Vec<char> {
        let size = self.board.size();
        let mut letters = Vec::new();
        let mut current = Some(start);
        while let Some(position) = current {
            match self.board.letter_at(position) {
                Some(letter) => letters.push(letter),
                None => break,
            }
            current = position.step(axis.forward(), size);
        }
        letters
    }

    /// Every dictionary word reachable from `existing` with the rack,
    /// as (start index, word). Uppercase letters came from wildcards.
    fn find_words(&self, existing: Vec<char>, start: usize) -> BTreeSet<(usize, String)> {
        let mut found = BTreeSet::new();
        let seed = Fragment {
            letters: existing,
            start,
        };
        self.extend(&mut found, &self.letters, &seed, Extension::Forward);
        self.extend(&mut found, &self.letters, &seed, Extension::Backward);
        found
    }

    fn extend(
        &self,
        found: &mut BTreeSet<(usize, String)>,
        rack: &[char],
        fragment: &Fragment,
        way: Extension,
    ) {
        let dictionary = self.validator.dictionary();
        let size = self.board.size();
        let mut seen_tiles = HashSet::new();

        for (index, &tile) in rack.iter().enumerate() {
            // Identical tiles lead to identical subtrees.
            if !seen_tiles.insert(tile) {
                continue;
            }
            let mut remaining = rack.to_vec();
            remaining.remove(index);

            let options: Vec<char> = if tile == WILDCARD {
                ('A'..='Z').collect()
            } else {
                vec![tile]
            };

            for letter in options {
                let Some(next) = fragment.extended(letter, way, size) else {
                    continue;
                };
                let word = next.word();
                let lookup = dictionary.has_prefix(&word);

                if lookup.is_word {
                    found.insert((next.start, word.clone()));
                }
                if remaining.is_empty() {
                    continue;
                }
                if lookup.has_extensions {
                    self.extend(found, &remaining, &next, Extension::Forward);
                }
                if dictionary.has_suffix(&word) {
                    self.extend(found, &remaining, &next, Extension::Backward);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::dictionary::Dictionary;
    use crate::game::validation::ScoringRules;
    use rand::SeedableRng;

    fn p(x: usize, y: usize) -> Position {
        Position::new(x, y)
    }

    fn rack(letters: &[char]) -> Rack {
        Rack::from_letters(letters).unwrap()
    }

    fn place_word(board: &mut Board, word: &str, start: Position, axis: Axis) {
        let placements: Vec<Placement> = word
            .chars()
            .enumerate()
            .map(|(i, c)| Placement::new(c, axis.at(start, axis.coordinate(start) + i)))
            .collect();
        board.merge(&placements).unwrap();
    }

    fn generate(dictionary: &Dictionary, board: &Board, letters: &[char], order: AnchorOrder) -> Vec<Play> {
        let validator = Validator::new(dictionary, ScoringRules::default());
        let rack = rack(letters);
        let mut generator = PlayGenerator::new(validator, board, &rack, order);
        generator.generate_all();
        generator.into_ordered_plays()
    }

    #[test]
    fn test_empty_board_anchors_on_center() {
        let dictionary = Dictionary::from_words(["cat", "act", "at", "a"]);
        let board = Board::new(15);
        let validator = Validator::new(&dictionary, ScoringRules::default());
        let rack = rack(&['c', 'a', 't']);
        let generator = PlayGenerator::new(validator, &board, &rack, AnchorOrder::Sequential);
        assert_eq!(generator.remaining_anchors(), 1);
    }

    #[test]
    fn test_first_move_plays_cover_center() {
        let dictionary = Dictionary::from_words(["cat", "act", "at", "a"]);
        let board = Board::new(15);
        let plays = generate(
            &dictionary,
            &board,
            &['c', 'a', 't'],
            AnchorOrder::Random(StdRng::seed_from_u64(3)),
        );

        assert!(!plays.is_empty());
        for play in &plays {
            assert!(
                play.placements.iter().any(|pl| pl.position == board.center()),
                "{:?} misses the center",
                play
            );
        }
        assert!(plays.iter().any(|play| play.word() == "cat"));
        assert!(plays.iter().any(|play| play.word() == "act"));
    }

    #[test]
    fn test_extends_existing_word_both_ways() {
        let dictionary = Dictionary::from_words(["cat", "cats", "scat", "at", "a"]);
        let mut board = Board::new(15);
        place_word(&mut board, "cat", p(6, 7), Axis::Horizontal);

        let plays = generate(&dictionary, &board, &['s'], AnchorOrder::Sequential);
        let placements: Vec<Vec<Placement>> = plays.iter().map(|p| p.placements.clone()).collect();

        assert_eq!(plays.len(), 2);
        assert!(placements.contains(&vec![Placement::new('s', p(9, 7))]));
        assert!(placements.contains(&vec![Placement::new('s', p(5, 7))]));
        assert!(plays.iter().all(|play| play.score == 6));
    }

    #[test]
    fn test_plays_sorted_by_descending_score() {
        let dictionary = Dictionary::from_words(["at", "cat", "zat", "ta", "a"]);
        let mut board = Board::new(15);
        place_word(&mut board, "at", p(7, 7), Axis::Horizontal);

        let plays = generate(&dictionary, &board, &['c', 'z'], AnchorOrder::Sequential);
        assert!(plays.len() >= 2);
        assert_eq!(plays[0].word(), "zat");
        for pair in plays.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_ordered_plays_during_search() {
        let dictionary = Dictionary::from_words(["at", "cat", "zat", "ta", "a"]);
        let mut board = Board::new(15);
        place_word(&mut board, "at", p(7, 7), Axis::Horizontal);

        let validator = Validator::new(&dictionary, ScoringRules::default());
        let rack = rack(&['c', 'z']);
        let mut generator = PlayGenerator::new(validator, &board, &rack, AnchorOrder::Sequential);
        assert!(generator.ordered_plays().is_empty());

        while generator.generate_next() {
            let snapshot = generator.ordered_plays();
            assert_eq!(snapshot.len(), generator.plays_generated());
            for pair in snapshot.windows(2) {
                assert!(pair[0].score >= pair[1].score);
            }
        }

        let plays = generator.ordered_plays();
        assert!(!plays.is_empty());
        assert_eq!(plays[0].word(), "zat");
        assert_eq!(plays, generator.into_ordered_plays());
    }

    #[test]
    fn test_wildcard_becomes_uppercase_placement() {
        let dictionary = Dictionary::from_words(["at", "cat", "a"]);
        let mut board = Board::new(15);
        place_word(&mut board, "at", p(7, 7), Axis::Horizontal);

        let plays = generate(&dictionary, &board, &[WILDCARD], AnchorOrder::Sequential);
        assert!(!plays.is_empty());
        assert_eq!(plays[0].placements, vec![Placement::new('C', p(6, 7))]);
        assert_eq!(plays[0].score, 2);
        assert!(plays
            .iter()
            .flat_map(|play| &play.placements)
            .all(Placement::is_wildcard));
    }

    #[test]
    fn test_extension_stays_on_board() {
        let dictionary = Dictionary::from_words(["cat", "cats", "scat"]);
        let mut board = Board::new(5);
        place_word(&mut board, "cat", p(2, 2), Axis::Horizontal);

        let plays = generate(&dictionary, &board, &['s'], AnchorOrder::Sequential);
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].placements, vec![Placement::new('s', p(1, 2))]);
    }

    #[test]
    fn test_no_duplicate_placement_sets() {
        let dictionary = Dictionary::from_words(["at", "ta", "tat", "att", "a", "t"]);
        let mut board = Board::new(15);
        place_word(&mut board, "at", p(7, 7), Axis::Horizontal);

        let plays = generate(&dictionary, &board, &['t', 'a', 't'], AnchorOrder::Sequential);
        let mut keys = HashSet::new();
        for play in &plays {
            let mut key = play.placements.clone();
            key.sort_by_key(|pl| pl.position);
            assert!(keys.insert(key), "duplicate play {:?}", play);
        }
    }

    #[test]
    fn test_generate_next_consumes_one_anchor_per_call() {
        let dictionary = Dictionary::from_words(["cat", "cats"]);
        let mut board = Board::new(15);
        place_word(&mut board, "cat", p(6, 7), Axis::Horizontal);

        let validator = Validator::new(&dictionary, ScoringRules::default());
        let rack = rack(&['s']);
        let mut generator = PlayGenerator::new(
            validator,
            &board,
            &rack,
            AnchorOrder::Random(StdRng::seed_from_u64(1)),
        );

        assert_eq!(generator.remaining_anchors(), 3);
        assert!(generator.generate_next());
        assert_eq!(generator.remaining_anchors(), 2);
        assert!(generator.generate_next());
        assert!(!generator.generate_next());
        assert!(!generator.generate_next());
        assert_eq!(generator.plays_generated(), 1);
    }

    #[test]
    fn test_empty_rack_yields_nothing() {
        let dictionary = Dictionary::from_words(["cat"]);
        let board = Board::new(15);
        let plays = generate(&dictionary, &board, &[], AnchorOrder::Sequential);
        assert!(plays.is_empty());
    }
}
