//! Letter racks and the shared reserve, both kept as counted multisets
//!
//! Removing letters never shifts indices, so letters can be taken out while
//! walking a placement list without invalidating anything.

use super::{is_tile_letter, letter_value, TILE_DISTRIBUTION};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RackError {
    #[error("letter '{letter}' is not in the rack")]
    MissingLetter { letter: char },
    #[error("'{letter}' is not a tile letter")]
    InvalidLetter { letter: char },
    #[error(transparent)]
    Reserve(#[from] ReserveError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReserveError {
    #[error("'{letter}' cannot be returned to the reserve")]
    InvalidLetter { letter: char },
}

/// The pool of undrawn letters, as seen by the turn logic.
pub trait LetterReserve {
    /// Take one random letter out, or None when empty.
    fn draw_letter(&mut self) -> Option<char>;

    /// Return a letter to the pool.
    fn put_back_letter(&mut self, letter: char) -> Result<(), ReserveError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared bag of undrawn letters with its own random source.
#[derive(Debug, Clone)]
pub struct Reserve {
    letters: BTreeMap<char, u32>,
    total: usize,
    rng: StdRng,
}

impl Reserve {
    /// The standard 100-tile bag, shuffled from thread entropy.
    pub fn standard() -> Self {
        Self::standard_with_rng(StdRng::from_rng(&mut rand::rng()))
    }

    /// The standard bag drawing from a caller-supplied (e.g. seeded) generator.
    pub fn standard_with_rng(rng: StdRng) -> Self {
        let letters: Vec<char> = TILE_DISTRIBUTION
            .iter()
            .flat_map(|&(letter, count)| std::iter::repeat(letter).take(count as usize))
            .collect();
        Self::from_letters(&letters, rng)
    }

    /// A reserve holding exactly `letters`. Non-tile characters are dropped.
    pub fn from_letters(letters: &[char], rng: StdRng) -> Self {
        let mut reserve = Self {
            letters: BTreeMap::new(),
            total: 0,
            rng,
        };
        for &letter in letters.iter().filter(|&&c| is_tile_letter(c)) {
            *reserve.letters.entry(letter).or_insert(0) += 1;
            reserve.total += 1;
        }
        reserve
    }

    /// Remaining count per letter, in alphabetical order (wildcard first).
    pub fn counts(&self) -> impl Iterator<Item = (char, u32)> + '_ {
        self.letters.iter().map(|(&letter, &count)| (letter, count))
    }
}

impl LetterReserve for Reserve {
    fn draw_letter(&mut self) -> Option<char> {
        if self.total == 0 {
            return None;
        }

        let mut index = self.rng.random_range(0..self.total) as u32;
        let mut drawn = None;
        for (&letter, &count) in &self.letters {
            if index < count {
                drawn = Some(letter);
                break;
            }
            index -= count;
        }

        let letter = drawn?;
        if let Some(count) = self.letters.get_mut(&letter) {
            *count -= 1;
            if *count == 0 {
                self.letters.remove(&letter);
            }
        }
        self.total -= 1;
        Some(letter)
    }

    fn put_back_letter(&mut self, letter: char) -> Result<(), ReserveError> {
        if !is_tile_letter(letter) {
            return Err(ReserveError::InvalidLetter { letter });
        }
        *self.letters.entry(letter).or_insert(0) += 1;
        self.total += 1;
        Ok(())
    }

    fn len(&self) -> usize {
        self.total
    }
}

/// A player's hand of letters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rack {
    letters: BTreeMap<char, u32>,
}

impl Rack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_letters(letters: &[char]) -> Result<Self, RackError> {
        let mut rack = Self::new();
        for &letter in letters {
            rack.add(letter)?;
        }
        Ok(rack)
    }

    pub fn add(&mut self, letter: char) -> Result<(), RackError> {
        if !is_tile_letter(letter) {
            return Err(RackError::InvalidLetter { letter });
        }
        *self.letters.entry(letter).or_insert(0) += 1;
        Ok(())
    }

    pub fn count(&self, letter: char) -> u32 {
        self.letters.get(&letter).copied().unwrap_or(0)
    }

    /// First letter of `letters` the rack cannot supply, counting multiplicity.
    pub fn missing(&self, letters: &[char]) -> Option<char> {
        let mut needed: BTreeMap<char, u32> = BTreeMap::new();
        for &letter in letters {
            let n = needed.entry(letter).or_insert(0);
            *n += 1;
            if *n > self.count(letter) {
                return Some(letter);
            }
        }
        None
    }

    /// Remove every letter in `letters`, or nothing at all.
    pub fn remove_all(&mut self, letters: &[char]) -> Result<(), RackError> {
        if let Some(letter) = self.missing(letters) {
            return Err(RackError::MissingLetter { letter });
        }
        for &letter in letters {
            if let Some(count) = self.letters.get_mut(&letter) {
                *count -= 1;
                if *count == 0 {
                    self.letters.remove(&letter);
                }
            }
        }
        Ok(())
    }

    /// Draw from `reserve` until the rack holds `capacity` letters or the
    /// reserve runs dry. Returns how many were drawn.
    ///
    /// A drawn letter the rack cannot hold goes back to the reserve and
    /// stops the refill with an error.
    pub fn refill<R: LetterReserve + ?Sized>(
        &mut self,
        reserve: &mut R,
        capacity: usize,
    ) -> Result<usize, RackError> {
        let mut drawn = 0;
        while self.len() < capacity {
            let Some(letter) = reserve.draw_letter() else {
                break;
            };
            if let Err(e) = self.add(letter) {
                reserve.put_back_letter(letter)?;
                return Err(e);
            }
            drawn += 1;
        }
        Ok(drawn)
    }

    /// Letters in alphabetical order, wildcard first.
    pub fn letters(&self) -> Vec<char> {
        self.letters
            .iter()
            .flat_map(|(&letter, &count)| std::iter::repeat(letter).take(count as usize))
            .collect()
    }

    /// Face value of the letters left in the rack.
    pub fn value(&self) -> u32 {
        self.letters
            .iter()
            .map(|(&letter, &count)| letter_value(letter) * count)
            .sum()
    }

    pub fn len(&self) -> usize {
        self.letters.values().map(|&count| count as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }
}

impl fmt::Display for Rack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letters: String = self.letters().into_iter().collect();
        write!(f, "{}", letters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::WILDCARD;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_standard_reserve_size() {
        let reserve = Reserve::standard_with_rng(rng());
        assert_eq!(reserve.len(), 100);
        assert_eq!(reserve.counts().find(|(l, _)| *l == 'e'), Some(('e', 12)));
    }

    #[test]
    fn test_draw_shrinks_reserve() {
        let mut reserve = Reserve::from_letters(&['a', 'a', 'b'], rng());
        let mut drawn = Vec::new();
        while let Some(letter) = reserve.draw_letter() {
            drawn.push(letter);
        }
        drawn.sort();
        assert_eq!(drawn, vec!['a', 'a', 'b']);
        assert!(reserve.is_empty());
        assert_eq!(reserve.draw_letter(), None);
    }

    #[test]
    fn test_seeded_draws_are_deterministic() {
        let mut first = Reserve::standard_with_rng(StdRng::seed_from_u64(9));
        let mut second = Reserve::standard_with_rng(StdRng::seed_from_u64(9));
        for _ in 0..20 {
            assert_eq!(first.draw_letter(), second.draw_letter());
        }
    }

    #[test]
    fn test_put_back_letter() {
        let mut reserve = Reserve::from_letters(&['a'], rng());
        reserve.put_back_letter('z').unwrap();
        reserve.put_back_letter(WILDCARD).unwrap();
        assert_eq!(reserve.len(), 3);

        assert_eq!(
            reserve.put_back_letter('N'),
            Err(ReserveError::InvalidLetter { letter: 'N' })
        );
        assert!(reserve.put_back_letter('3').is_err());
        assert_eq!(reserve.len(), 3);
    }

    #[test]
    fn test_rack_remove_all_is_atomic() {
        let mut rack = Rack::from_letters(&['c', 'a', 't', '*']).unwrap();
        assert_eq!(
            rack.remove_all(&['c', 'a', 'a']),
            Err(RackError::MissingLetter { letter: 'a' })
        );
        assert_eq!(rack.len(), 4);

        rack.remove_all(&['c', WILDCARD]).unwrap();
        assert_eq!(rack.letters(), vec!['a', 't']);
    }

    #[test]
    fn test_rack_missing_respects_multiplicity() {
        let rack = Rack::from_letters(&['l', 'e', 'h', 'o']).unwrap();
        assert_eq!(rack.missing(&['h', 'e', 'l', 'l', 'o']), Some('l'));
        assert_eq!(rack.missing(&['h', 'o', 'l', 'e']), None);
    }

    #[test]
    fn test_rack_rejects_invalid_letters() {
        assert_eq!(
            Rack::from_letters(&['a', 'B']),
            Err(RackError::InvalidLetter { letter: 'B' })
        );
    }

    #[test]
    fn test_refill_stops_at_capacity_or_empty_reserve() {
        let mut reserve = Reserve::standard_with_rng(rng());
        let mut rack = Rack::new();
        assert_eq!(rack.refill(&mut reserve, 7), Ok(7));
        assert_eq!(rack.len(), 7);
        assert_eq!(reserve.len(), 93);

        let mut small = Reserve::from_letters(&['a', 'b'], rng());
        let mut rack = Rack::from_letters(&['x']).unwrap();
        assert_eq!(rack.refill(&mut small, 7), Ok(2));
        assert_eq!(rack.len(), 3);
        assert!(small.is_empty());
    }

    #[test]
    fn test_letter_conservation_across_refill() {
        let mut reserve = Reserve::standard_with_rng(rng());
        let mut racks = vec![Rack::new(), Rack::new()];
        for rack in &mut racks {
            rack.refill(&mut reserve, 7).unwrap();
        }
        let held: usize = racks.iter().map(Rack::len).sum();
        assert_eq!(held + reserve.len(), 100);
    }

    /// Reserve that hands out whatever it was given, tile or not.
    struct LooseReserve(Vec<char>);

    impl LetterReserve for LooseReserve {
        fn draw_letter(&mut self) -> Option<char> {
            self.0.pop()
        }

        fn put_back_letter(&mut self, letter: char) -> Result<(), ReserveError> {
            self.0.push(letter);
            Ok(())
        }

        fn len(&self) -> usize {
            self.0.len()
        }
    }

    #[test]
    fn test_refill_returns_unusable_letter_to_reserve() {
        let mut reserve = LooseReserve(vec!['b', '7', 'a']);
        let mut rack = Rack::new();

        assert_eq!(
            rack.refill(&mut reserve, 7),
            Err(RackError::InvalidLetter { letter: '7' })
        );
        assert_eq!(rack.letters(), vec!['a']);
        assert_eq!(reserve.0, vec!['b', '7']);
        assert_eq!(rack.len() + reserve.len(), 3);
    }

    #[test]
    fn test_reserve_from_letters_skips_non_tiles() {
        let reserve = Reserve::from_letters(&['a', 'A', '3', '*', 'a'], rng());
        assert_eq!(reserve.len(), 3);
        assert_eq!(reserve.counts().collect::<Vec<_>>(), vec![('*', 1), ('a', 2)]);
    }

    #[test]
    fn test_rack_value_and_display() {
        let rack = Rack::from_letters(&['q', 'a', '*']).unwrap();
        assert_eq!(rack.value(), 11);
        assert_eq!(rack.to_string(), "*aq");
    }
}
