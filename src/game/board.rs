//! Board model: squares, bonuses and strictly additive letter placement
//!
//! The grid is append-only. Once a square holds a letter it is never
//! overwritten, and `filled_positions` records placement order.

use super::WILDCARD;
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Side length of the standard board.
pub const STANDARD_SIZE: usize = 15;

/// Standard 15x15 bonus layout.
/// `3` triple word, `2` double word, `t` triple letter, `d` double letter,
/// `*` center, `.` plain.
const STANDARD_LAYOUT_ROWS: [&str; STANDARD_SIZE] = [
    "3..d...3...d..3",
    ".2...t...t...2.",
    "..2...d.d...2..",
    "d..2...d...2..d",
    "....2.....2....",
    ".t...t...t...t.",
    "..d...d.d...d..",
    "3..d...*...d..3",
    "..d...d.d...d..",
    ".t...t...t...t.",
    "....2.....2....",
    "d..2...d...2..d",
    "..2...d.d...2..",
    ".2...t...t...2.",
    "3..d...3...d..3",
];

/// Parsed bonus squares of the standard layout.
static STANDARD_BONUSES: Lazy<Vec<(Position, Bonus)>> = Lazy::new(|| {
    let mut bonuses = Vec::new();
    for (y, row) in STANDARD_LAYOUT_ROWS.iter().enumerate() {
        for (x, c) in row.chars().enumerate() {
            let bonus = match c {
                '3' => Bonus::TripleWord,
                '2' => Bonus::DoubleWord,
                't' => Bonus::TripleLetter,
                'd' => Bonus::DoubleLetter,
                '*' => Bonus::Center,
                _ => continue,
            };
            bonuses.push((Position::new(x, y), bonus));
        }
    }
    bonuses
});

/// A square coordinate: `x` is the column, `y` the row, both 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// The adjacent position in `direction`, or None past the grid edge.
    pub fn step(self, direction: Direction, size: usize) -> Option<Position> {
        let (x, y) = match direction {
            Direction::Up => (Some(self.x), self.y.checked_sub(1)),
            Direction::Down => (Some(self.x), self.y.checked_add(1)),
            Direction::Left => (self.x.checked_sub(1), Some(self.y)),
            Direction::Right => (self.x.checked_add(1), Some(self.y)),
        };
        match (x, y) {
            (Some(x), Some(y)) if x < size && y < size => Some(Position::new(x, y)),
            _ => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn reverse(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// A line orientation on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub const BOTH: [Axis; 2] = [Axis::Horizontal, Axis::Vertical];

    /// Reading direction along this axis.
    pub fn forward(self) -> Direction {
        match self {
            Axis::Horizontal => Direction::Right,
            Axis::Vertical => Direction::Down,
        }
    }

    pub fn backward(self) -> Direction {
        self.forward().reverse()
    }

    pub fn perpendicular(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    /// Coordinate of `position` that varies along this axis.
    pub fn coordinate(self, position: Position) -> usize {
        match self {
            Axis::Horizontal => position.x,
            Axis::Vertical => position.y,
        }
    }

    /// Position on the same line as `line`, at `index` along this axis.
    pub fn at(self, line: Position, index: usize) -> Position {
        match self {
            Axis::Horizontal => Position::new(index, line.y),
            Axis::Vertical => Position::new(line.x, index),
        }
    }
}

/// Positional bonus fixed on a square when the board is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bonus {
    #[default]
    None,
    DoubleLetter,
    TripleLetter,
    DoubleWord,
    TripleWord,
    /// Center star, scored as a double word.
    Center,
}

impl Bonus {
    pub fn letter_multiplier(self) -> u32 {
        match self {
            Bonus::DoubleLetter => 2,
            Bonus::TripleLetter => 3,
            _ => 1,
        }
    }

    pub fn word_multiplier(self) -> u32 {
        match self {
            Bonus::DoubleWord | Bonus::Center => 2,
            Bonus::TripleWord => 3,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Square {
    pub letter: Option<char>,
    pub bonus: Bonus,
    pub position: Position,
}

impl Square {
    pub fn is_filled(&self) -> bool {
        self.letter.is_some()
    }
}

/// One letter assigned to one square.
///
/// Lowercase is a regular tile; uppercase is a wildcard resolved to that letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub letter: char,
    pub position: Position,
}

impl Placement {
    pub fn new(letter: char, position: Position) -> Self {
        Self { letter, position }
    }

    pub fn is_wildcard(&self) -> bool {
        self.letter.is_ascii_uppercase()
    }

    /// The rack tile this placement consumes.
    pub fn rack_letter(&self) -> char {
        if self.is_wildcard() {
            WILDCARD
        } else {
            self.letter
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("position {position} is outside the {size}x{size} board")]
    OutOfBounds { position: Position, size: usize },
    #[error("a letter is already set at {position}")]
    Collision { position: Position },
}

/// Serializable snapshot sent to clients: rows of squares plus placement order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardData {
    pub rows: Vec<Vec<Square>>,
    pub filled_positions: Vec<Position>,
}

/// Square grid with fixed bonuses and append-only letters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    /// Row-major: index `y * size + x`.
    squares: Vec<Square>,
    filled_positions: Vec<Position>,
}

impl Board {
    /// An empty board without any bonus squares.
    pub fn new(size: usize) -> Self {
        Self::with_bonuses(size, &[])
    }

    /// An empty board with the given bonus squares. Out-of-range entries are ignored.
    pub fn with_bonuses(size: usize, bonuses: &[(Position, Bonus)]) -> Self {
        let mut squares = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                squares.push(Square {
                    letter: None,
                    bonus: Bonus::None,
                    position: Position::new(x, y),
                });
            }
        }

        for &(position, bonus) in bonuses {
            if position.x < size && position.y < size {
                squares[position.y * size + position.x].bonus = bonus;
            }
        }

        Self {
            size,
            squares,
            filled_positions: Vec::new(),
        }
    }

    /// The standard 15x15 board.
    pub fn standard() -> Self {
        Self::with_bonuses(STANDARD_SIZE, &STANDARD_BONUSES)
    }

    /// A board whose bonus squares are the standard set scattered at random.
    /// The center keeps its star.
    pub fn with_random_bonuses<R: Rng>(size: usize, rng: &mut R) -> Self {
        let center = Position::new(size / 2, size / 2);
        let mut positions: Vec<Position> = (0..size)
            .flat_map(|y| (0..size).map(move |x| Position::new(x, y)))
            .filter(|&p| p != center)
            .collect();
        positions.shuffle(rng);

        let mut bonuses: Vec<(Position, Bonus)> = STANDARD_BONUSES
            .iter()
            .filter(|(_, bonus)| *bonus != Bonus::Center)
            .zip(positions)
            .map(|((_, bonus), position)| (position, *bonus))
            .collect();
        bonuses.push((center, Bonus::Center));

        Self::with_bonuses(size, &bonuses)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Geometric center, the only anchor of an empty board.
    pub fn center(&self) -> Position {
        Position::new(self.size / 2, self.size / 2)
    }

    pub fn is_empty(&self) -> bool {
        self.filled_positions.is_empty()
    }

    /// Filled positions in placement order.
    pub fn filled_positions(&self) -> &[Position] {
        &self.filled_positions
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x < self.size && position.y < self.size
    }

    pub fn get(&self, position: Position) -> Result<&Square, BoardError> {
        self.guard(position)?;
        Ok(&self.squares[self.index(position)])
    }

    /// Letter at `position`, or None when empty or off the board.
    pub fn letter_at(&self, position: Position) -> Option<char> {
        if self.contains(position) {
            self.squares[self.index(position)].letter
        } else {
            None
        }
    }

    pub fn is_filled(&self, position: Position) -> bool {
        self.letter_at(position).is_some()
    }

    /// The adjacent square, or None at the grid edge.
    pub fn neighbor(
        &self,
        position: Position,
        direction: Direction,
    ) -> Result<Option<&Square>, BoardError> {
        self.guard(position)?;
        Ok(position
            .step(direction, self.size)
            .map(|next| &self.squares[self.index(next)]))
    }

    /// Whether any orthogonal neighbor of `position` holds a letter.
    pub fn has_filled_neighbor(&self, position: Position) -> bool {
        Direction::ALL.iter().any(|&direction| {
            position
                .step(direction, self.size)
                .is_some_and(|next| self.is_filled(next))
        })
    }

    /// Apply placements. Either all of them land or the board is untouched.
    pub fn merge(&mut self, placements: &[Placement]) -> Result<(), BoardError> {
        let mut targeted = HashSet::with_capacity(placements.len());
        for placement in placements {
            let square = self.get(placement.position)?;
            if square.is_filled() || !targeted.insert(placement.position) {
                return Err(BoardError::Collision {
                    position: placement.position,
                });
            }
        }

        for placement in placements {
            let index = self.index(placement.position);
            self.squares[index].letter = Some(placement.letter);
            self.filled_positions.push(placement.position);
        }
        Ok(())
    }

    pub fn snapshot(&self) -> BoardData {
        BoardData {
            rows: self.squares.chunks(self.size).map(|row| row.to_vec()).collect(),
            filled_positions: self.filled_positions.clone(),
        }
    }

    fn index(&self, position: Position) -> usize {
        position.y * self.size + position.x
    }

    fn guard(&self, position: Position) -> Result<(), BoardError> {
        if self.contains(position) {
            Ok(())
        } else {
            Err(BoardError::OutOfBounds {
                position,
                size: self.size,
            })
        }
    }
}
