//! Typed command parsing
//!
//! `!place h8h word` places `word` starting at row `h`, column 8, going
//! horizontally (`h`) or vertically (`v`). Uppercase letters in the word are
//! wildcards. `!exchange abc` swaps rack letters (`*` for a wildcard).

use crate::game::board::{Axis, Placement, Position};
use crate::game::{fold_accents, is_tile_letter};
use thiserror::Error;

pub const HELP: &str = "!place <row><col><h|v> <word>  place a word (uppercase = wildcard)\n\
                        !exchange <letters>           swap rack letters (* = wildcard)\n\
                        !pass                         skip your turn\n\
                        !reserve                      show letters left in the reserve\n\
                        !debug                        toggle diagnostic messages\n\
                        !help                         show this help";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Place { start: Position, axis: Axis, word: String },
    Exchange { letters: Vec<char> },
    Pass,
    Reserve,
    Debug,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("commands start with '!' (try !help)")]
    NotACommand,
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("{command} needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("invalid position '{0}' (expected e.g. h8h)")]
    InvalidOptions(String),
    #[error("invalid word '{0}'")]
    InvalidWord(String),
    #[error("invalid letters '{0}'")]
    InvalidLetters(String),
    #[error("'{0}' does not fit on the board")]
    OffBoard(String),
}

impl Command {
    /// Parse one input line for a board of `board_size` and racks of `rack_size`.
    pub fn parse(input: &str, board_size: usize, rack_size: usize) -> Result<Self, CommandError> {
        let input = input.trim();
        if !input.starts_with('!') {
            return Err(CommandError::NotACommand);
        }

        let mut args = input.split_whitespace();
        let name = args.next().unwrap_or_default();
        match name {
            "!place" => {
                let options = args.next().ok_or(CommandError::MissingArgument {
                    command: "!place",
                    argument: "a position",
                })?;
                let word = args.next().ok_or(CommandError::MissingArgument {
                    command: "!place",
                    argument: "a word",
                })?;
                parse_place(options, word, board_size)
            }
            "!exchange" => {
                let letters = args.next().ok_or(CommandError::MissingArgument {
                    command: "!exchange",
                    argument: "letters",
                })?;
                parse_exchange(letters, rack_size)
            }
            "!pass" => Ok(Command::Pass),
            "!reserve" => Ok(Command::Reserve),
            "!debug" => Ok(Command::Debug),
            "!help" => Ok(Command::Help),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }

    /// Placements of a `Place` command, one per letter of the word.
    pub fn placements(&self) -> Vec<Placement> {
        match self {
            Command::Place { start, axis, word } => word
                .chars()
                .enumerate()
                .map(|(i, letter)| Placement::new(letter, axis.at(*start, axis.coordinate(*start) + i)))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Rows are letters from `a`, columns are numbers from 1.
fn parse_place(options: &str, word: &str, board_size: usize) -> Result<Command, CommandError> {
    let invalid = || CommandError::InvalidOptions(options.to_string());

    let mut chars = options.chars();
    let row = chars.next().ok_or_else(invalid)?;
    let direction = chars.next_back().ok_or_else(invalid)?;
    let column: String = chars.collect();

    if !row.is_ascii_lowercase() {
        return Err(invalid());
    }
    let y = (row as u8 - b'a') as usize;
    if column.is_empty() || column.starts_with('0') || !column.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let x = column.parse::<usize>().map_err(|_| invalid())? - 1;
    let axis = match direction {
        'h' => Axis::Horizontal,
        'v' => Axis::Vertical,
        _ => return Err(invalid()),
    };
    if x >= board_size || y >= board_size {
        return Err(invalid());
    }

    let word = fold_accents(word);
    if word.is_empty()
        || word.chars().count() > board_size
        || !word.chars().all(|c| c.is_ascii_alphabetic())
    {
        return Err(CommandError::InvalidWord(word));
    }

    let start = Position::new(x, y);
    if axis.coordinate(start) + word.len() > board_size {
        return Err(CommandError::OffBoard(word));
    }
    Ok(Command::Place { start, axis, word })
}

fn parse_exchange(letters: &str, rack_size: usize) -> Result<Command, CommandError> {
    let letters: Vec<char> = fold_accents(letters).chars().collect();
    if letters.is_empty() || letters.len() > rack_size || !letters.iter().all(|&c| is_tile_letter(c)) {
        return Err(CommandError::InvalidLetters(letters.into_iter().collect()));
    }
    Ok(Command::Exchange { letters })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Command, CommandError> {
        Command::parse(input, 15, 7)
    }

    #[test]
    fn test_parse_place_horizontal() {
        let command = parse("!place h8h cat").unwrap();
        assert_eq!(
            command,
            Command::Place {
                start: Position::new(7, 7),
                axis: Axis::Horizontal,
                word: "cat".to_string()
            }
        );
        assert_eq!(
            command.placements(),
            vec![
                Placement::new('c', Position::new(7, 7)),
                Placement::new('a', Position::new(8, 7)),
                Placement::new('t', Position::new(9, 7)),
            ]
        );
    }

    #[test]
    fn test_parse_place_vertical_with_wildcard() {
        let command = parse("!place a15v doG").unwrap();
        assert_eq!(
            command.placements(),
            vec![
                Placement::new('d', Position::new(14, 0)),
                Placement::new('o', Position::new(14, 1)),
                Placement::new('G', Position::new(14, 2)),
            ]
        );
    }

    #[test]
    fn test_parse_place_folds_accents() {
        let command = parse("!place h8h été").unwrap();
        assert!(matches!(command, Command::Place { ref word, .. } if word == "ete"));
    }

    #[test]
    fn test_parse_place_rejects_bad_options() {
        for options in ["p8h", "h0h", "h16h", "h8x", "H8h", "h08h", "8h", "h", "h+8h", "h-8h", "h 8h"] {
            let input = format!("!place {} cat", options);
            assert!(
                matches!(parse(&input), Err(CommandError::InvalidOptions(_))),
                "{} should be rejected",
                options
            );
        }
    }

    #[test]
    fn test_parse_place_rejects_bad_words() {
        assert!(matches!(parse("!place h8h c4t"), Err(CommandError::InvalidWord(_))));
        assert!(matches!(parse("!place h8h don't"), Err(CommandError::InvalidWord(_))));
        assert_eq!(
            parse("!place h13h cats"),
            Err(CommandError::OffBoard("cats".to_string()))
        );
        assert_eq!(
            parse("!place h8h"),
            Err(CommandError::MissingArgument {
                command: "!place",
                argument: "a word"
            })
        );
    }

    #[test]
    fn test_parse_exchange() {
        assert_eq!(
            parse("!exchange ab*").unwrap(),
            Command::Exchange {
                letters: vec!['a', 'b', '*']
            }
        );
        assert!(matches!(parse("!exchange AB"), Err(CommandError::InvalidLetters(_))));
        assert!(matches!(parse("!exchange abcdefgh"), Err(CommandError::InvalidLetters(_))));
        assert!(matches!(parse("!exchange"), Err(CommandError::MissingArgument { .. })));
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse("!pass"), Ok(Command::Pass));
        assert_eq!(parse("  !reserve "), Ok(Command::Reserve));
        assert_eq!(parse("!help"), Ok(Command::Help));
        assert_eq!(parse("!debug"), Ok(Command::Debug));
    }

    #[test]
    fn test_parse_rejects_non_commands() {
        assert_eq!(parse("hello"), Err(CommandError::NotACommand));
        assert_eq!(parse("!dance"), Err(CommandError::Unknown("!dance".to_string())));
    }
}
