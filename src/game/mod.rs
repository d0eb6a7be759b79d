//! Game engine: board, dictionary, racks, validation, play generation

pub mod board;
pub mod dictionary;
pub mod generator;
pub mod rack;
pub mod validation;

/// Rack marker for a wildcard (blank) tile.
pub const WILDCARD: char = '*';

/// Default number of tiles held by a rack.
pub const RACK_SIZE: usize = 7;

/// Extra points for placing a full rack in one turn.
pub const RACK_OUT_BONUS: u32 = 50;

/// English tile values, indexed by `letter - 'a'`.
const LETTER_VALUES: [u32; 26] = [
    1,  // a
    3,  // b
    3,  // c
    2,  // d
    1,  // e
    4,  // f
    2,  // g
    4,  // h
    1,  // i
    8,  // j
    5,  // k
    1,  // l
    3,  // m
    1,  // n
    1,  // o
    3,  // p
    10, // q
    1,  // r
    1,  // s
    1,  // t
    1,  // u
    4,  // v
    4,  // w
    8,  // x
    4,  // y
    10, // z
];

/// Standard English bag: (letter, count). 100 tiles including two wildcards.
pub const TILE_DISTRIBUTION: [(char, u8); 27] = [
    ('a', 9),
    ('b', 2),
    ('c', 2),
    ('d', 4),
    ('e', 12),
    ('f', 2),
    ('g', 3),
    ('h', 2),
    ('i', 9),
    ('j', 1),
    ('k', 1),
    ('l', 4),
    ('m', 2),
    ('n', 6),
    ('o', 8),
    ('p', 2),
    ('q', 1),
    ('r', 6),
    ('s', 4),
    ('t', 6),
    ('u', 4),
    ('v', 2),
    ('w', 2),
    ('x', 1),
    ('y', 2),
    ('z', 1),
    (WILDCARD, 2),
];

/// Base value of a tile as written on the board or in a rack.
///
/// Uppercase letters are wildcards resolved to a letter and score nothing,
/// as does the bare wildcard marker.
pub fn letter_value(letter: char) -> u32 {
    if letter.is_ascii_lowercase() {
        LETTER_VALUES[(letter as u8 - b'a') as usize]
    } else {
        0
    }
}

/// Fold accented Latin letters to their base letter, keeping case.
pub fn fold_accent(c: char) -> char {
    match c {
        'à' | 'â' | 'ä' | 'á' | 'ã' | 'å' => 'a',
        'ç' => 'c',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'î' | 'ï' | 'ì' | 'í' => 'i',
        'ñ' => 'n',
        'ô' | 'ò' | 'õ' | 'ö' | 'ó' => 'o',
        'û' | 'ü' | 'ù' | 'ú' => 'u',
        'ý' | 'ÿ' => 'y',
        'À' | 'Â' | 'Ä' | 'Á' | 'Ã' | 'Å' => 'A',
        'Ç' => 'C',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'Î' | 'Ï' | 'Ì' | 'Í' => 'I',
        'Ñ' => 'N',
        'Ô' | 'Ò' | 'Õ' | 'Ö' | 'Ó' => 'O',
        'Û' | 'Ü' | 'Ù' | 'Ú' => 'U',
        'Ý' | 'Ÿ' => 'Y',
        other => other,
    }
}

/// Remove accents from every character of a word.
pub fn fold_accents(word: &str) -> String {
    word.chars().map(fold_accent).collect()
}

/// Whether a character can sit in a rack or the reserve.
pub fn is_tile_letter(c: char) -> bool {
    c.is_ascii_lowercase() || c == WILDCARD
}
