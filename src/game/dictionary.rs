//! Dictionary backed by a prefix trie and a reversed (suffix) trie
//!
//! Embeds a default English word list at build time. Lookups are
//! case-insensitive and accent-insensitive, and cost O(word length).
//! A dictionary is built once and only read afterwards, so a single
//! instance can be shared by every game.

use super::fold_accent;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Embedded wordlist: lowercase, alphabetic only, one per line.
static WORDS_DATA: &str = include_str!("../../data/words.txt");

/// Dictionary built from the embedded wordlist on first use.
static EMBEDDED: Lazy<Dictionary> = Lazy::new(|| Dictionary::from_words(WORDS_DATA.lines()));

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("failed to read word list {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("word list {} contains no usable words", .path.display())]
    Empty { path: PathBuf },
}

/// Answer to a prefix query, computed in a single walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrefixLookup {
    /// The queried string is itself a word.
    pub is_word: bool,
    /// Some longer word starts with the queried string.
    pub has_extensions: bool,
}

#[derive(Debug, Default)]
struct TrieNode {
    is_word: bool,
    children: HashMap<char, TrieNode>,
}

#[derive(Debug, Default)]
struct Trie {
    root: TrieNode,
}

impl Trie {
    /// Insert a sequence of letters. Returns false if it was already present.
    fn insert(&mut self, letters: impl Iterator<Item = char>) -> bool {
        let mut node = &mut self.root;
        for c in letters {
            node = node.children.entry(c).or_default();
        }
        let added = !node.is_word;
        node.is_word = true;
        added
    }

    fn node(&self, letters: impl Iterator<Item = char>) -> Option<&TrieNode> {
        let mut node = &self.root;
        for c in letters {
            node = node.children.get(&c)?;
        }
        Some(node)
    }
}

/// Word-membership index with prefix and suffix existence queries.
#[derive(Debug, Default)]
pub struct Dictionary {
    forward: Trie,
    reversed: Trie,
    len: usize,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// The dictionary built from the embedded word list.
    pub fn embedded() -> &'static Dictionary {
        &EMBEDDED
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dictionary = Self::new();
        for word in words {
            dictionary.insert(word.as_ref());
        }
        dictionary
    }

    /// Load a word list file: one word per line, blank lines ignored.
    pub fn from_file(path: &Path) -> Result<Self, DictionaryError> {
        let data = fs::read_to_string(path).map_err(|source| DictionaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dictionary = Self::from_words(data.lines());
        if dictionary.is_empty() {
            return Err(DictionaryError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(dictionary)
    }

    /// Insert a word. Inserting an existing word is a no-op.
    ///
    /// Words are normalized to lowercase without accents. Anything that is
    /// not purely alphabetic after normalization is skipped. Returns whether
    /// the word was added.
    pub fn insert(&mut self, word: &str) -> bool {
        let normalized: Vec<char> = normalize(word.trim()).collect();
        if normalized.is_empty() || !normalized.iter().all(|c| c.is_ascii_lowercase()) {
            return false;
        }

        let added = self.forward.insert(normalized.iter().copied());
        if added {
            self.reversed.insert(normalized.iter().rev().copied());
            self.len += 1;
        }
        added
    }

    pub fn contains(&self, word: &str) -> bool {
        self.forward
            .node(normalize(word))
            .is_some_and(|node| node.is_word)
    }

    /// Whether `word` is a word, and whether any longer word starts with it.
    pub fn has_prefix(&self, word: &str) -> PrefixLookup {
        match self.forward.node(normalize(word)) {
            Some(node) => PrefixLookup {
                is_word: node.is_word,
                has_extensions: !node.children.is_empty(),
            },
            None => PrefixLookup::default(),
        }
    }

    /// Whether some longer word ends with `word`.
    pub fn has_suffix(&self, word: &str) -> bool {
        let letters: Vec<char> = normalize(word).collect();
        self.reversed
            .node(letters.into_iter().rev())
            .is_some_and(|node| !node.children.is_empty())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

fn normalize(word: &str) -> impl Iterator<Item = char> + '_ {
    word.chars().flat_map(|c| fold_accent(c).to_lowercase())
}
