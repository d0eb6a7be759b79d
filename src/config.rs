//! Game configuration loaded from `config.toml`
//!
//! The file lives in the per-user config directory. Every field has a
//! default, so a missing file or a partial one is fine.

use crate::game::board::STANDARD_SIZE;
use crate::game::validation::ScoringRules;
use crate::game::{RACK_OUT_BONUS, RACK_SIZE};
use crate::player::policy::{default_score_ranges, Difficulty, ScoreRange, VirtualPolicy};
use crate::player::TurnRules;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const CONFIG_FILE: &str = "config.toml";

/// Rows are addressed `a..=z`, so boards stop at 26.
pub const MAX_BOARD_SIZE: usize = 26;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the config directory")]
    NoConfigDirectory,
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Virtual player settings (the `[virtual_player]` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualPlayerConfig {
    pub difficulty: Difficulty,
    pub exchange_chance: f64,
    pub skip_chance: f64,
    /// Runner-up plays logged next to the chosen one.
    pub alternatives: usize,
    pub max_generation_steps: Option<usize>,
    pub score_ranges: Vec<ScoreRange>,
}

impl Default for VirtualPlayerConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Easy,
            exchange_chance: 0.1,
            skip_chance: 0.1,
            alternatives: 3,
            max_generation_steps: None,
            score_ranges: default_score_ranges(),
        }
    }
}

impl VirtualPlayerConfig {
    /// The policy these settings describe. Experts ignore the exchange
    /// and skip chances.
    pub fn policy(&self) -> VirtualPolicy {
        let (exchange_chance, skip_chance) = match self.difficulty {
            Difficulty::Expert => (0.0, 0.0),
            Difficulty::Easy => (self.exchange_chance, self.skip_chance),
        };
        VirtualPolicy {
            difficulty: self.difficulty,
            exchange_chance,
            skip_chance,
            score_ranges: self.score_ranges.clone(),
            alternatives: self.alternatives,
            max_generation_steps: self.max_generation_steps,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board_size: usize,
    pub rack_size: usize,
    pub rack_out_bonus: u32,
    /// Exchanges need at least this many letters left in the reserve.
    pub min_reserve_for_exchange: usize,
    /// The game ends after this many skipped turns in a row.
    pub max_consecutive_skips: u32,
    /// Scatter bonus squares at random (center stays put).
    pub random_bonus: bool,
    pub seed: Option<u64>,
    /// Word list replacing the embedded one.
    pub dictionary_path: Option<PathBuf>,
    /// Minimum time the virtual player waits before playing.
    pub min_think_seconds: u64,
    /// Fallback filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub virtual_player: VirtualPlayerConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: STANDARD_SIZE,
            rack_size: RACK_SIZE,
            rack_out_bonus: RACK_OUT_BONUS,
            min_reserve_for_exchange: RACK_SIZE,
            max_consecutive_skips: 6,
            random_bonus: false,
            seed: None,
            dictionary_path: None,
            min_think_seconds: 3,
            log_level: "info".to_string(),
            virtual_player: VirtualPlayerConfig::default(),
        }
    }
}

impl GameConfig {
    /// Path of the per-user config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("", "", "scrabbot").ok_or(ConfigError::NoConfigDirectory)?;
        Ok(dirs.config_dir().join(CONFIG_FILE))
    }

    /// Load the per-user config, or defaults when there is none.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_size < 3 || self.board_size % 2 == 0 || self.board_size > MAX_BOARD_SIZE {
            return Err(ConfigError::Invalid(format!(
                "board_size must be odd and between 3 and {}, got {}",
                MAX_BOARD_SIZE, self.board_size
            )));
        }
        if self.rack_size == 0 {
            return Err(ConfigError::Invalid("rack_size must be positive".to_string()));
        }

        let vp = &self.virtual_player;
        for (name, chance) in [
            ("exchange_chance", vp.exchange_chance),
            ("skip_chance", vp.skip_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within [0, 1], got {}",
                    name, chance
                )));
            }
        }
        if vp.exchange_chance + vp.skip_chance > 1.0 {
            return Err(ConfigError::Invalid(
                "exchange_chance and skip_chance add up to more than 1".to_string(),
            ));
        }

        let mut total = 0.0;
        for range in &vp.score_ranges {
            if !(0.0..=1.0).contains(&range.chance) {
                return Err(ConfigError::Invalid(format!(
                    "score range chance must be within [0, 1], got {}",
                    range.chance
                )));
            }
            if range.min > range.max {
                return Err(ConfigError::Invalid(format!(
                    "score range {}..{} is inverted",
                    range.min, range.max
                )));
            }
            total += range.chance;
        }
        // Allow for float rounding in tables like 0.6 + 0.3 + 0.1.
        if total > 1.0 + 1e-9 {
            return Err(ConfigError::Invalid(
                "score range chances add up to more than 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn scoring_rules(&self) -> ScoringRules {
        ScoringRules {
            rack_size: self.rack_size,
            rack_out_bonus: self.rack_out_bonus,
        }
    }

    pub fn turn_rules(&self) -> TurnRules {
        TurnRules {
            rack_size: self.rack_size,
            min_reserve_for_exchange: self.min_reserve_for_exchange,
        }
    }
}
