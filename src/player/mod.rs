//! Players and their turns
//!
//! Human and virtual players share the same state: a rack, a score and a
//! skip counter. Humans act through explicit commands; virtual players run
//! the action chain in [`actions`].

pub mod actions;
pub mod policy;

use crate::game::board::{Board, BoardError, Placement};
use crate::game::generator::Play;
use crate::game::rack::{LetterReserve, Rack, RackError, ReserveError};
use crate::game::validation::{ValidationFailure, ValidationResult, Validator};
use actions::{run_turn, TurnContext, TurnReport};
use policy::VirtualPolicy;
use rand::rngs::StdRng;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum TurnError {
    #[error("{}", .0.message())]
    Rejected(ValidationFailure),
    #[error("not enough letters in the reserve to exchange ({available} left, {required} needed)")]
    ExchangeUnavailable { available: usize, required: usize },
    #[error("only virtual players run an automatic turn")]
    NotVirtual,
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Rack(#[from] RackError),
    #[error(transparent)]
    Reserve(#[from] ReserveError),
}

/// Rack and reserve limits applied to every turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnRules {
    pub rack_size: usize,
    pub min_reserve_for_exchange: usize,
}

impl Default for TurnRules {
    fn default() -> Self {
        Self {
            rack_size: crate::game::RACK_SIZE,
            min_reserve_for_exchange: crate::game::RACK_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerKind {
    Human,
    Virtual(VirtualPolicy),
}

#[derive(Debug, Clone)]
pub struct Player {
    pub name: String,
    pub kind: PlayerKind,
    pub rack: Rack,
    pub score: u32,
    /// Turns skipped in a row; reset by any placement or exchange.
    pub skipped_turns: u32,
}

impl Player {
    pub fn new(name: impl Into<String>, kind: PlayerKind) -> Self {
        Self {
            name: name.into(),
            kind,
            rack: Rack::new(),
            score: 0,
            skipped_turns: 0,
        }
    }

    pub fn human(name: impl Into<String>) -> Self {
        Self::new(name, PlayerKind::Human)
    }

    pub fn virtual_player(name: impl Into<String>, policy: VirtualPolicy) -> Self {
        Self::new(name, PlayerKind::Virtual(policy))
    }

    /// Draw until the rack is full or the reserve is empty.
    pub fn fill_rack(&mut self, reserve: &mut dyn LetterReserve, rack_size: usize) -> Result<usize, TurnError> {
        Ok(self.rack.refill(reserve, rack_size)?)
    }

    /// Apply a submitted move: rack check, validation, then commit.
    ///
    /// Placements may repeat letters already on the board; those are dropped.
    /// Nothing is mutated unless the whole move is legal.
    pub fn place_letters(
        &mut self,
        board: &mut Board,
        validator: &Validator<'_>,
        reserve: &mut dyn LetterReserve,
        placements: &[Placement],
        rules: TurnRules,
    ) -> Result<Play, TurnError> {
        let fresh = Validator::retrieve_new_letters(board, placements).map_err(TurnError::Rejected)?;
        if fresh.is_empty() {
            return Err(TurnError::Rejected(ValidationFailure::NoPlacement));
        }
        Validator::check_rack(&self.rack, &fresh).map_err(TurnError::Rejected)?;

        let (score, words) = match validator.validate(board, &fresh) {
            ValidationResult::Success { score, words } => (score, words),
            ValidationResult::Failure(failure) => {
                debug!(player = %self.name, reason = %failure.message(), "move rejected");
                return Err(TurnError::Rejected(failure));
            }
        };

        board.merge(&fresh)?;
        let used: Vec<char> = fresh.iter().map(Placement::rack_letter).collect();
        self.rack.remove_all(&used)?;
        self.rack.refill(reserve, rules.rack_size)?;
        self.score += score;
        self.skipped_turns = 0;

        let play = Play {
            placements: fresh,
            score,
            words,
        };
        info!(player = %self.name, word = %play.word(), score, "letters placed");
        Ok(play)
    }

    /// Swap `letters` for fresh ones from the reserve.
    pub fn exchange_letters(
        &mut self,
        reserve: &mut dyn LetterReserve,
        letters: &[char],
        rules: TurnRules,
    ) -> Result<(), TurnError> {
        let required = rules.min_reserve_for_exchange.max(letters.len()).max(1);
        if reserve.len() < required {
            return Err(TurnError::ExchangeUnavailable {
                available: reserve.len(),
                required,
            });
        }
        exchange(&mut self.rack, reserve, letters)?;
        self.skipped_turns = 0;
        info!(player = %self.name, count = letters.len(), "letters exchanged");
        Ok(())
    }

    pub fn skip_turn(&mut self) {
        self.skipped_turns += 1;
        info!(player = %self.name, skipped = self.skipped_turns, "turn skipped");
    }

    /// Run a virtual player's turn through the action chain.
    pub fn play_virtual_turn(
        &mut self,
        board: &mut Board,
        validator: Validator<'_>,
        reserve: &mut dyn LetterReserve,
        rng: &mut StdRng,
        rules: TurnRules,
    ) -> Result<TurnReport, TurnError> {
        let PlayerKind::Virtual(policy) = &self.kind else {
            return Err(TurnError::NotVirtual);
        };

        let mut context = TurnContext::new(board, validator, reserve, &mut self.rack, policy, rng, rules);
        let report = run_turn(&mut context)?;

        match &report.outcome {
            actions::TurnOutcome::Placed(play) => {
                self.score += play.score;
                self.skipped_turns = 0;
            }
            actions::TurnOutcome::Exchanged { .. } => self.skipped_turns = 0,
            actions::TurnOutcome::Skipped => self.skipped_turns += 1,
        }
        Ok(report)
    }
}

/// Remove `letters` from the rack, draw as many replacements, then return
/// the removed letters to the reserve.
pub(crate) fn exchange(
    rack: &mut Rack,
    reserve: &mut dyn LetterReserve,
    letters: &[char],
) -> Result<(), TurnError> {
    rack.remove_all(letters)?;
    for _ in letters {
        if let Some(letter) = reserve.draw_letter() {
            if let Err(e) = rack.add(letter) {
                reserve.put_back_letter(letter)?;
                return Err(e.into());
            }
        }
    }
    for &letter in letters {
        reserve.put_back_letter(letter)?;
    }
    Ok(())
}

/// Final scoring once the game is over.
///
/// Every player loses the value of the letters left in their rack. A player
/// with an empty rack gains the sum of everyone else's leftovers.
pub fn end_game_adjustment(players: &mut [Player]) {
    let leftovers: Vec<u32> = players.iter().map(|p| p.rack.value()).collect();
    let total: u32 = leftovers.iter().sum();

    for (player, &leftover) in players.iter_mut().zip(&leftovers) {
        player.score = player.score.saturating_sub(leftover);
        if player.rack.is_empty() {
            player.score += total - leftover;
        }
    }
}
