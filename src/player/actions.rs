//! Virtual player turn as a chain of actions
//!
//! A turn starts at `Decide` and follows whatever each action returns until
//! one returns `None`. The fallbacks only ever move toward `Skip`:
//!
//! ```text
//! Decide -> Place    -> (nothing fits) Exchange -> (reserve too small) Skip
//!        -> Exchange -> Skip
//!        -> Skip
//! ```
//!
//! `execute` takes the action by value, so each one runs at most once.

use super::exchange;
use super::policy::{Difficulty, Intent, VirtualPolicy};
use super::{TurnError, TurnRules};
use crate::game::board::{Board, Placement};
use crate::game::generator::{AnchorOrder, Play, PlayGenerator};
use crate::game::rack::{LetterReserve, Rack};
use crate::game::validation::{ValidationResult, Validator};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

/// How many letters an exchange swaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeSize {
    /// As many as both the rack and the reserve allow. Expert fallback.
    All,
    /// A random count between one and the rack size. Voluntary exchanges
    /// and the easy fallback.
    Random,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Decide,
    /// Candidate plays, best first.
    Place(Vec<Play>),
    Exchange(ExchangeSize),
    Skip,
}

/// Payload-free view of an action, for recording the path a turn took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Decide,
    Place,
    Exchange,
    Skip,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Placed(Play),
    Exchanged { count: usize },
    Skipped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    pub outcome: TurnOutcome,
    /// Actions in the order they ran.
    pub visited: Vec<ActionKind>,
}

/// Everything a turn may read or change.
pub struct TurnContext<'a, 'd> {
    board: &'a mut Board,
    validator: Validator<'d>,
    reserve: &'a mut dyn LetterReserve,
    rack: &'a mut Rack,
    policy: &'a VirtualPolicy,
    rng: &'a mut StdRng,
    rules: TurnRules,
    outcome: Option<TurnOutcome>,
}

impl<'a, 'd> TurnContext<'a, 'd> {
    pub fn new(
        board: &'a mut Board,
        validator: Validator<'d>,
        reserve: &'a mut dyn LetterReserve,
        rack: &'a mut Rack,
        policy: &'a VirtualPolicy,
        rng: &'a mut StdRng,
        rules: TurnRules,
    ) -> Self {
        Self {
            board,
            validator,
            reserve,
            rack,
            policy,
            rng,
            rules,
            outcome: None,
        }
    }

    fn generate_plays(&mut self) -> Vec<Play> {
        let order = AnchorOrder::Random(StdRng::from_rng(&mut *self.rng));
        let mut generator = PlayGenerator::new(self.validator, self.board, self.rack, order);

        match self.policy.max_generation_steps {
            Some(limit) => {
                for _ in 0..limit {
                    if !generator.generate_next() {
                        break;
                    }
                }
            }
            None => generator.generate_all(),
        }

        debug!(
            plays = generator.plays_generated(),
            skipped_anchors = generator.remaining_anchors(),
            "plays generated"
        );
        generator.into_ordered_plays()
    }
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Decide => ActionKind::Decide,
            Action::Place(_) => ActionKind::Place,
            Action::Exchange(_) => ActionKind::Exchange,
            Action::Skip => ActionKind::Skip,
        }
    }

    /// Run this step. Returns the follow-up action, or None when the turn is over.
    pub fn execute(self, ctx: &mut TurnContext<'_, '_>) -> Result<Option<Action>, TurnError> {
        match self {
            Action::Decide => Ok(Some(decide(ctx))),
            Action::Place(plays) => place(ctx, plays),
            Action::Exchange(size) => exchange_letters(ctx, size),
            Action::Skip => {
                ctx.outcome = Some(TurnOutcome::Skipped);
                Ok(None)
            }
        }
    }
}

/// Drive a whole turn from `Decide` to completion.
pub fn run_turn(ctx: &mut TurnContext<'_, '_>) -> Result<TurnReport, TurnError> {
    let mut visited = Vec::new();
    let mut next = Some(Action::Decide);

    while let Some(action) = next {
        let kind = action.kind();
        debug!(action = ?kind, "running action");
        visited.push(kind);
        next = action.execute(ctx)?;
    }

    let outcome = ctx.outcome.take().unwrap_or(TurnOutcome::Skipped);
    Ok(TurnReport { outcome, visited })
}

fn decide(ctx: &mut TurnContext<'_, '_>) -> Action {
    match ctx.policy.decide(&mut *ctx.rng, ctx.reserve.len()) {
        Intent::Exchange => Action::Exchange(ExchangeSize::Random),
        Intent::Skip => Action::Skip,
        Intent::Play => Action::Place(ctx.generate_plays()),
    }
}

/// Exchange size used when a placement falls through.
fn fallback_exchange(policy: &VirtualPolicy) -> Action {
    match policy.difficulty {
        Difficulty::Expert => Action::Exchange(ExchangeSize::All),
        Difficulty::Easy => Action::Exchange(ExchangeSize::Random),
    }
}

fn place(ctx: &mut TurnContext<'_, '_>, plays: Vec<Play>) -> Result<Option<Action>, TurnError> {
    let Some(chosen) = ctx.policy.select_play(&plays, &mut *ctx.rng).cloned() else {
        debug!(candidates = plays.len(), "no play selected");
        return Ok(Some(fallback_exchange(ctx.policy)));
    };

    let alternatives: Vec<String> = plays
        .iter()
        .filter(|play| play.placements != chosen.placements)
        .take(ctx.policy.alternatives)
        .map(|play| format!("{} ({})", play.word(), play.score))
        .collect();
    if !alternatives.is_empty() {
        debug!(alternatives = %alternatives.join(", "), "alternative words");
    }

    // Plays come from a search over this same board, but the rack and board
    // are checked again before anything is committed.
    if let Err(failure) = Validator::check_rack(ctx.rack, &chosen.placements) {
        warn!(reason = %failure.message(), "chosen play no longer fits the rack");
        return Ok(Some(fallback_exchange(ctx.policy)));
    }
    let (score, words) = match ctx.validator.validate(ctx.board, &chosen.placements) {
        ValidationResult::Success { score, words } => (score, words),
        ValidationResult::Failure(failure) => {
            warn!(reason = %failure.message(), "chosen play failed validation");
            return Ok(Some(fallback_exchange(ctx.policy)));
        }
    };

    ctx.board.merge(&chosen.placements)?;
    let used: Vec<char> = chosen.placements.iter().map(Placement::rack_letter).collect();
    ctx.rack.remove_all(&used)?;
    ctx.rack.refill(ctx.reserve, ctx.rules.rack_size)?;

    let play = Play {
        placements: chosen.placements,
        score,
        words,
    };
    info!(word = %play.word(), score, "virtual player placed letters");
    ctx.outcome = Some(TurnOutcome::Placed(play));
    Ok(None)
}

fn exchange_letters(
    ctx: &mut TurnContext<'_, '_>,
    size: ExchangeSize,
) -> Result<Option<Action>, TurnError> {
    let available = ctx.reserve.len();
    let rack_len = ctx.rack.len();
    if available == 0 || available < ctx.rules.min_reserve_for_exchange || rack_len == 0 {
        debug!(available, "reserve too small to exchange");
        return Ok(Some(Action::Skip));
    }

    let count = match size {
        ExchangeSize::All => rack_len.min(available),
        ExchangeSize::Random => available.min(ctx.rng.random_range(1..=rack_len)),
    };
    let mut letters = ctx.rack.letters();
    letters.shuffle(&mut *ctx.rng);
    letters.truncate(count);

    exchange(ctx.rack, ctx.reserve, &letters)?;
    info!(count, "virtual player exchanged letters");
    ctx.outcome = Some(TurnOutcome::Exchanged { count });
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::Position;
    use crate::game::dictionary::Dictionary;
    use crate::game::rack::Reserve;
    use crate::game::validation::ScoringRules;
    use crate::player::policy::ScoreRange;

    struct Table {
        board: Board,
        reserve: Reserve,
        rack: Rack,
        rng: StdRng,
        rules: TurnRules,
    }

    impl Table {
        fn new(rack: &[char], reserve: &[char]) -> Self {
            Self {
                board: Board::new(15),
                reserve: Reserve::from_letters(reserve, StdRng::seed_from_u64(8)),
                rack: Rack::from_letters(rack).unwrap(),
                rng: StdRng::seed_from_u64(21),
                rules: TurnRules {
                    rack_size: 7,
                    min_reserve_for_exchange: 7,
                },
            }
        }

        fn context<'a, 'd>(
            &'a mut self,
            dictionary: &'d Dictionary,
            policy: &'a VirtualPolicy,
        ) -> TurnContext<'a, 'd> {
            TurnContext::new(
                &mut self.board,
                Validator::new(dictionary, ScoringRules::default()),
                &mut self.reserve,
                &mut self.rack,
                policy,
                &mut self.rng,
                self.rules,
            )
        }

        fn run(&mut self, dictionary: &Dictionary, policy: &VirtualPolicy) -> TurnReport {
            let mut ctx = self.context(dictionary, policy);
            run_turn(&mut ctx).unwrap()
        }

        fn letter_total(&self) -> usize {
            self.board.filled_positions().len() + self.rack.len() + self.reserve.len()
        }
    }

    fn dictionary() -> Dictionary {
        Dictionary::from_words(["cat", "act", "at", "a"])
    }

    fn play(score: u32) -> Play {
        Play {
            placements: vec![Placement::new('a', Position::new(7, 7))],
            score,
            words: Vec::new(),
        }
    }

    #[test]
    fn test_exchange_with_empty_reserve_returns_skip() {
        let dictionary = dictionary();
        let policy = VirtualPolicy::expert();
        let mut table = Table::new(&['a', 'b'], &[]);
        let mut ctx = table.context(&dictionary, &policy);

        for size in [ExchangeSize::All, ExchangeSize::Random] {
            let next = Action::Exchange(size).execute(&mut ctx).unwrap();
            assert_eq!(next, Some(Action::Skip));
        }
    }

    #[test]
    fn test_place_without_candidates_falls_back_to_exchange() {
        let dictionary = dictionary();
        let policy = VirtualPolicy::expert();
        let mut table = Table::new(&['a'], &[]);
        let mut ctx = table.context(&dictionary, &policy);

        let next = Action::Place(Vec::new()).execute(&mut ctx).unwrap();
        assert_eq!(next, Some(Action::Exchange(ExchangeSize::All)));
    }

    #[test]
    fn test_easy_place_outside_range_falls_back_to_exchange() {
        let dictionary = dictionary();
        let policy = VirtualPolicy {
            score_ranges: vec![ScoreRange::new(1.0, 500, 600)],
            ..VirtualPolicy::easy()
        };
        let mut table = Table::new(&['a'], &[]);
        let mut ctx = table.context(&dictionary, &policy);

        let next = Action::Place(vec![play(90), play(60), play(10)])
            .execute(&mut ctx)
            .unwrap();
        assert_eq!(next, Some(Action::Exchange(ExchangeSize::Random)));
    }

    #[test]
    fn test_easy_place_without_candidates_exchanges_random_count() {
        let dictionary = dictionary();
        let policy = VirtualPolicy::easy();
        let mut table = Table::new(&['a'], &[]);
        let mut ctx = table.context(&dictionary, &policy);

        let next = Action::Place(Vec::new()).execute(&mut ctx).unwrap();
        assert_eq!(next, Some(Action::Exchange(ExchangeSize::Random)));
    }

    #[test]
    fn test_expert_turn_places_best_play() {
        let dictionary = dictionary();
        let policy = VirtualPolicy::expert();
        let mut table = Table::new(&['c', 'a', 't'], &['e'; 10]);
        let before = table.letter_total();

        let report = table.run(&dictionary, &policy);

        assert_eq!(report.visited, vec![ActionKind::Decide, ActionKind::Place]);
        match report.outcome {
            TurnOutcome::Placed(play) => {
                assert_eq!(play.score, 5);
                assert_eq!(play.placements.len(), 3);
            }
            other => panic!("expected a placement, got {:?}", other),
        }
        assert_eq!(table.board.filled_positions().len(), 3);
        assert!(table.board.is_filled(Position::new(7, 7)));
        assert_eq!(table.rack.len(), 7);
        assert_eq!(table.letter_total(), before);
    }

    #[test]
    fn test_skip_policy() {
        let dictionary = dictionary();
        let policy = VirtualPolicy {
            exchange_chance: 0.0,
            skip_chance: 1.0,
            ..VirtualPolicy::easy()
        };
        let mut table = Table::new(&['c', 'a', 't'], &['e'; 10]);

        let report = table.run(&dictionary, &policy);
        assert_eq!(report.visited, vec![ActionKind::Decide, ActionKind::Skip]);
        assert_eq!(report.outcome, TurnOutcome::Skipped);
        assert!(table.board.is_empty());
    }

    #[test]
    fn test_exchange_policy_conserves_letters() {
        let dictionary = dictionary();
        let policy = VirtualPolicy {
            exchange_chance: 1.0,
            skip_chance: 0.0,
            ..VirtualPolicy::easy()
        };
        let mut table = Table::new(&['c', 'a', 't', 'q'], &['e'; 10]);
        let before = table.letter_total();

        let report = table.run(&dictionary, &policy);
        assert_eq!(report.visited, vec![ActionKind::Decide, ActionKind::Exchange]);
        match report.outcome {
            TurnOutcome::Exchanged { count } => assert!((1..=4).contains(&count)),
            other => panic!("expected an exchange, got {:?}", other),
        }
        assert_eq!(table.rack.len(), 4);
        assert_eq!(table.letter_total(), before);
    }

    #[test]
    fn test_exchange_below_minimum_reserve_skips() {
        let dictionary = dictionary();
        let policy = VirtualPolicy {
            exchange_chance: 1.0,
            skip_chance: 0.0,
            ..VirtualPolicy::easy()
        };
        let mut table = Table::new(&['c', 'a', 't'], &['e'; 3]);

        let report = table.run(&dictionary, &policy);
        assert_eq!(
            report.visited,
            vec![ActionKind::Decide, ActionKind::Exchange, ActionKind::Skip]
        );
        assert_eq!(report.outcome, TurnOutcome::Skipped);
        assert_eq!(table.rack.letters(), vec!['a', 'c', 't']);
    }

    #[test]
    fn test_full_fallback_chain_ends_in_skip() {
        let dictionary = dictionary();
        let policy = VirtualPolicy::expert();
        let mut table = Table::new(&['q', 'z'], &[]);

        let report = table.run(&dictionary, &policy);
        assert_eq!(
            report.visited,
            vec![
                ActionKind::Decide,
                ActionKind::Place,
                ActionKind::Exchange,
                ActionKind::Skip
            ]
        );
        assert_eq!(report.outcome, TurnOutcome::Skipped);
    }

    #[test]
    fn test_no_play_with_full_reserve_exchanges_everything() {
        let dictionary = dictionary();
        let policy = VirtualPolicy::expert();
        let mut table = Table::new(&['q', 'z'], &['e'; 10]);

        let report = table.run(&dictionary, &policy);
        assert_eq!(
            report.visited,
            vec![ActionKind::Decide, ActionKind::Place, ActionKind::Exchange]
        );
        assert_eq!(report.outcome, TurnOutcome::Exchanged { count: 2 });
        assert_eq!(table.rack.letters(), vec!['e', 'e']);
    }

    #[test]
    fn test_generation_budget_limits_search() {
        let dictionary = dictionary();
        let policy = VirtualPolicy {
            max_generation_steps: Some(0),
            ..VirtualPolicy::expert()
        };
        let mut table = Table::new(&['c', 'a', 't'], &['e'; 10]);

        let report = table.run(&dictionary, &policy);
        assert_eq!(
            report.visited,
            vec![ActionKind::Decide, ActionKind::Place, ActionKind::Exchange]
        );
    }
}
