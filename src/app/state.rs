//! Game session state: one human against one virtual player

use super::command::{Command, HELP};
use crate::config::GameConfig;
use crate::game::board::{Board, Bonus, Placement, Position, STANDARD_SIZE};
use crate::game::dictionary::Dictionary;
use crate::game::rack::{LetterReserve, Reserve};
use crate::game::validation::{ScoringRules, Validator};
use crate::player::actions::TurnOutcome;
use crate::player::{end_game_adjustment, Player, TurnError, TurnRules};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Index of the human in `App::players`.
pub const HUMAN: usize = 0;
/// Index of the virtual player in `App::players`.
pub const VIRTUAL: usize = 1;

/// Maximum entries kept in the message log
const MESSAGE_LOG_MAX: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Game events everyone sees
    System,
    /// Rejected commands
    Error,
    /// Diagnostics, shown only in debug mode
    Debug,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
}

/// Why the game stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameOver {
    RackOut { player: String },
    TooManySkips,
}

/// Main application state
pub struct App<'d> {
    /// Whether the application should quit
    pub should_quit: bool,
    /// Current user input
    pub input: String,
    /// Whether debug messages are displayed
    pub show_debug: bool,
    /// Recent messages, oldest first
    pub messages: VecDeque<Message>,
    pub board: Board,
    pub players: Vec<Player>,
    /// Index of the player whose turn it is
    pub current: usize,
    /// Set once the game has ended
    pub game_over: Option<GameOver>,
    reserve: Reserve,
    dictionary: &'d Dictionary,
    scoring: ScoringRules,
    rules: TurnRules,
    rng: StdRng,
    /// Skipped turns in a row, across players
    consecutive_skips: u32,
    max_consecutive_skips: u32,
    think_time: Duration,
    turn_started: Instant,
}

impl<'d> App<'d> {
    /// Set up a new game from `config`, dealing both racks.
    pub fn new(config: &GameConfig, dictionary: &'d Dictionary) -> Result<Self, TurnError> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        let board = if config.random_bonus {
            Board::with_random_bonuses(config.board_size, &mut rng)
        } else if config.board_size == STANDARD_SIZE {
            Board::standard()
        } else {
            let center = config.board_size / 2;
            Board::with_bonuses(config.board_size, &[(Position::new(center, center), Bonus::Center)])
        };
        let mut reserve = Reserve::standard_with_rng(StdRng::from_rng(&mut rng));

        let mut players = vec![
            Player::human("You"),
            Player::virtual_player("Bot", config.virtual_player.policy()),
        ];
        for player in &mut players {
            player.fill_rack(&mut reserve, config.rack_size)?;
        }

        info!(
            board_size = config.board_size,
            difficulty = %config.virtual_player.difficulty,
            "game started"
        );

        let mut app = Self {
            should_quit: false,
            input: String::new(),
            show_debug: false,
            messages: VecDeque::new(),
            board,
            players,
            current: HUMAN,
            game_over: None,
            reserve,
            dictionary,
            scoring: config.scoring_rules(),
            rules: config.turn_rules(),
            rng,
            consecutive_skips: 0,
            max_consecutive_skips: config.max_consecutive_skips,
            think_time: Duration::from_secs(config.min_think_seconds),
            turn_started: Instant::now(),
        };
        app.push(MessageKind::System, "Your turn. Type !help for commands.");
        Ok(app)
    }

    /// Signal the application to quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn is_human_turn(&self) -> bool {
        self.game_over.is_none() && self.current == HUMAN
    }

    pub fn reserve_len(&self) -> usize {
        self.reserve.len()
    }

    /// Handle character input (locked when the game is over)
    pub fn on_char(&mut self, c: char) {
        if self.game_over.is_some() {
            return;
        }
        self.input.push(c);
    }

    /// Handle backspace
    pub fn on_backspace(&mut self) {
        self.input.pop();
    }

    /// Handle command submission (Enter key)
    pub fn on_submit(&mut self) {
        if self.input.trim().is_empty() || self.game_over.is_some() {
            return;
        }
        let input = std::mem::take(&mut self.input);

        match Command::parse(&input, self.board.size(), self.rules.rack_size) {
            Ok(command) => self.run_command(command),
            Err(e) => self.push(MessageKind::Error, e.to_string()),
        }
    }

    /// Let the virtual player move once it has thought long enough.
    pub fn tick(&mut self) {
        if self.game_over.is_some() || self.current != VIRTUAL {
            return;
        }
        if self.turn_started.elapsed() >= self.think_time {
            self.play_virtual_turn();
        }
    }

    fn run_command(&mut self, command: Command) {
        match command {
            Command::Help => {
                for line in HELP.lines() {
                    self.push(MessageKind::System, line);
                }
            }
            Command::Debug => {
                self.show_debug = !self.show_debug;
                let state = if self.show_debug { "on" } else { "off" };
                self.push(MessageKind::System, format!("Debug messages {}", state));
            }
            Command::Reserve => {
                let counts: Vec<String> = self
                    .reserve
                    .counts()
                    .map(|(letter, count)| format!("{}:{}", letter, count))
                    .collect();
                self.push(MessageKind::System, format!("Reserve ({}): {}", self.reserve.len(), counts.join(" ")));
            }
            _ if !self.is_human_turn() => {
                self.push(MessageKind::Error, "Not your turn");
            }
            Command::Place { .. } => self.place(command.placements()),
            Command::Exchange { letters } => {
                let result = self.players[HUMAN].exchange_letters(&mut self.reserve, &letters, self.rules);
                match result {
                    Ok(()) => {
                        self.push(MessageKind::System, format!("You exchanged {} letters", letters.len()));
                        self.consecutive_skips = 0;
                        self.end_turn();
                    }
                    Err(e) => self.push(MessageKind::Error, e.to_string()),
                }
            }
            Command::Pass => {
                self.players[HUMAN].skip_turn();
                self.push(MessageKind::System, "You passed");
                self.consecutive_skips += 1;
                self.end_turn();
            }
        }
    }

    fn place(&mut self, placements: Vec<Placement>) {
        let validator = Validator::new(self.dictionary, self.scoring);
        let result = self.players[HUMAN].place_letters(
            &mut self.board,
            &validator,
            &mut self.reserve,
            &placements,
            self.rules,
        );
        match result {
            Ok(play) => {
                self.push(MessageKind::System, format!("You placed {} for {} points", play.word(), play.score));
                self.consecutive_skips = 0;
                self.end_turn();
            }
            Err(e) => self.push(MessageKind::Error, e.to_string()),
        }
    }

    /// Run the virtual player's turn immediately.
    pub fn play_virtual_turn(&mut self) {
        if self.game_over.is_some() || self.current != VIRTUAL {
            return;
        }

        let validator = Validator::new(self.dictionary, self.scoring);
        let result = self.players[VIRTUAL].play_virtual_turn(
            &mut self.board,
            validator,
            &mut self.reserve,
            &mut self.rng,
            self.rules,
        );

        let name = self.players[VIRTUAL].name.clone();
        match result {
            Ok(report) => {
                let path: Vec<String> = report.visited.iter().map(|kind| format!("{:?}", kind)).collect();
                self.push(MessageKind::Debug, format!("{}: {}", name, path.join(" -> ")));
                match report.outcome {
                    TurnOutcome::Placed(play) => {
                        self.push(
                            MessageKind::System,
                            format!("{} placed {} for {} points", name, play.word(), play.score),
                        );
                        self.consecutive_skips = 0;
                    }
                    TurnOutcome::Exchanged { count } => {
                        self.push(MessageKind::System, format!("{} exchanged {} letters", name, count));
                        self.consecutive_skips = 0;
                    }
                    TurnOutcome::Skipped => {
                        self.push(MessageKind::System, format!("{} passed", name));
                        self.consecutive_skips += 1;
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "virtual player turn failed");
                self.push(MessageKind::Error, format!("{} could not play: {}", name, e));
                self.consecutive_skips += 1;
            }
        }
        self.end_turn();
    }

    /// Check for the end of the game, then hand the turn over.
    fn end_turn(&mut self) {
        let player = &self.players[self.current];
        if player.rack.is_empty() && self.reserve.is_empty() {
            let name = player.name.clone();
            self.finish(GameOver::RackOut { player: name });
            return;
        }
        if self.consecutive_skips >= self.max_consecutive_skips {
            self.finish(GameOver::TooManySkips);
            return;
        }

        self.current = (self.current + 1) % self.players.len();
        self.turn_started = Instant::now();
        if self.current == HUMAN {
            self.push(MessageKind::System, "Your turn");
        }
    }

    fn finish(&mut self, reason: GameOver) {
        end_game_adjustment(&mut self.players);

        let summary: Vec<String> = self
            .players
            .iter()
            .map(|p| format!("{} {}", p.name, p.score))
            .collect();
        let headline = match &reason {
            GameOver::RackOut { player } => format!("{} used every letter.", player),
            GameOver::TooManySkips => "Too many skipped turns.".to_string(),
        };
        info!(reason = ?reason, scores = %summary.join(", "), "game over");
        self.push(MessageKind::System, format!("Game over! {} Final: {}", headline, summary.join(", ")));
        self.game_over = Some(reason);
    }

    /// Messages to display, honoring debug mode.
    pub fn visible_messages(&self) -> impl Iterator<Item = &Message> + '_ {
        self.messages
            .iter()
            .filter(move |m| self.show_debug || m.kind != MessageKind::Debug)
    }

    fn push(&mut self, kind: MessageKind, text: impl Into<String>) {
        self.messages.push_back(Message {
            kind,
            text: text.into(),
        });
        while self.messages.len() > MESSAGE_LOG_MAX {
            self.messages.pop_front();
        }
    }
}
