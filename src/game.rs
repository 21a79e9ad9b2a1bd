//! Core game state and logic

use crate::board::{Board, LineClear};
use crate::generator::PieceGenerator;
use crate::highscore::BestScoreStore;
use crate::piece::{Piece, Tray};
use crate::score::Score;
use crate::shapes::BlockColor;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Game state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    GameOver,
}

/// Things that happened during the last call, for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// A piece was committed to the board
    Placed {
        slot: usize,
        color: BlockColor,
        cells: Vec<(usize, usize)>,
    },
    /// Lines were cleared; holds the cells as they were before clearing
    LinesCleared(LineClear),
    /// A fresh tray was dealt
    TraySpawned,
    /// The best score went up
    BestScore(u64),
    /// No remaining piece fits
    GameOver { final_score: u64, new_best: bool },
}

/// Whether the session is stuck: at least one piece remains and none of
/// them fits anywhere. An empty tray is never game over.
pub fn is_game_over<'a>(board: &Board, remaining: impl IntoIterator<Item = &'a Piece>) -> bool {
    let mut any_remaining = false;
    for piece in remaining {
        if board.can_place_anywhere(piece.shape) {
            return false;
        }
        any_remaining = true;
    }
    any_remaining
}

/// The main game struct
pub struct Game<R = ChaCha8Rng> {
    board: Board,
    tray: Tray,
    score: Score,
    best_score: u64,
    /// Best score when the current session started
    best_at_start: u64,
    state: GameState,
    generator: PieceGenerator<R>,
    store: Box<dyn BestScoreStore>,
    events: Vec<GameEvent>,
}

impl Game<ChaCha8Rng> {
    /// Create and start a new game with a random seed
    pub fn new(store: Box<dyn BestScoreStore>) -> Self {
        Self::with_seed(rand::random(), store)
    }

    /// Create and start a new game with a fixed seed (reproducible deals)
    pub fn with_seed(seed: u64, store: Box<dyn BestScoreStore>) -> Self {
        tracing::info!("New game, seed={}", seed);
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed), store)
    }
}

impl<R: Rng> Game<R> {
    /// Create and start a new game drawing from `rng`
    pub fn with_rng(rng: R, store: Box<dyn BestScoreStore>) -> Self {
        let best_score = store.load_best_score();
        let mut game = Self {
            board: Board::new(),
            tray: Tray::default(),
            score: Score::new(),
            best_score,
            best_at_start: best_score,
            state: GameState::Playing,
            generator: PieceGenerator::new(rng),
            store,
            events: Vec::new(),
        };
        game.start();
        game
    }

    /// Reset score and board, prefill, and deal the first tray
    pub fn start(&mut self) {
        self.board = Board::new();
        self.score = Score::new();
        self.state = GameState::Playing;
        self.best_at_start = self.best_score;
        self.events.clear();

        let prefilled = self.generator.prefill(&mut self.board);
        tracing::info!("Session started, prefilled {} cells, best={}", prefilled, self.best_score);

        self.spawn_tray();
    }

    pub fn restart(&mut self) {
        self.start();
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn tray(&self) -> &Tray {
        &self.tray
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    /// Whether this session has beaten the best score it started with
    pub fn is_new_best(&self) -> bool {
        self.score.points > self.best_at_start
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Try to drop the piece in `slot` with its top-left cell at (row, col).
    ///
    /// Returns false and changes nothing when the game is over, the slot is
    /// empty, or the piece does not fit there.
    pub fn attempt_placement(&mut self, slot: usize, row: i32, col: i32) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        let Some(piece) = self.tray.get(slot).copied() else {
            tracing::debug!("Rejected placement: slot {} is empty", slot);
            return false;
        };
        if !self.board.can_place(piece.shape, row, col) {
            tracing::debug!("Rejected placement: slot {} does not fit at ({}, {})", slot, row, col);
            return false;
        }

        let cells = self.board.place(piece.shape, piece.color, row, col);
        self.score.add_placement(cells.len());
        self.tray.take(slot);
        tracing::debug!(
            "Placed slot {} ({} cells, {}) at ({}, {}), move {}",
            slot,
            cells.len(),
            piece.color.name(),
            row,
            col,
            self.score.moves
        );
        self.events.push(GameEvent::Placed {
            slot,
            color: piece.color,
            cells,
        });

        // Clear now so the checks below see the real board
        let cleared = self.board.clear_full_lines();
        if !cleared.is_empty() {
            let awarded = self.score.add_clear(cleared.count());
            tracing::info!(
                "Cleared {} rows and {} columns for {} points",
                cleared.rows.len(),
                cleared.cols.len(),
                awarded
            );
            self.events.push(GameEvent::LinesCleared(cleared));
        }

        if self.score.points > self.best_score {
            self.best_score = self.score.points;
            self.persist_best_score();
            self.events.push(GameEvent::BestScore(self.best_score));
        }

        if self.tray.is_exhausted() {
            self.spawn_tray();
        } else {
            self.check_game_over();
        }
        true
    }

    fn spawn_tray(&mut self) {
        self.tray = self.generator.spawn(&self.board);
        self.events.push(GameEvent::TraySpawned);
        self.check_game_over();
    }

    fn check_game_over(&mut self) {
        if is_game_over(&self.board, self.tray.remaining()) {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.state = GameState::GameOver;
        let final_score = self.score.points;
        self.best_score = self.best_score.max(final_score);
        self.persist_best_score();

        let new_best = self.is_new_best();
        tracing::info!(
            "Game over: score={} moves={} lines={} best={}",
            final_score,
            self.score.moves,
            self.score.lines,
            self.best_score
        );
        self.events.push(GameEvent::GameOver { final_score, new_best });
    }

    fn persist_best_score(&mut self) {
        if let Err(e) = self.store.save_best_score(self.best_score) {
            tracing::warn!("Could not save best score: {}", e);
        }
    }
}
