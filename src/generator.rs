//! Piece generator: deals three pieces per round, biased toward pieces that
//! still fit as the board fills up.
//!
//! The amount of free space decides how picky the generator is:
//!
//! - fewer than [`TIGHT_THRESHOLD`] empty cells: only shapes that fit
//!   somewhere are dealt
//! - fewer than [`ROOMY_THRESHOLD`]: small shapes are preferred, and the
//!   first shape that fits is taken
//! - otherwise: any shape, uniformly
//!
//! All randomness comes from the injected rng, so a seeded rng reproduces
//! the exact same deals.

use crate::board::{BOARD_SIZE, Board, Cell};
use crate::piece::{Piece, Tray};
use crate::shapes::{SHAPES, SINGLE, Shape, random_color, random_shape, small_shapes};
use rand::Rng;
use rand::seq::SliceRandom;

/// Below this many empty cells, only fitting shapes are dealt
pub const TIGHT_THRESHOLD: usize = 15;
/// Below this many empty cells, small shapes are preferred
pub const ROOMY_THRESHOLD: usize = 25;
/// Chance of drawing from the small-shape pool in the moderate regime
pub const SMALL_SHAPE_BIAS: f64 = 0.6;

/// Prefill target range (inclusive)
pub const PREFILL_MIN: usize = 8;
pub const PREFILL_MAX: usize = 14;
/// Random probes before prefill gives up
pub const PREFILL_MAX_ATTEMPTS: usize = 200;

/// Deals trays of pieces from an injected random source
#[derive(Debug, Clone)]
pub struct PieceGenerator<R> {
    rng: R,
}

impl<R: Rng> PieceGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Deal a fresh tray of three pieces for `board`
    pub fn spawn(&mut self, board: &Board) -> Tray {
        let empty = board.empty_cell_count();
        let pieces = std::array::from_fn(|slot| {
            let shape = self.pick_shape(board, empty);
            Piece::new(shape, random_color(&mut self.rng), slot)
        });
        let tray = Tray::new(pieces);
        tracing::debug!(
            empty,
            shapes = ?tray.remaining().map(|p| p.shape.cell_count()).collect::<Vec<_>>(),
            "dealt tray"
        );
        tray
    }

    fn pick_shape(&mut self, board: &Board, empty: usize) -> &'static Shape {
        if empty < TIGHT_THRESHOLD {
            self.fitting_pick(board)
        } else if empty < ROOMY_THRESHOLD {
            let mut pool = if self.rng.gen_bool(SMALL_SHAPE_BIAS) {
                small_shapes()
            } else {
                SHAPES.iter().collect()
            };
            pool.shuffle(&mut self.rng);
            match pool.into_iter().find(|shape| board.can_place_anywhere(shape)) {
                Some(shape) => shape,
                None => self.fitting_pick(board),
            }
        } else {
            random_shape(&mut self.rng)
        }
    }

    /// A random shape that fits somewhere, or the single cell if none does
    fn fitting_pick(&mut self, board: &Board) -> &'static Shape {
        let mut shuffled: Vec<&'static Shape> = SHAPES.iter().collect();
        shuffled.shuffle(&mut self.rng);
        shuffled
            .into_iter()
            .find(|shape| board.can_place_anywhere(shape))
            .unwrap_or(&SINGLE)
    }

    /// Scatter single colored cells over `board`.
    ///
    /// Aims for a random count in `PREFILL_MIN..=PREFILL_MAX` but stops after
    /// `PREFILL_MAX_ATTEMPTS` probes, so fewer cells may be placed on a
    /// crowded board. Returns how many were placed.
    pub fn prefill(&mut self, board: &mut Board) -> usize {
        let target = self.rng.gen_range(PREFILL_MIN..=PREFILL_MAX);
        let mut placed = 0;
        let mut attempts = 0;

        while placed < target && attempts < PREFILL_MAX_ATTEMPTS {
            let row = self.rng.gen_range(0..BOARD_SIZE) as i32;
            let col = self.rng.gen_range(0..BOARD_SIZE) as i32;
            if board.get(row, col).is_some_and(|cell| cell.is_empty()) {
                board.set(row, col, Cell::Filled(random_color(&mut self.rng)));
                placed += 1;
            }
            attempts += 1;
        }

        if placed < target {
            tracing::debug!(placed, target, "prefill ran out of attempts");
        }
        placed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::BlockColor;
    use rand::SeedableRng;
    use rand::rngs::mock::StepRng;
    use rand_chacha::ChaCha8Rng;

    fn seeded(seed: u64) -> PieceGenerator<ChaCha8Rng> {
        PieceGenerator::new(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Board with exactly the given cells left empty
    fn board_with_holes(holes: &[(i32, i32)]) -> Board {
        let mut board = Board::new();
        for row in 0..BOARD_SIZE as i32 {
            for col in 0..BOARD_SIZE as i32 {
                if !holes.contains(&(row, col)) {
                    board.set(row, col, Cell::Filled(BlockColor::Blue));
                }
            }
        }
        board
    }

    /// 32 isolated holes: only the single cell fits
    fn checkerboard() -> Board {
        let holes: Vec<_> = (0..8)
            .flat_map(|r| (0..8).map(move |c| (r, c)))
            .filter(|(r, c)| (r + c) % 2 == 0)
            .collect();
        board_with_holes(&holes)
    }

    #[test]
    fn test_moderate_board_prefers_small_shapes() {
        // 18 empty cells: a 4x4 corner plus one cell past each edge, so every
        // shape fits and only the pool choice decides what is dealt
        let mut holes: Vec<_> = (0..4).flat_map(|r| (0..4).map(move |c| (r, c))).collect();
        holes.extend([(4, 0), (0, 4)]);
        let board = board_with_holes(&holes);
        assert_eq!(board.empty_cell_count(), 18);
        assert!(SHAPES.iter().all(|shape| board.can_place_anywhere(shape)));

        let mut generator = seeded(7);
        let mut small = 0;
        let mut total = 0;
        for _ in 0..300 {
            let tray = generator.spawn(&board);
            small += tray.remaining().filter(|p| p.shape.is_small()).count();
            total += tray.remaining_count();
        }

        // 0.6 + 0.4 * 9/24 = 0.75 with the bias, 0.375 without
        let share = small as f64 / total as f64;
        assert!((0.65..0.85).contains(&share), "small share {}", share);
    }

    #[test]
    fn test_spawn_fills_three_slots() {
        let mut generator = seeded(1);
        let tray = generator.spawn(&Board::new());
        assert_eq!(tray.remaining_count(), 3);
        for (slot, piece) in tray.slots().iter().enumerate() {
            assert_eq!(piece.unwrap().slot, slot);
        }
    }

    #[test]
    fn test_same_seed_same_deals() {
        let mut a = seeded(42);
        let mut b = seeded(42);
        let board = Board::new();
        for _ in 0..20 {
            assert_eq!(a.spawn(&board), b.spawn(&board));
        }
    }

    #[test]
    fn test_scripted_rng_selects_exact_pieces() {
        // An all-zero source always picks the first shape and first color
        let mut generator = PieceGenerator::new(StepRng::new(0, 0));
        let tray = generator.spawn(&Board::new());
        for piece in tray.remaining() {
            assert_eq!(*piece.shape, SHAPES[0]);
            assert_eq!(piece.color, BlockColor::Red);
        }
    }

    #[test]
    fn test_roomy_board_ignores_fit() {
        let board = checkerboard();
        assert!(board.empty_cell_count() >= ROOMY_THRESHOLD);

        let mut generator = seeded(3);
        let unplaceable = (0..50)
            .flat_map(|_| generator.spawn(&board).remaining().copied().collect::<Vec<_>>())
            .filter(|piece| !board.can_place_anywhere(piece.shape))
            .count();
        assert!(unplaceable > 0);
    }

    #[test]
    fn test_tight_board_only_deals_fitting_pieces() {
        let holes = [(7, 0), (7, 1), (7, 2), (7, 3), (7, 4), (0, 0), (2, 2), (3, 2)];
        let board = board_with_holes(&holes);
        assert!(board.empty_cell_count() < TIGHT_THRESHOLD);

        let mut generator = seeded(5);
        for _ in 0..100 {
            for piece in generator.spawn(&board).remaining() {
                assert!(board.can_place_anywhere(piece.shape), "{:?}", piece.shape);
            }
        }
    }

    #[test]
    fn test_moderate_board_deals_fitting_pieces_when_possible() {
        // Two empty rows: 16 cells, lines up to five long fit
        let holes: Vec<_> = (0..8).flat_map(|c| [(0, c), (5, c)]).collect();
        let board = board_with_holes(&holes);
        let empty = board.empty_cell_count();
        assert!((TIGHT_THRESHOLD..ROOMY_THRESHOLD).contains(&empty));

        let mut generator = seeded(9);
        for _ in 0..100 {
            for piece in generator.spawn(&board).remaining() {
                assert!(board.can_place_anywhere(piece.shape));
            }
        }
    }

    #[test]
    fn test_full_board_falls_back_to_single() {
        let board = board_with_holes(&[]);
        let mut generator = seeded(11);
        let tray = generator.spawn(&board);
        for piece in tray.remaining() {
            assert_eq!(*piece.shape, SINGLE);
            assert!(!board.can_place_anywhere(piece.shape));
        }
    }

    #[test]
    fn test_prefill_on_empty_board_hits_target_range() {
        for seed in 0..20 {
            let mut board = Board::new();
            let placed = seeded(seed).prefill(&mut board);
            assert!((PREFILL_MIN..=PREFILL_MAX).contains(&placed));
            assert_eq!(board.empty_cell_count(), 64 - placed);
        }
    }

    #[test]
    fn test_prefill_on_full_board_places_nothing() {
        let mut board = board_with_holes(&[]);
        assert_eq!(seeded(2).prefill(&mut board), 0);
    }

    #[test]
    fn test_prefill_is_best_effort_on_crowded_board() {
        let mut board = board_with_holes(&[(4, 4), (1, 6)]);
        let placed = seeded(4).prefill(&mut board);
        assert!(placed <= 2);
        assert_eq!(board.empty_cell_count(), 2 - placed);
    }
}
