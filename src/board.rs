//! Game board representation, placement checks and line clearing

use crate::shapes::{BlockColor, Shape};

/// The board is always BOARD_SIZE x BOARD_SIZE
pub const BOARD_SIZE: usize = 8;

/// A cell on the board - either empty or filled with a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(BlockColor),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }
}

/// Result of a line-clear pass.
///
/// `cells` is a snapshot of every cleared cell with the color it held,
/// taken before the board was mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineClear {
    pub rows: Vec<usize>,
    pub cols: Vec<usize>,
    pub cells: Vec<(usize, usize, BlockColor)>,
}

impl LineClear {
    /// Number of cleared lines; a cell on a full row and a full column
    /// counts toward both
    pub fn count(&self) -> u32 {
        (self.rows.len() + self.cols.len()) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.cols.is_empty()
    }
}

/// The game board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Grid stored as [row][col], row 0 is the top
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Get the cell at a position (row, col)
    /// Returns None if out of bounds
    pub fn get(&self, row: i32, col: i32) -> Option<Cell> {
        let (row, col) = in_bounds(row, col)?;
        Some(self.cells[row][col])
    }

    /// Set a cell at a position
    /// Returns false if out of bounds
    pub fn set(&mut self, row: i32, col: i32, cell: Cell) -> bool {
        let Some((row, col)) = in_bounds(row, col) else {
            return false;
        };
        self.cells[row][col] = cell;
        true
    }

    /// Whether every occupied cell of `shape`, anchored at (row, col), lands
    /// inside the board on an empty cell
    pub fn can_place(&self, shape: &Shape, row: i32, col: i32) -> bool {
        shape.cells().all(|(r, c)| {
            self.get(row + r as i32, col + c as i32)
                .is_some_and(|cell| cell.is_empty())
        })
    }

    /// Whether `shape` fits at any of the 64 anchors
    pub fn can_place_anywhere(&self, shape: &Shape) -> bool {
        self.first_fit(shape).is_some()
    }

    /// First anchor (row-major) where `shape` fits
    pub fn first_fit(&self, shape: &Shape) -> Option<(i32, i32)> {
        (0..BOARD_SIZE as i32)
            .flat_map(|row| (0..BOARD_SIZE as i32).map(move |col| (row, col)))
            .find(|&(row, col)| self.can_place(shape, row, col))
    }

    /// Write `color` into every occupied cell of `shape` anchored at
    /// (row, col). Callers check [`Board::can_place`] first.
    ///
    /// Returns the board positions that were written.
    pub fn place(&mut self, shape: &Shape, color: BlockColor, row: i32, col: i32) -> Vec<(usize, usize)> {
        debug_assert!(self.can_place(shape, row, col));
        let mut written = Vec::with_capacity(shape.cell_count());
        for (r, c) in shape.cells() {
            let (target_row, target_col) = (row + r as i32, col + c as i32);
            if self.set(target_row, target_col, Cell::Filled(color)) {
                written.push((target_row as usize, target_col as usize));
            }
        }
        written
    }

    /// Clear every full row and column in one pass
    pub fn clear_full_lines(&mut self) -> LineClear {
        let rows: Vec<usize> = (0..BOARD_SIZE).filter(|&r| self.is_row_full(r)).collect();
        let cols: Vec<usize> = (0..BOARD_SIZE).filter(|&c| self.is_col_full(c)).collect();

        if rows.is_empty() && cols.is_empty() {
            return LineClear::default();
        }

        // Snapshot before mutating, each cell once
        let mut cells = Vec::new();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                if !(rows.contains(&row) || cols.contains(&col)) {
                    continue;
                }
                if let Cell::Filled(color) = self.cells[row][col] {
                    cells.push((row, col, color));
                }
            }
        }

        for &(row, col, _) in &cells {
            self.cells[row][col] = Cell::Empty;
        }

        LineClear { rows, cols, cells }
    }

    fn is_row_full(&self, row: usize) -> bool {
        self.cells[row].iter().all(|cell| cell.is_filled())
    }

    fn is_col_full(&self, col: usize) -> bool {
        self.cells.iter().all(|row| row[col].is_filled())
    }

    pub fn empty_cell_count(&self) -> usize {
        self.cells
            .iter()
            .map(|row| row.iter().filter(|cell| cell.is_empty()).count())
            .sum()
    }

    /// Check if the board is completely empty
    pub fn is_empty(&self) -> bool {
        self.empty_cell_count() == BOARD_SIZE * BOARD_SIZE
    }

    /// Iterate over rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = (usize, &[Cell; BOARD_SIZE])> {
        self.cells.iter().enumerate()
    }
}

fn in_bounds(row: i32, col: i32) -> Option<(usize, usize)> {
    let size = BOARD_SIZE as i32;
    if (0..size).contains(&row) && (0..size).contains(&col) {
        Some((row as usize, col as usize))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{SHAPES, SINGLE};

    fn fill_all(board: &mut Board) {
        for row in 0..BOARD_SIZE as i32 {
            for col in 0..BOARD_SIZE as i32 {
                board.set(row, col, Cell::Filled(BlockColor::Green));
            }
        }
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        assert!(board.is_empty());
        assert_eq!(board.empty_cell_count(), 64);
    }

    #[test]
    fn test_set_and_get() {
        let mut board = Board::new();
        assert!(board.set(5, 5, Cell::Filled(BlockColor::Red)));
        assert_eq!(board.get(5, 5), Some(Cell::Filled(BlockColor::Red)));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut board = Board::new();
        assert_eq!(board.get(-1, 0), None);
        assert_eq!(board.get(0, -1), None);
        assert_eq!(board.get(8, 0), None);
        assert_eq!(board.get(0, 8), None);
        assert!(!board.set(8, 8, Cell::Filled(BlockColor::Red)));
    }

    #[test]
    fn test_can_place_matches_bounds_and_occupancy() {
        let mut board = Board::new();
        board.set(2, 3, Cell::Filled(BlockColor::Blue));
        board.set(6, 1, Cell::Filled(BlockColor::Red));

        for shape in &SHAPES {
            for row in -2..10 {
                for col in -2..10 {
                    let expected = shape.cells().all(|(r, c)| {
                        let (br, bc) = (row + r as i32, col + c as i32);
                        (0..8).contains(&br)
                            && (0..8).contains(&bc)
                            && !((br, bc) == (2, 3) || (br, bc) == (6, 1))
                    });
                    assert_eq!(board.can_place(shape, row, col), expected, "{shape:?} at ({row}, {col})");
                }
            }
        }
    }

    #[test]
    fn test_place_then_cannot_place_again() {
        for shape in &SHAPES {
            let mut board = Board::new();
            let (row, col) = board.first_fit(shape).unwrap();
            let written = board.place(shape, BlockColor::Red, row, col);
            assert_eq!(written.len(), shape.cell_count());
            assert!(!board.can_place(shape, row, col));
        }
    }

    #[test]
    fn test_place_writes_color() {
        let mut board = Board::new();
        let corner = &SHAPES[5]; // ##/#.
        board.place(corner, BlockColor::Blue, 4, 4);
        assert_eq!(board.get(4, 4), Some(Cell::Filled(BlockColor::Blue)));
        assert_eq!(board.get(4, 5), Some(Cell::Filled(BlockColor::Blue)));
        assert_eq!(board.get(5, 4), Some(Cell::Filled(BlockColor::Blue)));
        assert_eq!(board.get(5, 5), Some(Cell::Empty));
    }

    #[test]
    fn test_can_place_anywhere() {
        let mut board = Board::new();
        fill_all(&mut board);
        assert!(!board.can_place_anywhere(&SINGLE));

        board.set(7, 7, Cell::Empty);
        assert!(board.can_place_anywhere(&SINGLE));
        assert_eq!(board.first_fit(&SINGLE), Some((7, 7)));
        assert!(!board.can_place_anywhere(&SHAPES[1]));
    }

    #[test]
    fn test_clear_single_row() {
        let mut board = Board::new();
        for col in 0..BOARD_SIZE as i32 {
            board.set(3, col, Cell::Filled(BlockColor::Red));
        }
        board.set(4, 0, Cell::Filled(BlockColor::Blue));

        let cleared = board.clear_full_lines();
        assert_eq!(cleared.count(), 1);
        assert_eq!(cleared.rows, vec![3]);
        assert!(cleared.cols.is_empty());
        assert_eq!(cleared.cells.len(), 8);
        // Nothing shifts, unlike a falling-block game
        assert_eq!(board.get(4, 0), Some(Cell::Filled(BlockColor::Blue)));
        assert_eq!(board.empty_cell_count(), 63);
    }

    #[test]
    fn test_clear_row_and_column_counts_intersection_twice() {
        let mut board = Board::new();
        for i in 0..BOARD_SIZE as i32 {
            board.set(2, i, Cell::Filled(BlockColor::Red));
            board.set(i, 5, Cell::Filled(BlockColor::Green));
        }

        let cleared = board.clear_full_lines();
        assert_eq!(cleared.count(), 2);
        // 8 + 8 - 1 shared cell
        assert_eq!(cleared.cells.len(), 15);
        assert!(board.is_empty());
    }

    #[test]
    fn test_clear_full_board() {
        let mut board = Board::new();
        fill_all(&mut board);

        let cleared = board.clear_full_lines();
        assert_eq!(cleared.count(), 16);
        assert_eq!(cleared.cells.len(), 64);
        assert!(board.is_empty());
    }

    #[test]
    fn test_clear_nothing() {
        let mut board = Board::new();
        board.set(0, 0, Cell::Filled(BlockColor::Red));
        let cleared = board.clear_full_lines();
        assert!(cleared.is_empty());
        assert_eq!(cleared.count(), 0);
        assert_eq!(board.empty_cell_count(), 63);
    }
}
