//! Shape catalog: the 24 piece shapes and the three block colors

use rand::Rng;
use ratatui::style::Color;

/// Shapes with at most this many cells count as "small"
pub const SMALL_SHAPE_MAX_CELLS: usize = 3;

/// The three block colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockColor {
    Red,
    Green,
    Blue,
}

impl BlockColor {
    pub const ALL: [BlockColor; 3] = [BlockColor::Red, BlockColor::Green, BlockColor::Blue];

    /// Terminal color for this block
    pub fn color(&self) -> Color {
        match self {
            BlockColor::Red => Color::Rgb(244, 67, 54),
            BlockColor::Green => Color::Rgb(76, 175, 80),
            BlockColor::Blue => Color::Rgb(33, 150, 243),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BlockColor::Red => "red",
            BlockColor::Green => "green",
            BlockColor::Blue => "blue",
        }
    }
}

/// A rectangular occupancy grid, anchored at its top-left cell.
///
/// Each pattern row is a string where `#` marks an occupied cell and `.`
/// an empty one. All rows have the same width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    pattern: &'static [&'static str],
}

impl Shape {
    const fn new(pattern: &'static [&'static str]) -> Self {
        Self { pattern }
    }

    pub fn rows(&self) -> usize {
        self.pattern.len()
    }

    pub fn cols(&self) -> usize {
        self.pattern[0].len()
    }

    /// Whether the cell at (row, col) relative to the anchor is occupied.
    /// Out-of-range offsets are never occupied.
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        self.pattern
            .get(row)
            .and_then(|line| line.as_bytes().get(col))
            .is_some_and(|&b| b == b'#')
    }

    /// Offsets (row, col) of the occupied cells, row-major
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pattern.iter().enumerate().flat_map(|(r, line)| {
            line.bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'#')
                .map(move |(c, _)| (r, c))
        })
    }

    pub fn cell_count(&self) -> usize {
        self.cells().count()
    }

    pub fn is_small(&self) -> bool {
        self.cell_count() <= SMALL_SHAPE_MAX_CELLS
    }
}

/// The single-cell shape, handed out when nothing else fits
pub static SINGLE: Shape = Shape::new(&["#"]);

/// Every shape a piece can take
pub static SHAPES: [Shape; 24] = [
    Shape::new(&["#"]),
    // Dominoes
    Shape::new(&["##"]),
    Shape::new(&["#", "#"]),
    // Straight trominoes
    Shape::new(&["###"]),
    Shape::new(&["#", "#", "#"]),
    // Corners
    Shape::new(&["##", "#."]),
    Shape::new(&["##", ".#"]),
    Shape::new(&[".#", "##"]),
    Shape::new(&["#.", "##"]),
    // Straight tetrominoes
    Shape::new(&["####"]),
    Shape::new(&["#", "#", "#", "#"]),
    // L / J
    Shape::new(&["#.", "#.", "##"]),
    Shape::new(&[".#", ".#", "##"]),
    Shape::new(&["##", "#.", "#."]),
    Shape::new(&["##", ".#", ".#"]),
    // T
    Shape::new(&["###", ".#."]),
    Shape::new(&[".#", "##", ".#"]),
    // Square
    Shape::new(&["##", "##"]),
    // Rectangles
    Shape::new(&["##", "##", "##"]),
    Shape::new(&["###", "###"]),
    // Straight pentominoes
    Shape::new(&["#####"]),
    Shape::new(&["#", "#", "#", "#", "#"]),
    // Z / S
    Shape::new(&["##.", ".##"]),
    Shape::new(&[".##", "##."]),
];

/// Shapes with at most [`SMALL_SHAPE_MAX_CELLS`] cells, in catalog order
pub fn small_shapes() -> Vec<&'static Shape> {
    SHAPES.iter().filter(|s| s.is_small()).collect()
}

pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> BlockColor {
    BlockColor::ALL[rng.gen_range(0..BlockColor::ALL.len())]
}

pub fn random_shape<R: Rng + ?Sized>(rng: &mut R) -> &'static Shape {
    &SHAPES[rng.gen_range(0..SHAPES.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_dimensions() {
        for shape in &SHAPES {
            assert!((1..=5).contains(&shape.rows()));
            assert!((1..=5).contains(&shape.cols()));
            assert!(shape.cell_count() >= 1);
            // Every row has the same width
            assert!(shape.pattern.iter().all(|line| line.len() == shape.cols()));
        }
    }

    #[test]
    fn test_catalog_shapes_are_distinct() {
        let unique: HashSet<_> = SHAPES.iter().map(|s| s.pattern).collect();
        assert_eq!(unique.len(), SHAPES.len());
    }

    #[test]
    fn test_small_shapes() {
        let small = small_shapes();
        assert_eq!(small.len(), 9);
        assert!(small.iter().all(|s| s.cell_count() <= 3));
        assert!(small.contains(&&SINGLE));
    }

    #[test]
    fn test_cells_of_t_piece() {
        let t = &SHAPES[15];
        let cells: Vec<_> = t.cells().collect();
        assert_eq!(cells, vec![(0, 0), (0, 1), (0, 2), (1, 1)]);
        assert!(!t.is_filled(1, 0));
        assert!(!t.is_filled(5, 5));
    }

    #[test]
    fn test_random_draws_cover_sets() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let colors: HashSet<_> = (0..200).map(|_| random_color(&mut rng)).collect();
        assert_eq!(colors.len(), 3);

        let shapes: HashSet<_> = (0..2000).map(|_| random_shape(&mut rng).pattern).collect();
        assert_eq!(shapes.len(), SHAPES.len());
    }
}
