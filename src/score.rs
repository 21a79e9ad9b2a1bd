//! Scoring: one point per placed cell, bonuses for cleared lines

/// Points for each cleared row or column
pub const POINTS_PER_LINE: u64 = 8;
/// Extra points per line when more than one line clears at once
pub const COMBO_POINTS_PER_LINE: u64 = 10;

/// Score tracking for one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Pieces placed
    pub moves: u32,
    /// Total lines cleared
    pub lines: u32,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add score for a placed piece (1 point per cell)
    pub fn add_placement(&mut self, cells: usize) {
        self.points += cells as u64;
        self.moves += 1;
    }

    /// Add score for `count` cleared lines and return the points awarded
    pub fn add_clear(&mut self, count: u32) -> u64 {
        let awarded = clear_points(count);
        self.points += awarded;
        self.lines += count;
        awarded
    }
}

/// Points for clearing `count` lines in a single placement
pub fn clear_points(count: u32) -> u64 {
    let count = count as u64;
    let mut points = count * POINTS_PER_LINE;
    if count > 1 {
        points += count * COMBO_POINTS_PER_LINE;
    }
    points
}
