//! Pieces and the three-slot tray

use crate::shapes::{BlockColor, Shape};

/// Number of slots in the tray
pub const TRAY_SIZE: usize = 3;

/// A piece offered in the tray
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub shape: &'static Shape,
    pub color: BlockColor,
    /// Position in the tray (0, 1 or 2)
    pub slot: usize,
}

impl Piece {
    pub fn new(shape: &'static Shape, color: BlockColor, slot: usize) -> Self {
        Self { shape, color, slot }
    }

    pub fn cell_count(&self) -> usize {
        self.shape.cell_count()
    }
}

/// The pieces currently on offer. A `None` slot has been consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tray {
    slots: [Option<Piece>; TRAY_SIZE],
}

impl Tray {
    pub fn new(pieces: [Piece; TRAY_SIZE]) -> Self {
        Self {
            slots: pieces.map(Some),
        }
    }

    /// The piece in `slot`, if it has not been consumed
    pub fn get(&self, slot: usize) -> Option<&Piece> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Consume the piece in `slot`
    pub fn take(&mut self, slot: usize) -> Option<Piece> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    /// All slots in order, consumed ones as `None`
    pub fn slots(&self) -> &[Option<Piece>; TRAY_SIZE] {
        &self.slots
    }

    /// Pieces that have not been placed yet
    pub fn remaining(&self) -> impl Iterator<Item = &Piece> {
        self.slots.iter().flatten()
    }

    pub fn remaining_count(&self) -> usize {
        self.remaining().count()
    }

    /// Whether every slot has been consumed
    pub fn is_exhausted(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Next unconsumed slot after `slot`, wrapping around
    pub fn next_occupied(&self, slot: usize) -> Option<usize> {
        (1..=TRAY_SIZE)
            .map(|step| (slot + step) % TRAY_SIZE)
            .find(|&s| self.slots[s].is_some())
    }
}
