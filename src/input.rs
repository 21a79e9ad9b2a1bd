//! Input handling: keyboard cursor and mouse drag-and-drop
//!
//! The engine only ever sees `attempt_placement(slot, row, col)`. This
//! module turns key presses and pointer positions into that call.

use crate::board::BOARD_SIZE;
use crate::piece::{Piece, TRAY_SIZE, Tray};
use crate::settings::Settings;
use crate::shapes::Shape;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;

/// Terminal columns per board cell
pub const CELL_WIDTH: u16 = 2;

/// Actions a key press can trigger while playing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayAction {
    SelectSlot(usize),
    NextSlot,
    MoveCursor(i32, i32),
    Place,
    Restart,
    Quit,
}

/// Key bindings configuration - supports multiple keys per action
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub cursor_up: Vec<KeyCode>,
    pub cursor_down: Vec<KeyCode>,
    pub cursor_left: Vec<KeyCode>,
    pub cursor_right: Vec<KeyCode>,
    pub place: Vec<KeyCode>,
    pub next_piece: Vec<KeyCode>,
    pub restart: Vec<KeyCode>,
    pub quit: Vec<KeyCode>,
}

impl KeyBindings {
    /// Parse a key string into KeyCode
    fn parse_key(s: &str) -> KeyCode {
        match s.to_lowercase().as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "backspace" => KeyCode::Backspace,
            "esc" | "escape" => KeyCode::Esc,
            s => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => {
                        tracing::warn!("Unknown key name {:?} in settings", s);
                        KeyCode::Null
                    }
                }
            }
        }
    }

    /// Parse a list of key strings into KeyCodes
    fn parse_keys(keys: &[String]) -> Vec<KeyCode> {
        keys.iter().map(|s| Self::parse_key(s)).collect()
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            cursor_up: Self::parse_keys(&settings.keys.cursor_up),
            cursor_down: Self::parse_keys(&settings.keys.cursor_down),
            cursor_left: Self::parse_keys(&settings.keys.cursor_left),
            cursor_right: Self::parse_keys(&settings.keys.cursor_right),
            place: Self::parse_keys(&settings.keys.place),
            next_piece: Self::parse_keys(&settings.keys.next_piece),
            restart: Self::parse_keys(&settings.keys.restart),
            quit: Self::parse_keys(&settings.keys.quit),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// A piece being dragged with the mouse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragState {
    pub slot: usize,
    /// Pointer position in terminal cells
    pub column: u16,
    pub row: u16,
}

/// Tracks the keyboard cursor, the selected tray slot and any mouse drag
#[derive(Debug, Clone)]
pub struct InputHandler {
    bindings: KeyBindings,
    /// Board anchor (row, col) for keyboard placement
    pub cursor: (i32, i32),
    /// Tray slot chosen for keyboard placement
    pub selected: Option<usize>,
    drag: Option<DragState>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            bindings: KeyBindings::default(),
            cursor: (0, 0),
            selected: Some(0),
            drag: None,
        }
    }

    /// Create input handler from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            bindings: KeyBindings::from_settings(settings),
            ..Self::new()
        }
    }

    /// Map a key press to an action
    pub fn key_down(&self, key: KeyEvent) -> Option<PlayAction> {
        // Ctrl+C always quits
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(PlayAction::Quit);
        }

        let code = normalize_key(key.code);
        let b = &self.bindings;

        // Slot keys are fixed
        if let KeyCode::Char(c @ '1'..='3') = code {
            return Some(PlayAction::SelectSlot(c as usize - '1' as usize));
        }

        if b.cursor_up.contains(&code) {
            Some(PlayAction::MoveCursor(-1, 0))
        } else if b.cursor_down.contains(&code) {
            Some(PlayAction::MoveCursor(1, 0))
        } else if b.cursor_left.contains(&code) {
            Some(PlayAction::MoveCursor(0, -1))
        } else if b.cursor_right.contains(&code) {
            Some(PlayAction::MoveCursor(0, 1))
        } else if b.place.contains(&code) {
            Some(PlayAction::Place)
        } else if b.next_piece.contains(&code) {
            Some(PlayAction::NextSlot)
        } else if b.restart.contains(&code) {
            Some(PlayAction::Restart)
        } else if b.quit.contains(&code) {
            Some(PlayAction::Quit)
        } else {
            None
        }
    }

    /// Move the keyboard cursor, keeping it on the board
    pub fn move_cursor(&mut self, dr: i32, dc: i32) {
        let max = BOARD_SIZE as i32 - 1;
        self.cursor = (
            (self.cursor.0 + dr).clamp(0, max),
            (self.cursor.1 + dc).clamp(0, max),
        );
    }

    pub fn select(&mut self, slot: usize) {
        if slot < TRAY_SIZE {
            self.selected = Some(slot);
        }
    }

    /// Keep the selection on a piece that is still in the tray
    pub fn sync_selection(&mut self, tray: &Tray) {
        let current = self.selected.unwrap_or(0);
        if tray.get(current).is_none() {
            self.selected = tray.next_occupied(current);
        } else {
            self.selected = Some(current);
        }
    }

    /// Select the next piece still in the tray
    pub fn select_next(&mut self, tray: &Tray) {
        let current = self.selected.unwrap_or(TRAY_SIZE - 1);
        if let Some(next) = tray.next_occupied(current) {
            self.selected = Some(next);
        }
    }

    pub fn start_drag(&mut self, slot: usize, column: u16, row: u16) {
        self.selected = Some(slot);
        self.drag = Some(DragState { slot, column, row });
    }

    pub fn update_drag(&mut self, column: u16, row: u16) {
        if let Some(drag) = &mut self.drag {
            drag.column = column;
            drag.row = row;
        }
    }

    /// Finish the drag, returning where it ended
    pub fn end_drag(&mut self) -> Option<DragState> {
        self.drag.take()
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    /// The piece and anchor currently aimed at: the dragged piece under the
    /// pointer, otherwise the selected piece at the keyboard cursor
    pub fn target(&self, board_inner: Rect, tray: &Tray) -> Option<(Piece, i32, i32)> {
        if let Some(drag) = &self.drag {
            let piece = *tray.get(drag.slot)?;
            let (row, col) = pointer_to_anchor(board_inner, piece.shape, drag.column, drag.row)?;
            return Some((piece, row, col));
        }
        let piece = *tray.get(self.selected?)?;
        Some((piece, self.cursor.0, self.cursor.1))
    }

    /// Clear drag and cursor state (new game)
    pub fn reset(&mut self) {
        self.drag = None;
        self.cursor = (0, 0);
        self.selected = Some(0);
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-left corner, in fractional screen cells, of a piece held with its
/// centre on the middle of the pointer's cell
fn held_origin(shape: &Shape, column: u16, row: u16) -> (f32, f32) {
    let left = column as f32 + 0.5 - (shape.cols() as u16 * CELL_WIDTH) as f32 / 2.0;
    let top = row as f32 + 0.5 - shape.rows() as f32 / 2.0;
    (left, top)
}

/// Screen cell where the drag ghost's top-left block is drawn
pub fn drag_origin(shape: &Shape, column: u16, row: u16) -> (i32, i32) {
    let (left, top) = held_origin(shape, column, row);
    ((left + 0.5).floor() as i32, (top + 0.5).floor() as i32)
}

/// Board anchor for a piece held with its centre under the pointer.
///
/// The held piece snaps to the nearest board cell; a piece exactly halfway
/// between two cells snaps to the right or lower one. `board_inner` is the
/// board area without borders. Returns None when the anchor falls outside
/// the board.
pub fn pointer_to_anchor(board_inner: Rect, shape: &Shape, column: u16, row: u16) -> Option<(i32, i32)> {
    let (left, top) = held_origin(shape, column, row);
    let anchor_col = ((left - board_inner.x as f32) / CELL_WIDTH as f32 + 0.5).floor() as i32;
    let anchor_row = (top - board_inner.y as f32 + 0.5).floor() as i32;

    let size = BOARD_SIZE as i32;
    if (0..size).contains(&anchor_row) && (0..size).contains(&anchor_col) {
        Some((anchor_row, anchor_col))
    } else {
        None
    }
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{BlockColor, SHAPES, SINGLE};

    const BOARD_INNER: Rect = Rect {
        x: 10,
        y: 5,
        width: 16,
        height: 8,
    };

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn tray() -> Tray {
        Tray::new([
            Piece::new(&SINGLE, BlockColor::Red, 0),
            Piece::new(&SHAPES[17], BlockColor::Green, 1),
            Piece::new(&SHAPES[20], BlockColor::Blue, 2),
        ])
    }

    #[test]
    fn test_default_bindings() {
        let input = InputHandler::new();
        assert_eq!(input.key_down(press(KeyCode::Up)), Some(PlayAction::MoveCursor(-1, 0)));
        assert_eq!(input.key_down(press(KeyCode::Char('L'))), Some(PlayAction::MoveCursor(0, 1)));
        assert_eq!(input.key_down(press(KeyCode::Enter)), Some(PlayAction::Place));
        assert_eq!(input.key_down(press(KeyCode::Char('2'))), Some(PlayAction::SelectSlot(1)));
        assert_eq!(input.key_down(press(KeyCode::Char('r'))), Some(PlayAction::Restart));
        assert_eq!(input.key_down(press(KeyCode::Char('z'))), None);
        assert_eq!(
            input.key_down(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(PlayAction::Quit)
        );
    }

    #[test]
    fn test_custom_bindings() {
        let mut settings = Settings::default();
        settings.keys.place = vec!["p".to_string()];
        let input = InputHandler::from_settings(&settings);
        assert_eq!(input.key_down(press(KeyCode::Char('p'))), Some(PlayAction::Place));
        assert_eq!(input.key_down(press(KeyCode::Enter)), None);
    }

    #[test]
    fn test_cursor_stays_on_board() {
        let mut input = InputHandler::new();
        input.move_cursor(-1, -1);
        assert_eq!(input.cursor, (0, 0));
        for _ in 0..20 {
            input.move_cursor(1, 1);
        }
        assert_eq!(input.cursor, (7, 7));
    }

    #[test]
    fn test_pointer_to_anchor() {
        // Top-left board cell spans columns 10-11 on row 5
        assert_eq!(pointer_to_anchor(BOARD_INNER, &SINGLE, 10, 5), Some((0, 0)));
        assert_eq!(pointer_to_anchor(BOARD_INNER, &SINGLE, 11, 5), Some((0, 0)));
        assert_eq!(pointer_to_anchor(BOARD_INNER, &SINGLE, 25, 12), Some((7, 7)));
        assert_eq!(pointer_to_anchor(BOARD_INNER, &SINGLE, 9, 5), None);
        assert_eq!(pointer_to_anchor(BOARD_INNER, &SINGLE, 26, 5), None);

        // A 2x2 square is held by its centre and snaps to the nearest cell
        let square = &SHAPES[17];
        assert_eq!(pointer_to_anchor(BOARD_INNER, square, 12, 5), Some((0, 0)));
        assert_eq!(pointer_to_anchor(BOARD_INNER, square, 13, 5), Some((0, 1)));
        assert_eq!(pointer_to_anchor(BOARD_INNER, square, 12, 6), Some((1, 0)));
        assert_eq!(pointer_to_anchor(BOARD_INNER, square, 10, 5), None);
    }

    #[test]
    fn test_drag_origin_matches_anchor() {
        assert_eq!(drag_origin(&SINGLE, 10, 5), (10, 5));

        // Ghost drawn at the cell the square would land on
        let square = &SHAPES[17];
        assert_eq!(drag_origin(square, 13, 5), (12, 5));
        assert_eq!(pointer_to_anchor(BOARD_INNER, square, 13, 5), Some((0, 1)));

        let bar = &SHAPES[9];
        assert_eq!(drag_origin(bar, 21, 9), (18, 9));
        assert_eq!(pointer_to_anchor(BOARD_INNER, bar, 21, 9), Some((4, 4)));
    }

    #[test]
    fn test_drag_target() {
        let mut input = InputHandler::new();
        let tray = tray();

        input.start_drag(1, 14, 8);
        let (piece, row, col) = input.target(BOARD_INNER, &tray).unwrap();
        assert_eq!(piece.slot, 1);
        assert_eq!((row, col), (3, 1));
        assert_eq!(input.selected, Some(1));

        input.update_drag(0, 0);
        assert!(input.target(BOARD_INNER, &tray).is_none());

        let drag = input.end_drag().unwrap();
        assert_eq!((drag.column, drag.row), (0, 0));
        assert!(input.drag().is_none());
    }

    #[test]
    fn test_keyboard_target_follows_cursor() {
        let mut input = InputHandler::new();
        let tray = tray();
        input.select(2);
        input.move_cursor(3, 2);
        let (piece, row, col) = input.target(BOARD_INNER, &tray).unwrap();
        assert_eq!(piece.slot, 2);
        assert_eq!((row, col), (3, 2));
    }

    #[test]
    fn test_selection_skips_consumed_slots() {
        let mut input = InputHandler::new();
        let mut tray = tray();
        tray.take(0);
        input.sync_selection(&tray);
        assert_eq!(input.selected, Some(1));

        input.select_next(&tray);
        assert_eq!(input.selected, Some(2));
        input.select_next(&tray);
        assert_eq!(input.selected, Some(1));

        tray.take(1);
        tray.take(2);
        input.sync_selection(&tray);
        assert_eq!(input.selected, None);
    }
}
