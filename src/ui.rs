//! Terminal UI rendering with ratatui

use crate::board::{BOARD_SIZE, Cell};
use crate::effects::Effects;
use crate::game::Game;
use crate::input::{CELL_WIDTH, InputHandler, drag_origin};
use crate::menu::{Menu, MenuItem, MenuItemType, MenuScreen};
use crate::piece::{Piece, TRAY_SIZE};
use crate::settings::Settings;
use crate::shapes::{BlockColor, Shape};
use rand::Rng;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

const EMPTY: &str = "· ";

/// Board (8*2 + borders) next to the stats panel
const BOARD_BOX_WIDTH: u16 = BOARD_SIZE as u16 * CELL_WIDTH + 2;
const BOARD_BOX_HEIGHT: u16 = BOARD_SIZE as u16 + 2;
/// Tray boxes fit the largest shape (5 cells) plus borders
const TRAY_BOX_WIDTH: u16 = 5 * CELL_WIDTH + 2;
const TRAY_BOX_HEIGHT: u16 = 5 + 2;

/// Total width needed: three tray boxes side by side
const GAME_WIDTH: u16 = TRAY_BOX_WIDTH * TRAY_SIZE as u16;
/// Title + board + tray + hint line
const GAME_HEIGHT: u16 = 1 + BOARD_BOX_HEIGHT + TRAY_BOX_HEIGHT + 1;

/// Decorative grid shown on the start menu
const MENU_PATTERN: [Option<BlockColor>; 16] = {
    use BlockColor::{Blue as B, Green as G, Red as R};
    [
        Some(R), Some(G), None, Some(B),
        None, Some(R), Some(G), None,
        Some(G), None, Some(B), Some(R),
        Some(B), Some(R), None, Some(G),
    ]
};

/// Screen areas of the game view, shared by rendering and mouse handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameLayout {
    pub title: Rect,
    pub board: Rect,
    /// Board area without borders; one board cell is CELL_WIDTH x 1
    pub board_inner: Rect,
    pub stats: Rect,
    pub tray: [Rect; TRAY_SIZE],
    pub hint: Rect,
}

impl GameLayout {
    /// Which tray slot, if any, contains the terminal cell
    pub fn tray_slot_at(&self, column: u16, row: u16) -> Option<usize> {
        self.tray.iter().position(|r| contains(*r, column, row))
    }

    pub fn on_board(&self, column: u16, row: u16) -> bool {
        contains(self.board_inner, column, row)
    }
}

/// Compute the game layout for the given terminal area
pub fn game_layout(area: Rect) -> GameLayout {
    let game_area = center_rect(area, GAME_WIDTH, GAME_HEIGHT);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(BOARD_BOX_HEIGHT),
            Constraint::Length(TRAY_BOX_HEIGHT),
            Constraint::Length(1),
        ])
        .split(game_area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(BOARD_BOX_WIDTH), Constraint::Min(0)])
        .split(rows[1]);

    let tray = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(TRAY_BOX_WIDTH); TRAY_SIZE])
        .split(rows[2]);

    let board = top[0];
    GameLayout {
        title: rows[0],
        board,
        board_inner: Block::default().borders(Borders::ALL).inner(board),
        stats: top[1],
        tray: [tray[0], tray[1], tray[2]],
        hint: rows[3],
    }
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x && column < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Menu box size for a screen
fn menu_size(screen: MenuScreen) -> (u16, u16) {
    match screen {
        MenuScreen::Main => (44, 24),
        MenuScreen::Settings => (50, 18),
    }
}

fn title_height(screen: MenuScreen) -> u16 {
    match screen {
        // Big title, decorative grid, best score
        MenuScreen::Main => 6 + 4 + 2,
        MenuScreen::Settings => 3,
    }
}

/// Area holding the menu items (inside the border)
fn menu_items_area(area: Rect, menu: &Menu) -> Rect {
    let (width, height) = menu_size(menu.screen);
    let menu_area = center_rect(area, width, height);
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(title_height(menu.screen)), Constraint::Min(8)])
        .split(menu_area);
    Block::default().borders(Borders::ALL).inner(layout[1])
}

/// Index of the menu item drawn at a terminal cell
pub fn menu_item_at(area: Rect, menu: &Menu, column: u16, row: u16) -> Option<usize> {
    let inner = menu_items_area(area, menu);
    if !contains(inner, column, row) || row <= inner.y {
        return None;
    }
    // Each item takes 2 rows (item + spacing), after 1 row of spacing
    let index = ((row - inner.y - 1) / 2) as usize;
    (index < menu.items.len()).then_some(index)
}

/// Render the main menu
pub fn render_menu(frame: &mut Frame, menu: &Menu, best_score: u64) {
    let area = frame.area();
    let (menu_width, menu_height) = menu_size(menu.screen);
    let menu_area = center_rect(area, menu_width, menu_height);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(title_height(menu.screen)), Constraint::Min(8)])
        .split(menu_area);

    match menu.screen {
        MenuScreen::Main => {
            let mut title_lines = vec![
                Line::styled("██████╗ ██╗      ██████╗ ██╗  ██╗██╗  ██╗", Style::default().fg(Color::Cyan)),
                Line::styled("██╔══██╗██║     ██╔═══██╗██║ ██╔╝██║ ██╔╝", Style::default().fg(Color::Cyan)),
                Line::styled("██████╔╝██║     ██║   ██║█████╔╝ █████╔╝ ", Style::default().fg(Color::Cyan)),
                Line::styled("██╔══██╗██║     ██║   ██║██╔═██╗ ██╔═██╗ ", Style::default().fg(Color::Cyan)),
                Line::styled("██████╔╝███████╗╚██████╔╝██║  ██╗██║  ██╗", Style::default().fg(Color::Cyan)),
                Line::styled("╚═════╝ ╚══════╝ ╚═════╝ ╚═╝  ╚═╝╚═╝  ╚═╝", Style::default().fg(Color::Cyan)),
            ];
            for row in MENU_PATTERN.chunks(4) {
                let spans: Vec<Span> = row
                    .iter()
                    .map(|cell| match cell {
                        Some(color) => Span::styled("██", Style::default().fg(color.color())),
                        None => Span::styled(EMPTY, Style::default().fg(Color::DarkGray)),
                    })
                    .collect();
                title_lines.push(Line::from(spans));
            }
            title_lines.push(Line::raw(""));
            if best_score > 0 {
                title_lines.push(Line::styled(
                    format!("Best: {}", best_score),
                    Style::default().fg(Color::Yellow).bold(),
                ));
            }
            let title = Paragraph::new(title_lines).alignment(Alignment::Center);
            frame.render_widget(title, layout[0]);
        }
        MenuScreen::Settings => {
            let title_lines = vec![
                Line::raw(""),
                Line::styled("SETTINGS", Style::default().fg(Color::Cyan).bold()),
            ];
            let title = Paragraph::new(title_lines).alignment(Alignment::Center);
            frame.render_widget(title, layout[0]);
        }
    }

    // Menu items
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(layout[1]);
    frame.render_widget(block, layout[1]);

    let mut lines = Vec::new();
    lines.push(Line::raw("")); // Spacing

    for (i, item) in menu.items.iter().enumerate() {
        lines.push(render_menu_item(item, i == menu.selected));
        lines.push(Line::raw("")); // Spacing between items
    }

    let hint = match menu.items.get(menu.selected).map(|item| &item.item_type) {
        Some(MenuItemType::Toggle { .. } | MenuItemType::Cycle { .. }) => "↑↓ Select  ←→ Adjust  Esc Back",
        _ => "↑↓ Select  Enter Confirm  Esc Back",
    };
    lines.push(Line::styled(hint, Style::default().fg(Color::DarkGray)));

    let menu_text = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(menu_text, inner);
}

/// Render a single menu item based on its type
fn render_menu_item(item: &MenuItem, is_selected: bool) -> Line<'static> {
    let prefix = if is_selected { "▶ " } else { "  " };

    let base_style = if is_selected {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default().fg(Color::White)
    };

    match &item.item_type {
        MenuItemType::Button(_) => Line::styled(format!("{}{}", prefix, item.label), base_style),
        MenuItemType::Toggle { value, .. } => {
            let value_str = if *value { "ON" } else { "OFF" };
            let value_color = if *value { Color::Green } else { Color::Red };
            Line::from(vec![
                Span::styled(format!("{}{}: ", prefix, item.label), base_style),
                Span::styled(format!("< {} >", value_str), Style::default().fg(value_color).bold()),
            ])
        }
        MenuItemType::Cycle { options, current, .. } => Line::from(vec![
            Span::styled(format!("{}{}: ", prefix, item.label), base_style),
            Span::styled(format!("< {} >", options[*current]), Style::default().fg(Color::Cyan)),
        ]),
    }
}

/// Render the entire game UI
pub fn render_game(frame: &mut Frame, game: &Game<impl Rng>, input: &InputHandler, effects: &Effects, settings: &Settings) {
    let area = frame.area();
    let layout = game_layout(area);
    let (block_char, _) = settings.visual.block_chars();

    let title = Paragraph::new(Line::styled("B L O K K", Style::default().fg(Color::Cyan).bold()))
        .alignment(Alignment::Center);
    frame.render_widget(title, layout.title);

    render_board(frame, &layout, game, input, effects, settings);
    render_stats(frame, layout.stats, game);

    for (slot, rect) in layout.tray.iter().enumerate() {
        let dragging = input.drag().is_some_and(|d| d.slot == slot);
        let selected = input.selected == Some(slot) && input.drag().is_none();
        render_tray_slot(frame, *rect, slot, game.tray().get(slot), selected, dragging, block_char);
    }

    let hint = Paragraph::new(Line::styled(
        "1-3 Pick  ←↑↓→ Move  Enter Place  Mouse Drag  R Restart  Esc Menu",
        Style::default().fg(Color::DarkGray),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(hint, layout.hint);

    render_particles(frame, layout.board_inner, effects);
    render_drag_ghost(frame, game, input, block_char);

    if let Some(text) = effects.banner() {
        render_banner(frame, layout.board, text);
    }

    if game.is_over() {
        render_game_over(frame, area, game.score().points, game.is_new_best());
    }
}

/// Render the game board
fn render_board(
    frame: &mut Frame,
    layout: &GameLayout,
    game: &Game<impl Rng>,
    input: &InputHandler,
    effects: &Effects,
    settings: &Settings,
) {
    let (block_char, ghost_char) = settings.visual.block_chars();

    let mut board_area = layout.board;
    if settings.effects.screen_shake {
        let shifted = board_area.x as i32 + effects.shake_offset() as i32;
        board_area.x = shifted.clamp(0, frame.area().right().saturating_sub(board_area.width) as i32) as u16;
    }

    let border_style = if effects.is_flashing() {
        Style::default().fg(Color::White).bold()
    } else {
        Style::default().fg(Color::Gray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(board_area);
    frame.render_widget(block, board_area);

    // Cells covered by the aimed-at piece, if it fits there
    let target = input.target(layout.board_inner, game.tray());
    let preview: Vec<(usize, usize, BlockColor)> = match target {
        Some((piece, row, col)) if settings.visual.show_preview && game.board().can_place(piece.shape, row, col) => piece
            .shape
            .cells()
            .map(|(r, c)| ((row + r as i32) as usize, (col + c as i32) as usize, piece.color))
            .collect(),
        _ => Vec::new(),
    };
    // Keyboard cursor, shown when nothing is being dragged
    let cursor = (input.drag().is_none() && !game.is_over()).then_some(input.cursor);

    let mut lines: Vec<Line> = Vec::new();
    for (row, cells) in game.board().rows() {
        let mut spans = Vec::new();
        for (col, cell) in cells.iter().enumerate() {
            let preview_color = preview
                .iter()
                .find(|&&(r, c, _)| r == row && c == col)
                .map(|&(_, _, color)| color);

            let (text, style) = if let Some(color) = effects.highlight_at(row, col) {
                ("▓▓", Style::default().fg(color.color()).bg(Color::White))
            } else if let Some(color) = preview_color {
                (ghost_char, Style::default().fg(color.color()))
            } else {
                match cell {
                    Cell::Filled(color) => (block_char, Style::default().fg(color.color())),
                    Cell::Empty => (EMPTY, Style::default().fg(Color::DarkGray)),
                }
            };

            let style = if cursor == Some((row as i32, col as i32)) {
                style.bg(Color::DarkGray)
            } else {
                style
            };
            spans.push(Span::styled(text, style));
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render stats panel
fn render_stats(frame: &mut Frame, area: Rect, game: &Game<impl Rng>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let score = game.score();
    let stat = |label: &'static str, value: String, color: Color| {
        [
            Line::from(Span::styled(label, Style::default().fg(Color::Gray))),
            Line::from(Span::styled(value, Style::default().fg(color).bold())),
        ]
    };

    let mut lines = Vec::new();
    lines.extend(stat("SCORE", score.points.to_string(), Color::Yellow));
    lines.extend(stat("MOVES", score.moves.to_string(), Color::Cyan));
    lines.extend(stat("LINES", score.lines.to_string(), Color::Green));
    lines.extend(stat("BEST", game.best_score().to_string(), Color::Magenta));

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

/// Render one tray slot
fn render_tray_slot(
    frame: &mut Frame,
    area: Rect,
    slot: usize,
    piece: Option<&Piece>,
    selected: bool,
    dragging: bool,
    block_char: &str,
) {
    let border_style = if selected {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default().fg(Color::Gray)
    };
    let block = Block::default()
        .title(format!(" {} ", slot + 1))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(border_style);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(piece) = piece {
        let style = if dragging {
            Style::default().fg(piece.color.color()).dim()
        } else {
            Style::default().fg(piece.color.color())
        };
        render_mini_piece(frame, inner, piece.shape, block_char, style);
    }
}

/// Render a piece centred in an area
fn render_mini_piece(frame: &mut Frame, area: Rect, shape: &Shape, block_char: &str, style: Style) {
    let rows = shape.rows() as u16;
    if area.height < rows || area.width < shape.cols() as u16 * CELL_WIDTH {
        return;
    }

    let lines: Vec<Line> = (0..shape.rows())
        .map(|r| {
            let spans: Vec<Span> = (0..shape.cols())
                .map(|c| {
                    if shape.is_filled(r, c) {
                        Span::styled(block_char.to_string(), style)
                    } else {
                        Span::raw("  ")
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let padded = Rect {
        y: area.y + (area.height - rows) / 2,
        height: rows,
        ..area
    };
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), padded);
}

/// Draw the dragged piece under the pointer
fn render_drag_ghost(frame: &mut Frame, game: &Game<impl Rng>, input: &InputHandler, block_char: &str) {
    let Some(drag) = input.drag() else {
        return;
    };
    let Some(piece) = game.tray().get(drag.slot) else {
        return;
    };

    let screen = frame.area();
    let (left, top) = drag_origin(piece.shape, drag.column, drag.row);
    let style = Style::default().fg(piece.color.color());

    for (r, c) in piece.shape.cells() {
        let x = left + c as i32 * CELL_WIDTH as i32;
        let y = top + r as i32;
        if x < screen.x as i32 || y < screen.y as i32 {
            continue;
        }
        let (x, y) = (x as u16, y as u16);
        if x + CELL_WIDTH > screen.right() || y >= screen.bottom() {
            continue;
        }
        frame.buffer_mut().set_string(x, y, block_char, style);
    }
}

/// Draw particles; they live in board-cell coordinates
fn render_particles(frame: &mut Frame, board_inner: Rect, effects: &Effects) {
    let screen = frame.area();
    for particle in effects.particles() {
        let x = board_inner.x as f32 + particle.x * CELL_WIDTH as f32;
        let y = board_inner.y as f32 + particle.y;
        if x < screen.x as f32 || y < screen.y as f32 {
            continue;
        }
        let (x, y) = (x as u16, y as u16);
        if x >= screen.right() || y >= screen.bottom() {
            continue;
        }
        let style = if particle.life < 0.3 {
            Style::default().fg(particle.color).dim()
        } else {
            Style::default().fg(particle.color)
        };
        frame.buffer_mut().set_string(x, y, particle.glyph(), style);
    }
}

/// Render the clear banner over the board
fn render_banner(frame: &mut Frame, board: Rect, text: &str) {
    let area = center_rect(board, board.width, 3);
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let paragraph = Paragraph::new(Line::styled(text.to_string(), Style::default().fg(Color::Yellow).bold()))
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Render the game over overlay
fn game_over_area(area: Rect) -> Rect {
    center_rect(area, 30, 8)
}

/// Whether (column, row) falls on the game-over overlay
pub fn game_over_contains(area: Rect, column: u16, row: u16) -> bool {
    contains(game_over_area(area), column, row)
}

fn render_game_over(frame: &mut Frame, area: Rect, final_score: u64, new_best: bool) {
    let overlay_area = game_over_area(area);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let mut lines = vec![
        Line::styled("GAME OVER", Style::default().fg(Color::Red).bold()),
        Line::raw(""),
        Line::styled(format!("Score: {}", final_score), Style::default().fg(Color::Yellow).bold()),
    ];
    if new_best {
        lines.push(Line::styled("New best!", Style::default().fg(Color::Magenta).bold()));
    } else {
        lines.push(Line::raw(""));
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled("Click/R Restart  Esc Menu", Style::default().fg(Color::Gray)));

    let paragraph = Paragraph::new(lines).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, overlay_area);
}
