//! BLOKK - an 8x8 block puzzle for the terminal
//!
//! Drag pieces from the tray onto the board, fill rows and columns to
//! clear them, and keep going until nothing fits.

mod board;
mod effects;
mod game;
mod generator;
mod highscore;
mod input;
mod menu;
mod piece;
mod score;
mod settings;
mod shapes;
mod ui;

use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use effects::Effects;
use game::{Game, GameEvent};
use highscore::{BestScoreFile, BestScoreStore, MemoryStore};
use input::{InputHandler, PlayAction};
use menu::{Menu, MenuAction, MenuItemType, MenuScreen};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use score::Score;
use settings::Settings;
use std::{
    io::{self, stdout},
    time::{Duration, Instant},
};

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Seed for the piece generator (same seed, same deals)
    #[arg(long)]
    seed: Option<u64>,

    /// Reset the stored best score to 0 before starting
    #[arg(long)]
    reset_best: bool,

    /// Do not write the best score to disk
    #[arg(long)]
    no_save: bool,
}

/// Application state
enum AppState {
    Menu(Menu),
    Playing(Game, InputHandler, Effects),
}

/// What the app loop should do after handling an event
enum Transition {
    Stay,
    StartGame,
    ToMenu,
    Quit,
}

/// Get the blokk temp directory, creating it if needed
fn blokk_temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("blokk");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    let session_id: u32 = rand::random();
    let log_dir = blokk_temp_dir();
    let log_file = format!("{:08x}.log", session_id);

    // Setup tracing to log file
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("blokk=debug")),
        )
        .with_ansi(false)
        .init();

    tracing::info!("BLOKK starting up, session={:08x}, log={}", session_id, log_dir.join(&log_file).display());

    if args.reset_best && !args.no_save {
        match BestScoreFile::new().save_best_score(0) {
            Ok(()) => tracing::info!("Best score reset"),
            Err(e) => eprintln!("Warning: Could not reset best score: {}", e),
        }
    }

    let mut settings = Settings::load();

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut settings, &args);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen, DisableMouseCapture)?;

    if let Err(e) = settings.save() {
        eprintln!("Warning: Could not save settings: {}", e);
    }

    match &result {
        Ok(last) => {
            println!("\nThanks for playing BLOKK!");
            if let Some(score) = last {
                println!("Final Score: {}", score.points);
                println!("Moves: {} | Lines: {}", score.moves, score.lines);
            }
        }
        Err(e) => tracing::error!("Exiting on error: {}", e),
    }

    result.map(|_| ())
}

/// Best score when the app starts
fn initial_best_score(args: &Args) -> u64 {
    if args.reset_best {
        0
    } else {
        BestScoreFile::new().load_best_score()
    }
}

/// Best-score store for a new game. Without saving, the store starts from
/// the best score reached so far in this run.
fn open_store(args: &Args, session_best: u64) -> Box<dyn BestScoreStore> {
    if args.no_save {
        Box::new(MemoryStore::new(session_best))
    } else {
        Box::new(BestScoreFile::new())
    }
}

fn new_game(args: &Args, session_best: u64) -> Game {
    match args.seed {
        Some(seed) => Game::with_seed(seed, open_store(args, session_best)),
        None => Game::new(open_store(args, session_best)),
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    settings: &mut Settings,
    args: &Args,
) -> io::Result<Option<Score>> {
    let mut state = AppState::Menu(Menu::new());
    let mut best_score = initial_best_score(args);
    let mut last_score: Option<Score> = None;
    let mut last_frame = Instant::now();

    loop {
        // Render
        terminal.draw(|frame| match &state {
            AppState::Menu(menu) => ui::render_menu(frame, menu, best_score),
            AppState::Playing(game, input, effects) => ui::render_game(frame, game, input, effects, settings),
        })?;

        // Handle input
        if event::poll(FRAME_DURATION)? {
            let size = terminal.size()?;
            let area = Rect::new(0, 0, size.width, size.height);

            let transition = match (event::read()?, &mut state) {
                (Event::Key(key), _) if key.kind != KeyEventKind::Press => Transition::Stay,
                (Event::Key(key), _) if is_interrupt(key) => Transition::Quit,
                (Event::Key(key), AppState::Menu(menu)) => handle_menu_key(menu, key.code, settings),
                (Event::Key(key), AppState::Playing(game, input, effects)) => match input.key_down(key) {
                    Some(action) => handle_play_action(game, input, effects, action),
                    None => Transition::Stay,
                },
                (Event::Mouse(mouse), AppState::Menu(menu)) => handle_menu_mouse(menu, mouse, area, settings),
                (Event::Mouse(mouse), AppState::Playing(game, input, effects)) => {
                    match handle_game_mouse(game, input, mouse, area) {
                        Some(action) => handle_play_action(game, input, effects, action),
                        None => Transition::Stay,
                    }
                }
                _ => Transition::Stay,
            };

            match transition {
                Transition::Stay => {}
                Transition::StartGame => {
                    let game = new_game(args, best_score);
                    let input = InputHandler::from_settings(settings);
                    let effects = Effects::new(settings.effects.particles);
                    state = AppState::Playing(game, input, effects);
                }
                Transition::ToMenu => {
                    if let AppState::Playing(game, _, _) = &state {
                        best_score = game.best_score();
                        last_score = Some(game.score().clone());
                    }
                    state = AppState::Menu(Menu::new());
                }
                Transition::Quit => {
                    if let AppState::Playing(game, _, _) = &state {
                        best_score = game.best_score();
                        last_score = Some(game.score().clone());
                    }
                    return Ok(last_score);
                }
            }
        }

        // Update game state
        let now = Instant::now();
        let dt = now - last_frame;
        last_frame = now;

        if let AppState::Playing(game, input, effects) = &mut state {
            for event in game.drain_events() {
                match event {
                    GameEvent::LinesCleared(clear) => effects.trigger(&clear, &mut rand::thread_rng()),
                    GameEvent::GameOver { final_score, new_best } => {
                        input.end_drag();
                        tracing::info!("Session ended with {} points (new best: {})", final_score, new_best);
                    }
                    _ => {}
                }
            }
            input.sync_selection(game.tray());
            if effects.is_active() {
                effects.update(dt);
            }
        }
    }
}

fn is_interrupt(key: KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

fn save_settings(settings: &Settings) {
    if let Err(e) = settings.save() {
        tracing::warn!("Could not save settings: {}", e);
    }
}

fn apply_menu_action(menu: &mut Menu, action: MenuAction, settings: &Settings) -> Transition {
    match action {
        MenuAction::StartGame => Transition::StartGame,
        MenuAction::GoToScreen(screen) => {
            menu.go_to(screen, settings);
            Transition::Stay
        }
        MenuAction::Back => {
            save_settings(settings);
            menu.go_back(settings);
            Transition::Stay
        }
        MenuAction::Quit => Transition::Quit,
    }
}

/// Handle key presses in the menu
fn handle_menu_key(menu: &mut Menu, code: KeyCode, settings: &mut Settings) -> Transition {
    match code {
        KeyCode::Up | KeyCode::Char('k') => menu.move_up(),
        KeyCode::Down | KeyCode::Char('j') => menu.move_down(),
        KeyCode::Left | KeyCode::Char('h') => menu.adjust_left(settings),
        KeyCode::Right | KeyCode::Char('l') => menu.adjust_right(settings),
        KeyCode::Enter | KeyCode::Char(' ') => match menu.select() {
            Some(action) => return apply_menu_action(menu, action, settings),
            None => menu.adjust_right(settings),
        },
        KeyCode::Char('q') | KeyCode::Esc => {
            if menu.screen == MenuScreen::Main {
                return Transition::Quit;
            }
            return apply_menu_action(menu, MenuAction::Back, settings);
        }
        _ => {}
    }
    Transition::Stay
}

/// Handle mouse events in the menu
fn handle_menu_mouse(menu: &mut Menu, mouse: MouseEvent, area: Rect, settings: &mut Settings) -> Transition {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let Some(index) = ui::menu_item_at(area, menu, mouse.column, mouse.row) else {
                return Transition::Stay;
            };
            menu.selected = index;
            match &menu.items[index].item_type {
                MenuItemType::Button(action) => {
                    let action = *action;
                    apply_menu_action(menu, action, settings)
                }
                MenuItemType::Toggle { .. } | MenuItemType::Cycle { .. } => {
                    // Toggle/adjust on click
                    menu.adjust_right(settings);
                    Transition::Stay
                }
            }
        }
        MouseEventKind::Moved => {
            // Highlight on hover
            if let Some(index) = ui::menu_item_at(area, menu, mouse.column, mouse.row) {
                menu.selected = index;
            }
            Transition::Stay
        }
        MouseEventKind::ScrollUp => {
            menu.move_up();
            Transition::Stay
        }
        MouseEventKind::ScrollDown => {
            menu.move_down();
            Transition::Stay
        }
        _ => Transition::Stay,
    }
}

/// Apply a key action while playing
fn handle_play_action(game: &mut Game, input: &mut InputHandler, effects: &mut Effects, action: PlayAction) -> Transition {
    match action {
        PlayAction::SelectSlot(slot) => {
            if game.tray().get(slot).is_some() {
                input.select(slot);
            }
        }
        PlayAction::NextSlot => input.select_next(game.tray()),
        PlayAction::MoveCursor(dr, dc) => input.move_cursor(dr, dc),
        PlayAction::Place => {
            if let Some(slot) = input.selected {
                let (row, col) = input.cursor;
                game.attempt_placement(slot, row, col);
            }
        }
        PlayAction::Restart => {
            game.restart();
            input.reset();
            effects.reset();
        }
        PlayAction::Quit => return Transition::ToMenu,
    }
    Transition::Stay
}

/// Handle mouse drag-and-drop and board clicks while playing. Returns an
/// action for clicks that stand in for a key.
fn handle_game_mouse(game: &mut Game, input: &mut InputHandler, mouse: MouseEvent, area: Rect) -> Option<PlayAction> {
    if game.is_over() {
        return game_over_click(mouse, area);
    }
    let layout = ui::game_layout(area);
    let (column, row) = (mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(slot) = layout.tray_slot_at(column, row) {
                if game.tray().get(slot).is_some() {
                    input.start_drag(slot, column, row);
                }
            } else if layout.on_board(column, row) {
                // Click places the selected piece centred on the pointer
                let piece = input.selected.and_then(|slot| game.tray().get(slot).copied())?;
                if let Some((r, c)) = input::pointer_to_anchor(layout.board_inner, piece.shape, column, row) {
                    input.cursor = (r, c);
                    game.attempt_placement(piece.slot, r, c);
                }
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => input.update_drag(column, row),
        MouseEventKind::Up(MouseButton::Left) => {
            input.update_drag(column, row);
            let drag = input.end_drag()?;
            let piece = game.tray().get(drag.slot).copied()?;
            // Dropping off the board returns the piece to the tray
            if let Some((r, c)) = input::pointer_to_anchor(layout.board_inner, piece.shape, drag.column, drag.row) {
                if !game.attempt_placement(drag.slot, r, c) {
                    tracing::debug!("Dropped slot {} where it does not fit", drag.slot);
                }
            }
        }
        _ => {}
    }
    None
}

/// A left click on the game-over overlay restarts
fn game_over_click(mouse: MouseEvent, area: Rect) -> Option<PlayAction> {
    let clicked = mouse.kind == MouseEventKind::Down(MouseButton::Left)
        && ui::game_over_contains(area, mouse.column, mouse.row);
    clicked.then_some(PlayAction::Restart)
}
