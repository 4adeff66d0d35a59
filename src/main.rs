use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::style::Print;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::{backend::CrosstermBackend, Terminal};
use snake::build_info;
use snake::config::{self, Command, GameConfig};
use snake::core::{Board, Difficulty, SystemScheduler, TickEngine, TickEvent};
use snake::input::{map_key_event, InputEvent, InputSender, KeyAction, SwipeTracker};
use snake::preferences::Preferences;
use snake::scores::ScoreTracker;
use snake::store::LocalStore;
use snake::ui::draw_ui;
use snake::utils::init_logging;
use std::io;
use std::time::Duration;
use tracing::{info, warn};

/// Upper bound on how long the loop sleeps between frames.
const FRAME_MS: u64 = 16;

type Backend = CrosstermBackend<io::Stdout>;

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let (game_config, log) = match config::parse_args(&args, GameConfig::load()) {
        Ok(Command::Play { config, log }) => (config, log),
        Ok(Command::Version) => {
            println!("{}", build_info::version_line());
            std::process::exit(0);
        }
        Ok(Command::Help) => {
            println!("{}", config::USAGE);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Run 'snake --help' for usage.");
            std::process::exit(1);
        }
    };

    let board = match game_config.board() {
        Ok(board) => board,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if let Some(path) = init_logging(log)? {
        info!(path = %path.display(), version = %build_info::version_line(), "logging enabled");
    }

    let store = LocalStore::open_default();
    let scores = ScoreTracker::load(Box::new(store.clone()));
    let mut preferences = Preferences::load(Box::new(store));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(
        &mut terminal,
        board,
        game_config.difficulty,
        scores,
        &mut preferences,
    );

    // Restore terminal
    disable_raw_mode()?;
    terminal.backend_mut().execute(DisableMouseCapture)?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run(
    terminal: &mut Terminal<Backend>,
    board: Board,
    difficulty: Difficulty,
    scores: ScoreTracker,
    preferences: &mut Preferences,
) -> io::Result<()> {
    let (mut engine, input) = TickEngine::new(
        board,
        difficulty,
        SystemScheduler::new(),
        rand::thread_rng(),
        scores,
    );
    let mut swipe = SwipeTracker::default();

    loop {
        let snapshot = engine.snapshot();
        terminal.draw(|frame| draw_ui(frame, &snapshot, preferences.muted()))?;

        let wait = engine
            .time_until_next_tick()
            .map_or(FRAME_MS, |ms| ms.min(FRAME_MS));

        if event::poll(Duration::from_millis(wait))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    match map_key_event(key) {
                        KeyAction::Game(event) => send(&input, event),
                        KeyAction::ToggleMute => {
                            let muted = preferences.toggle_mute();
                            info!(muted, "sound toggled");
                        }
                        KeyAction::Quit => break,
                        KeyAction::None => {}
                    }
                }
                Event::Mouse(mouse) => {
                    if let Some(direction) = swipe.track(mouse) {
                        send(&input, InputEvent::Turn(direction));
                    }
                }
                _ => {}
            }
        }

        for event in engine.pump() {
            let cue = matches!(event, TickEvent::AteFood { .. } | TickEvent::GameOver { .. });
            if cue && !preferences.muted() {
                terminal.backend_mut().execute(Print('\x07'))?;
            }
        }
    }

    Ok(())
}

fn send(input: &InputSender, event: InputEvent) {
    if !input.send(event) {
        warn!(?event, "engine input channel closed");
    }
}
