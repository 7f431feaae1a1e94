pub mod ui;

use std::{
    error::Error,
    fs::File,
    io::{self, stdin},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use aimr::{
    config::{Config, ConfigStore, FileConfigStore},
    cursor::InputMode,
    engine::{Engine, EngineEvent},
    geometry::{Arena, Point},
    mode::{FlickDifficulty, GameMode, TrackingPattern},
    reflex::{Calibrator, FixedCalibration, SchedulerGapCalibrator},
    runtime::{AimEvent, AimEventSource, CrosstermEventSource, FixedTicker, Runner, Ticker},
    session::{Hud, HudStat, SessionSettings, Summary},
    target::TargetGeometry,
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::{info, warn};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Frame, Terminal,
};

use crate::ui::screen::current_screen;

const TICK_RATE_MS: u64 = 16;
/// Arena pixels covered by one terminal cell
pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;
/// HUD line above the arena
const HUD_ROWS: u16 = 1;
/// key legend below the arena
const FOOTER_ROWS: u16 = 1;

/// terminal aim trainer: click, flick, track and react
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal aim trainer driven by the mouse. Six drills (standard, quick scope, moving, flick, tracking and a reaction-time test) with live score, accuracy and streak tracking. Flags override the settings remembered from the last run."
)]
pub struct Cli {
    /// drill to start with
    #[clap(short = 'm', long, value_enum)]
    mode: Option<GameMode>,

    /// session length in seconds (the reflex drill is not timed)
    #[clap(short = 'd', long)]
    duration: Option<u32>,

    /// seconds a target stays up before it counts as a miss, 0 to disable
    #[clap(short = 'l', long)]
    lifetime: Option<f64>,

    /// moving-target speed in pixels per 16ms frame
    #[clap(long)]
    speed: Option<f64>,

    /// flick placement difficulty
    #[clap(long, value_enum)]
    difficulty: Option<FlickDifficulty>,

    /// tracking path
    #[clap(long, value_enum)]
    pattern: Option<TrackingPattern>,

    /// seed target placement for a reproducible session
    #[clap(long)]
    seed: Option<u64>,

    /// append logs to this file; the level comes from RUST_LOG (default info)
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Overlay the flags that were given on top of the stored settings
    fn apply(&self, mut settings: SessionSettings) -> SessionSettings {
        if let Some(mode) = self.mode {
            settings.mode = mode;
        }
        if let Some(duration) = self.duration {
            settings.duration_secs = duration;
        }
        if let Some(lifetime) = self.lifetime {
            settings.mode_config.target_lifetime_secs = lifetime;
        }
        if let Some(speed) = self.speed {
            settings.mode_config.moving_speed = speed;
        }
        if let Some(difficulty) = self.difficulty {
            settings.mode_config.flick_difficulty = difficulty;
        }
        if let Some(pattern) = self.pattern {
            settings.mode_config.tracking_pattern = pattern;
        }
        settings
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Playing,
    Summary,
}

pub struct App {
    pub engine: Engine,
    pub settings: SessionSettings,
    pub state: AppState,
    pub hud: Hud,
    pub target: Option<TargetGeometry>,
    pub summary: Option<Summary>,
    /// why the last start or session failed, shown instead of the arena
    pub fault: Option<String>,
    /// terminal area the arena is drawn into
    pub arena_area: Rect,
    /// the engine asked for a locked pointer; mouse motion is fed as deltas
    lock_requested: bool,
    last_mouse: Option<Point>,
    second_ms: f64,
}

/// Terminal area left for the arena once HUD and footer are placed
pub fn arena_area(width: u16, height: u16) -> Rect {
    Rect::new(
        0,
        HUD_ROWS,
        width,
        height.saturating_sub(HUD_ROWS + FOOTER_ROWS),
    )
}

pub fn arena_for(area: Rect) -> Arena {
    Arena::new(
        area.width as f64 * CELL_WIDTH_PX,
        area.height as f64 * CELL_HEIGHT_PX,
    )
}

impl App {
    pub fn new(
        settings: SessionSettings,
        seed: Option<u64>,
        calibration_ms: f64,
        width: u16,
        height: u16,
    ) -> Self {
        let area = arena_area(width, height);
        let mut engine =
            Engine::new(arena_for(area)).with_calibrator(FixedCalibration(calibration_ms));
        if let Some(seed) = seed {
            engine = engine.with_seed(seed);
        }
        let hud = engine.hud();

        let mut app = Self {
            engine,
            settings,
            state: AppState::Playing,
            hud,
            target: None,
            summary: None,
            fault: None,
            arena_area: area,
            lock_requested: false,
            last_mouse: None,
            second_ms: 0.0,
        };
        app.start();
        app
    }

    pub fn start(&mut self) {
        self.state = AppState::Playing;
        self.summary = None;
        self.fault = None;
        self.target = None;
        self.lock_requested = false;
        self.last_mouse = None;
        self.second_ms = 0.0;

        if let Err(e) = self.engine.start_session(self.settings) {
            warn!("could not start {}: {e}", self.settings.mode);
            self.fault = Some(e.to_string());
        }
        self.pump();
    }

    pub fn stop(&mut self) {
        self.engine.stop_session();
        self.pump();
    }

    pub fn next_mode(&mut self) {
        self.settings.mode = self.settings.mode.next();
        self.start();
    }

    /// Move the engine clock forward by real elapsed time
    pub fn advance(&mut self, elapsed: Duration) {
        let ms = elapsed.as_micros() as f64 / 1000.0;
        if ms <= 0.0 {
            return;
        }
        self.engine.tick(ms);
        if self.engine.is_active() {
            self.second_ms += ms;
            while self.second_ms >= 1000.0 && self.engine.is_active() {
                self.second_ms -= 1000.0;
                self.engine.second_tick();
            }
        }
        self.pump();
    }

    pub fn on_resize(&mut self, width: u16, height: u16) {
        self.arena_area = arena_area(width, height);
        self.engine.resize(arena_for(self.arena_area));
        self.last_mouse = None;
        self.pump();
    }

    /// Arena pixel under the center of a terminal cell, clamped to the arena
    pub fn cell_to_point(&self, column: u16, row: u16) -> Point {
        let area = self.arena_area;
        let col = column.min(area.right().saturating_sub(1)).max(area.x) - area.x;
        let row = row.min(area.bottom().saturating_sub(1)).max(area.y) - area.y;
        Point::new(
            (col as f64 + 0.5) * CELL_WIDTH_PX,
            (row as f64 + 0.5) * CELL_HEIGHT_PX,
        )
    }

    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        let point = self.cell_to_point(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => self.pointer(point),
            MouseEventKind::Down(MouseButton::Left) => {
                self.pointer(point);
                self.engine.on_click(point.x, point.y);
            }
            _ => {}
        }
        self.pump();
    }

    fn pointer(&mut self, point: Point) {
        if !self.lock_requested {
            self.last_mouse = None;
            self.engine.on_pointer_move(point.x, point.y);
            return;
        }
        // emulated lock: granted on the first motion after the request
        if self.engine.cursor().input_mode != InputMode::Relative {
            self.engine.on_lock_acquired();
        }
        if let Some(last) = self.last_mouse {
            self.engine.on_pointer_delta(point.x - last.x, point.y - last.y);
        }
        self.last_mouse = Some(point);
    }

    /// Returns true when the app should quit
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('s') => self.stop(),
            KeyCode::Char('r') => self.start(),
            KeyCode::Char('m') => self.next_mode(),
            _ => {}
        }
        false
    }

    fn pump(&mut self) {
        for event in self.engine.drain_events() {
            match event {
                EngineEvent::Hud(hud) => self.hud = hud,
                EngineEvent::Target(geometry) => self.target = Some(geometry),
                EngineEvent::TargetRemoved => self.target = None,
                EngineEvent::LockRequested => self.lock_requested = true,
                EngineEvent::LockReleased => {
                    self.lock_requested = false;
                    self.last_mouse = None;
                }
                EngineEvent::SessionEnded(summary) => {
                    self.summary = Some(summary);
                    self.state = AppState::Summary;
                }
                EngineEvent::Fault(message) => self.fault = Some(message),
            }
        }
    }

    pub fn reflex_round(&self) -> Option<u8> {
        match self.hud.stat {
            HudStat::Reflex { round, .. } => Some(round),
            _ => None,
        }
    }
}

fn init_logging(path: &Path) -> Result<(), Box<dyn Error>> {
    let file = File::options().create(true).append(true).open(path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let store = FileConfigStore::new();
    let settings = cli.apply(store.load().to_settings_or_default());
    if let Err(e) = settings.validate() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::ValueValidation, e).exit();
    }
    if let Err(e) = store.save(&Config::from(&settings)) {
        warn!("could not save settings to {}: {e}", store.path().display());
    }

    // the gap measurement sleeps, so it runs before the event loop starts
    let calibration_ms = SchedulerGapCalibrator::default().measure();

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let mut app = App::new(settings, cli.seed, calibration_ms, size.width, size.height);
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: AimEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    let mut last = Instant::now();
    terminal.draw(|f| ui(app, f))?;

    loop {
        let event = runner.step();

        // the clock moves before input is applied so clicks are stamped precisely
        let now = Instant::now();
        app.advance(now - last);
        last = now;

        match event {
            AimEvent::Tick => {}
            AimEvent::Resize(width, height) => app.on_resize(width, height),
            AimEvent::Mouse(mouse) => app.on_mouse(mouse),
            AimEvent::Key(key) => {
                if app.on_key(key) {
                    break;
                }
            }
        }
        terminal.draw(|f| ui(app, f))?;
    }

    info!("quitting");
    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    current_screen(&app.state).render(app, f);
}
