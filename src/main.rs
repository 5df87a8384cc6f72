mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use reflex::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore, MAX_TARGET_COUNT, TARGET_KEYS},
    high_score::{HighScoreStore, MemoryHighScoreStore, SqliteHighScoreStore},
    runtime::{CrosstermEventSource, FixedTicker, Runner, TermEvent},
    target::TargetId,
    InputEvent, Mode, SessionController, SessionEvent, SessionState,
};
use std::{
    error::Error,
    fs::OpenOptions,
    io::{self, stdin},
    time::Duration,
};

/// reaction-speed target game: strike the armed target before time runs out
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A reaction game for the terminal. Targets sit in a ring; one is armed at a time. Press its key before the clock runs out to score, then chase the next one."
)]
pub struct Cli {
    /// session length in seconds (also selects which best score is tracked)
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// number of targets in the ring
    #[clap(short = 't', long, value_parser = clap::value_parser!(u16).range(2..=MAX_TARGET_COUNT as i64))]
    targets: Option<u16>,

    /// print the best score for every mode and exit
    #[clap(long)]
    show_best: bool,

    /// clear the best score of a mode and exit
    #[clap(long, value_enum, value_name = "MODE")]
    reset_best: Option<Mode>,
}

type Controller = SessionController<Box<dyn HighScoreStore>>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionResult {
    pub final_score: u32,
    pub is_new_record: bool,
    pub mode: Mode,
}

pub struct App {
    pub controller: Controller,
    /// Mode used for the next start
    pub mode: Mode,
    pub last_result: Option<SessionResult>,
    pub bests: [(Mode, u32); 2],
    config: Config,
    config_store: FileConfigStore,
}

impl App {
    pub fn new(controller: Controller, config: Config, config_store: FileConfigStore) -> Self {
        let mut app = Self {
            controller,
            mode: config.mode,
            last_result: None,
            bests: Mode::ALL.map(|m| (m, 0)),
            config,
            config_store,
        };
        app.refresh_bests();
        app
    }

    pub fn best(&self, mode: Mode) -> u32 {
        self.bests
            .iter()
            .find(|(m, _)| *m == mode)
            .map_or(0, |(_, best)| *best)
    }

    fn refresh_bests(&mut self) {
        for entry in self.bests.iter_mut() {
            entry.1 = self.controller.best(entry.0);
        }
    }

    fn toggle_mode(&mut self) {
        self.mode = self.mode.toggle();
        self.config.mode = self.mode;
        if let Err(e) = self.config_store.save(&self.config) {
            log::warn!("could not save config: {e}");
        }
    }

    fn reset_best(&mut self) {
        if let Err(e) = self.controller.clear_best(self.mode) {
            log::warn!("could not clear {} record: {e}", self.mode);
        }
        self.refresh_bests();
    }

    /// Maps a key press to controller input. Returns false when the app should quit.
    fn on_key(&mut self, key: KeyEvent, inputs: &mut Vec<InputEvent>) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return false;
        }

        let running = matches!(
            self.controller.state(),
            SessionState::Countdown | SessionState::Active
        );
        match key.code {
            KeyCode::Esc if running => inputs.push(InputEvent::RequestAbort),
            KeyCode::Esc => return false,
            KeyCode::Enter if !running => inputs.push(InputEvent::RequestStart(self.mode)),
            KeyCode::Tab if !running => self.toggle_mode(),
            KeyCode::Delete if !running => self.reset_best(),
            KeyCode::Char(c) => {
                if let Some(target) = target_for_key(c, self.controller.target_count()) {
                    inputs.push(InputEvent::TargetStruck(target));
                }
            }
            _ => {}
        }
        true
    }

    fn on_session_events(&mut self, events: &[SessionEvent]) {
        for event in events {
            match *event {
                SessionEvent::SessionEnded {
                    final_score,
                    is_new_record,
                    mode,
                } => {
                    self.last_result = Some(SessionResult {
                        final_score,
                        is_new_record,
                        mode,
                    });
                    self.refresh_bests();
                }
                SessionEvent::CountdownTick(_) => self.last_result = None,
                _ => {}
            }
        }
    }
}

pub fn target_for_key(c: char, target_count: usize) -> Option<TargetId> {
    TARGET_KEYS
        .chars()
        .take(target_count)
        .position(|k| k == c.to_ascii_lowercase())
}

pub fn key_for_target(target: TargetId) -> char {
    TARGET_KEYS.chars().nth(target).unwrap_or('?')
}

fn init_logging() {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    // stderr belongs to the TUI, so logs only go to a file
    let log_file = AppDirs::log_path().and_then(|path| {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok()?;
        }
        OpenOptions::new().create(true).append(true).open(path).ok()
    });
    match log_file {
        Some(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    let _ = builder.try_init();
}

fn open_store() -> Box<dyn HighScoreStore> {
    match SqliteHighScoreStore::new() {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("high scores will not be saved: {e}");
            Box::new(MemoryHighScoreStore::new())
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Some(targets) = cli.targets {
        config.target_count = targets as usize;
    }
    if let Err(e) = config.validate() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::InvalidValue, e).exit();
    }

    let mut store = open_store();

    if let Some(mode) = cli.reset_best {
        store.clear(mode)?;
        println!("cleared {mode} best");
        return Ok(());
    }
    if cli.show_best {
        for mode in Mode::ALL {
            println!("{mode}: {}", store.get(mode)?);
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if cli.mode.is_some() {
        config_store.save(&config)?;
    }

    let controller = SessionController::new(config.session_config(), store)?;
    let tick_rate = Duration::from_millis(config.tick_rate_ms);
    let mut app = App::new(controller, config, config_store);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, tick_rate);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(CrosstermEventSource::new(), FixedTicker::new(tick_rate));

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        let frame = runner.next_frame();
        let mut inputs = Vec::new();
        for event in frame.events {
            match event {
                TermEvent::Key(key) => {
                    if !app.on_key(key, &mut inputs) {
                        app.controller.request_abort();
                        return Ok(());
                    }
                }
                TermEvent::Resize => {}
            }
        }

        let events = app.controller.step(frame.elapsed, inputs);
        app.on_session_events(&events);
    }
}
