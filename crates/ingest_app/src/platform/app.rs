use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local};
use ingest_core::{update, AppState, Msg, Phase};
use ingest_engine::probe_file;
use ingest_logging::{ingest_info, ingest_warn, LogDestination};

use super::config::ClientConfig;
use super::effects::EffectRunner;
use super::input::{parse_command, Command, HELP};
use super::ui;

const LOG_FILENAME: &str = "ingest.log";
const TICK_INTERVAL: Duration = Duration::from_millis(75);

/// Everything the main loop reacts to, in arrival order.
pub enum AppEvent {
    Input(Command),
    InvalidInput(String),
    InputClosed,
    Core(Msg),
}

pub fn run_app() -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = ClientConfig::load(&cwd, |key| std::env::var(key).ok())?;

    let destination = if config.log_to_terminal {
        LogDestination::Both
    } else {
        LogDestination::File
    };
    if !ingest_logging::initialize(destination, &cwd.join(LOG_FILENAME)) {
        eprintln!("Warning: logging is disabled");
    }
    ingest_info!(
        "Starting: backend={} mode={:?} max_total_mb={}",
        config.backend_url,
        config.mode,
        config.max_total_mb
    );

    let (app_tx, app_rx) = mpsc::channel::<AppEvent>();
    let effects = EffectRunner::new(&config, app_tx.clone())?;
    spawn_input_reader(app_tx.clone());

    // Background tick to coalesce rendering.
    thread::spawn(move || {
        while app_tx.send(AppEvent::Core(Msg::Tick)).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });

    let mut shell = Shell::new(AppState::with_config(config.core()), effects);
    println!("{HELP}");
    shell.print_status();

    for event in app_rx {
        match event {
            AppEvent::Input(Command::Quit) | AppEvent::InputClosed => break,
            AppEvent::Input(command) => shell.handle_command(command),
            AppEvent::InvalidInput(reason) => println!("! {reason}"),
            AppEvent::Core(msg) => shell.dispatch_msg(msg),
        }
    }

    ingest_info!("Shutting down");
    Ok(())
}

fn spawn_input_reader(app_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let event = match line {
                Ok(line) => match parse_command(&line) {
                    Ok(Some(command)) => AppEvent::Input(command),
                    Ok(None) => continue,
                    Err(reason) => AppEvent::InvalidInput(reason),
                },
                Err(err) => {
                    ingest_warn!("stdin read failed: {}", err);
                    break;
                }
            };
            if app_tx.send(event).is_err() {
                return;
            }
        }
        let _ = app_tx.send(AppEvent::InputClosed);
    });
}

struct Shell {
    state: AppState,
    effects: EffectRunner,
    last_phase: Phase,
    finished_at: Option<DateTime<Local>>,
}

impl Shell {
    fn new(state: AppState, effects: EffectRunner) -> Self {
        Self {
            state,
            effects,
            last_phase: Phase::Idle,
            finished_at: None,
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Add(paths) => self.add_paths(paths),
            Command::Remove(index) => self.dispatch_msg(Msg::FileRemoved { index }),
            Command::Clear => self.dispatch_msg(Msg::BatchCleared),
            Command::Run => {
                if self.state.batch().is_empty() {
                    println!("! Add files first.");
                } else {
                    self.dispatch_msg(Msg::SubmitClicked);
                }
            }
            Command::ShowJson => println!("{}", ui::render::render_json(&self.state.view())),
            Command::ShowRaw => println!("{}", ui::render::render_raw(&self.state.view())),
            Command::ShowDetail => println!("{}", ui::render::render_detail(&self.state.view())),
            Command::Status => self.print_status(),
            Command::Help => println!("{HELP}"),
            Command::Quit => {}
        }
    }

    /// Unsupported or unreadable paths are reported and skipped; the rest
    /// are added as one batch.
    fn add_paths(&mut self, paths: Vec<PathBuf>) {
        let mut accepted = Vec::with_capacity(paths.len());
        for path in paths {
            match probe_file(&path) {
                Ok(candidate) => accepted.push(candidate),
                Err(err) => {
                    ingest_warn!("Skipping {:?}: {}", path, err);
                    println!("! {err}");
                }
            }
        }
        if !accepted.is_empty() {
            self.dispatch_msg(Msg::FilesAdded(accepted));
        }
    }

    fn dispatch_msg(&mut self, msg: Msg) {
        let render_now = matches!(msg, Msg::Tick);
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.effects.enqueue(effects);
        self.track_phase();

        if render_now && self.state.consume_dirty() {
            self.print_status();
        }
    }

    fn track_phase(&mut self) {
        let phase = self.state.run().phase();
        if phase == self.last_phase {
            return;
        }
        ingest_info!("Phase {} -> {}", self.last_phase.as_str(), phase.as_str());
        self.finished_at = matches!(phase, Phase::Done | Phase::Error).then(Local::now);
        self.last_phase = phase;
    }

    fn print_status(&self) {
        for line in ui::render::render(&self.state.view(), self.finished_at) {
            println!("{line}");
        }
    }
}
