mod app;
mod config;
mod constants;
mod llms;
mod logging;
mod ui;

use std::io;
use std::path::Path;
use std::sync::mpsc;

use crossterm::{
    ExecutableCommand,
    event::{DisableBracketedPaste, EnableBracketedPaste},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use ratatui::prelude::*;

use app::{App, State};
use bf_core::{GenerationOutcome, Session};
use config::Settings;
use constants::STORE_DIR;

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    logging::init();
    let settings = Settings::load(&args);
    info!("starting: api {} (offline: {})", settings.api_url, settings.offline);

    let client = match llms::get_client(&settings) {
        Ok(client) => client,
        Err(e) => {
            error!("cannot build generation client: {}", e);
            eprintln!("branchflow: {}", e);
            std::process::exit(1);
        }
    };

    // Panic hook: restore terminal state and log the panic to disk.
    // Without this, a panic leaves the terminal in raw mode + alternate screen.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = io::stdout().execute(DisableBracketedPaste);
        let _ = io::stdout().execute(LeaveAlternateScreen);

        let error_dir = Path::new(STORE_DIR).join("errors");
        let _ = std::fs::create_dir_all(&error_dir);
        let ts = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let backtrace = std::backtrace::Backtrace::force_capture();
        let msg = format!("[{}] {}\n\n{}\n\n---\n", ts, info, backtrace);
        let _ = std::fs::OpenOptions::new().create(true).append(true).open(error_dir.join("panic.log")).and_then(
            |mut f| {
                use std::io::Write;
                f.write_all(msg.as_bytes())
            },
        );

        default_hook(info);
    }));

    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    io::stdout().execute(EnableBracketedPaste)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let state = State::new(Session::default(), client.name(), settings.offline);
    let (tx, rx) = mpsc::channel::<GenerationOutcome>();

    let mut app = App::new(state, client);
    let result = app.run(&mut terminal, tx, rx);

    // Cleanup
    disable_raw_mode()?;
    io::stdout().execute(DisableBracketedPaste)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    log::logger().flush();
    result
}
