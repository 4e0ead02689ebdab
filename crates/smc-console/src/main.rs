mod app;
mod config;
mod logging;
mod theme;
mod transport;
mod ui;

use anyhow::{Context, Result};
use app::{Action, App, AppEvent};
use clap::Parser;
use config::{load_config, Args, Config};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use smc_core::LinkCommand;
use std::{io, sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tracing::{info, warn};
use transport::Backend;

const UI_REFRESH_MS: u64 = 250;
const EVENT_QUEUE_CAPACITY: usize = 256;
const LINK_QUEUE_CAPACITY: usize = 16;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args)?;
    let _log_guard = logging::init_logging(&config);

    let backend = Arc::new(Backend::new(config.endpoints.clone())?);
    if config.check {
        return check(&backend).await;
    }
    run(config, backend).await
}

async fn check(backend: &Backend) -> Result<()> {
    let url = backend.endpoints().health_url();
    let body = backend
        .check_health()
        .await
        .with_context(|| format!("health check against {url} failed"))?;
    println!("{url}: {body}");
    Ok(())
}

/// Spawns the transports and hands their results to the UI loop.
struct Dispatcher {
    backend: Arc<Backend>,
    events: mpsc::Sender<AppEvent>,
    link_commands: mpsc::Sender<LinkCommand>,
}

impl Dispatcher {
    fn dispatch(&self, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::Link(command) => {
                    if let Err(err) = self.link_commands.try_send(command) {
                        warn!("link_command_dropped: {err}");
                    }
                }
                Action::File(request) => {
                    let backend = self.backend.clone();
                    let events = self.events.clone();
                    tokio::spawn(async move {
                        let result = backend.execute(&request).await;
                        let _ = events.send(AppEvent::File { request, result }).await;
                    });
                }
                Action::ReadLocal(path) => {
                    let events = self.events.clone();
                    tokio::spawn(async move {
                        let result = transport::read_local_file(&path).await;
                        let _ = events.send(AppEvent::LocalFile { path, result }).await;
                    });
                }
            }
        }
    }
}

async fn run(config: Config, backend: Arc<Backend>) -> Result<()> {
    info!("console_start: {}", config.endpoints.base());
    let (event_tx, mut event_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    let (link_tx, link_rx) = mpsc::channel(LINK_QUEUE_CAPACITY);
    tokio::spawn(transport::telemetry_loop(
        backend.clone(),
        event_tx.clone(),
        link_rx,
    ));
    let dispatcher = Dispatcher {
        backend,
        events: event_tx,
        link_commands: link_tx,
    };

    let mut app = App::new(config.timing, config.endpoints.base().to_string());
    dispatcher.dispatch(app.start());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let result = event_loop(&mut terminal, &mut app, &dispatcher, &mut event_rx).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!("console_stop");
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    dispatcher: &Dispatcher,
    event_rx: &mut mpsc::Receiver<AppEvent>,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut ui_ticker = tokio::time::interval(Duration::from_millis(UI_REFRESH_MS));

    loop {
        terminal.draw(|frame| ui::render_ui(frame, app))?;
        tokio::select! {
            _ = ui_ticker.tick() => {}
            Some(event) = event_rx.recv() => {
                dispatcher.dispatch(app.apply_event(event));
            }
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        dispatcher.dispatch(app.handle_key(key));
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return Err(err.into()),
                    None => return Ok(()),
                }
            }
        }
        if app.should_quit() {
            return Ok(());
        }
    }
}
