use anyhow::{Context, Result};
use clap::Parser;
use cortex_browser::{
    config::{default_config_path, load_config},
    state::App,
    ui, BrowserConfig, FetchOutcome, FieldRegistry, Navigator, NavigatorSettings,
};
use cortex_core::ApiClient;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    fs::OpenOptions,
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "cortex-browser", about = "Browse users, snapshots and snapshot fields")]
struct Args {
    /// API server address
    #[arg(long, short = 'H', env = "CORTEX_API_HOST")]
    api_host: Option<String>,

    /// API server port
    #[arg(long, short = 'P', env = "CORTEX_API_PORT")]
    api_port: Option<u16>,

    /// Config file (defaults to <config dir>/cortex/browser.toml)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of discarding them
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let config = resolve_config(&args)?;
    info!(api = %config.api.base_url(), "cortex-browser starting");

    let client = ApiClient::new(config.api.clone()).context("failed to build HTTP client")?;
    let (navigator, mut outcomes) = Navigator::new(
        Arc::new(client),
        FieldRegistry::with_defaults(),
        NavigatorSettings::from(&config),
    );
    let mut app = App::new(navigator, config.api.base_url());

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app, &mut outcomes).await;
    restore_terminal(&mut terminal)?;
    result
}

fn resolve_config(args: &Args) -> Result<BrowserConfig> {
    let path = args.config.clone().or_else(default_config_path);
    let config = match path {
        Some(path) => load_config(&path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => BrowserConfig::default(),
    };
    Ok(config.with_overrides(args.api_host.clone(), args.api_port))
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_enabled = matches!(
        std::env::var("CORTEX_LOG_STDOUT").ok().as_deref(),
        Some("1") | Some("true") | Some("TRUE") | Some("yes") | Some("YES")
    );

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init();
    } else if stdout_enabled {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::sink)
            .try_init();
    }
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    outcomes: &mut mpsc::Receiver<FetchOutcome>,
) -> Result<()> {
    let mut events = EventStream::new();

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        tokio::select! {
            Some(outcome) = outcomes.recv() => {
                app.navigator.apply(outcome);
            }
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => {
                        if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                            app.handle_key(key);
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return Err(err.into()),
                    None => break,
                }
            }
        }

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}
