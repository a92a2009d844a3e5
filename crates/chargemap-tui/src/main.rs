//! chargemap - a terminal client for EV charging stations.
//!
//! Browse, filter and map charging stations, and manage the ones you created,
//! against a chargemap API server.

mod app;
mod forms;
mod ui;

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chargemap_core::{
    ApiClient, Config, ConnectorType, SessionCache, StationCache, StationFilter, StationStatus,
};

use app::{App, AppState, EMAIL_ENV};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE_PREFIX: &str = "chargemap.log";

/// Initialize the tracing subscriber.
///
/// Logs go to a daily file so they never draw over the terminal UI.
/// Use RUST_LOG to control the level (e.g., RUST_LOG=debug).
fn init_tracing(config: &Config) -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = config
        .log_dir()
        .unwrap_or_else(|_| std::env::temp_dir().join("chargemap"));
    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config.with_env_overrides(),
        Err(e) => {
            eprintln!("Warning: failed to load config ({}), using defaults", e);
            Config::default().with_env_overrides()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = load_config();
    let _log_guard = init_tracing(&config);

    // Check for CLI commands
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("--dump-stations") {
        let filter = parse_dump_filter(&args[1..])?;
        return dump_stations(config, filter).await;
    }

    info!(api = %config.api_base_url, "chargemap starting");

    let mut app = App::new(config).context("Failed to create application")?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.check_session();

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("chargemap shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key) {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

// ============================================================================
// --dump-stations
// ============================================================================

fn parse_status(value: &str) -> Result<StationStatus> {
    StationStatus::ALL
        .into_iter()
        .find(|s| s.as_str().eq_ignore_ascii_case(value))
        .ok_or_else(|| anyhow!("Unknown status '{}' (expected Active or Inactive)", value))
}

fn parse_connector(value: &str) -> Result<ConnectorType> {
    ConnectorType::ALL
        .into_iter()
        .find(|c| c.as_str().eq_ignore_ascii_case(value))
        .ok_or_else(|| {
            let known: Vec<&str> = ConnectorType::ALL.iter().map(|c| c.as_str()).collect();
            anyhow!("Unknown connector '{}' (expected one of: {})", value, known.join(", "))
        })
}

/// Parse `--status X`, `--connector X` and `--power X` after `--dump-stations`.
fn parse_dump_filter(args: &[String]) -> Result<StationFilter> {
    let mut filter = StationFilter::default();
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| anyhow!("Missing value for {}", flag))?;
        match flag.as_str() {
            "--status" => filter.status = Some(parse_status(value)?),
            "--connector" => filter.connector_type = Some(parse_connector(value)?),
            "--power" => {
                filter.power_output = StationFilter::parse_power(value).map_err(|e| anyhow!(e))?;
            }
            other => bail!("Unknown option {}", other),
        }
    }
    Ok(filter)
}

fn prompt_email(default: Option<&str>) -> Result<String> {
    match default {
        Some(email) => eprint!("Email [{}]: ", email),
        None => eprint!("Email: "),
    }
    io::stderr().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    match (input.is_empty(), default) {
        (false, _) => Ok(input.to_string()),
        (true, Some(email)) => Ok(email.to_string()),
        (true, None) => bail!("Email is required"),
    }
}

/// Log in, print the (optionally filtered) station list as JSON and exit.
async fn dump_stations(config: Config, filter: StationFilter) -> Result<()> {
    let default_email = std::env::var(EMAIL_ENV)
        .ok()
        .filter(|e| !e.trim().is_empty())
        .or_else(|| config.last_email.clone());

    let email = prompt_email(default_email.as_deref())?;
    let password = rpassword::prompt_password("Password: ")?;

    let api = Arc::new(ApiClient::new(&config)?);
    let session = SessionCache::with_shared(Arc::clone(&api));
    let stations = StationCache::with_shared(api);

    eprintln!("Logging in to {}...", config.api_base_url);
    session
        .login(&email, &password)
        .await
        .context("Login failed")?;

    let all = stations.list().await.context("Failed to fetch stations")?;
    let shown = filter.apply(&all);
    eprintln!("Fetched {} stations, {} after filters", all.len(), shown.len());

    println!("{}", serde_json::to_string_pretty(&shown)?);

    if let Err(e) = session.logout().await {
        warn!(error = %e, "Logout after dump failed");
    }
    Ok(())
}
