#[path = "../bin_common.rs"]
mod common;

use clap::Parser;
use common::parse_top_n;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use retail_analytics::{
    AnalyticsClient, ApiConfig,
    config::{API_URL_ENV, DEFAULT_API_URL, DEFAULT_INPUT_FILE, DEFAULT_OUTPUT_DIR, DEFAULT_TOP_N},
    tui::{Action, App, Event, EventHandler, draw, spawn_query},
};
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Parser)]
#[command(name = "retail-analytics-tui")]
#[command(about = "Terminal dashboard for the Online Retail Analytics API")]
struct Args {
    /// Analytics API base URL
    #[arg(long, env = API_URL_ENV, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Number of entries requested for the ranking queries
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N, value_parser = parse_top_n)]
    top_n: u32,

    /// Input file shown in the settings panel
    #[arg(long, default_value = DEFAULT_INPUT_FILE)]
    input_file: String,

    /// Output directory shown in the settings panel
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: String,

    /// Write logs to this file (the terminal belongs to the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        let file = std::fs::File::create(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("debug".parse()?))
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    }

    let config = ApiConfig::new(&args.api_url);
    tracing::info!(api_url = %config.base_url, "Starting dashboard");
    let client = AnalyticsClient::new(&config.base_url);

    let mut app = App::new(client.base_url());
    app.top_n = args.top_n;
    app.input_file = args.input_file;
    app.output_dir = args.output_dir;

    run_tui(client, app).await
}

async fn run_tui(client: AnalyticsClient, mut app: App) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut events = EventHandler::new(TICK_RATE);

    let result = run_event_loop(&mut terminal, &mut app, &mut events, &client).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
    client: &AnalyticsClient,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut in_flight: Option<CancellationToken> = None;

    while app.running {
        terminal.draw(|f| draw(f, app))?;

        let Some(event) = events.next().await else {
            break;
        };

        match event {
            Event::Quit => app.running = false,
            Event::Tick => app.tick(),
            Event::Key(key) => match app.handle_key(key) {
                Action::Quit => app.running = false,
                Action::Run(query) => {
                    if let Some(previous) = in_flight.take() {
                        previous.cancel();
                    }
                    let generation = app.begin(query);
                    let cancel = CancellationToken::new();
                    spawn_query(
                        client.clone(),
                        query,
                        generation,
                        events.sender(),
                        cancel.clone(),
                    );
                    in_flight = Some(cancel);
                }
                Action::None => {}
            },
            Event::Loaded {
                generation,
                outcome,
            } => {
                if app.finish(generation, outcome) {
                    in_flight = None;
                }
            }
        }
    }

    if let Some(cancel) = in_flight {
        cancel.cancel();
    }

    Ok(())
}
