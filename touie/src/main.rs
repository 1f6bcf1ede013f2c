//! Touie story studio.
//!
//! A terminal interface for creating calm, simple stories as text, audio
//! narration or pictograms.
//!
//! # Headless Mode
//!
//! Run with `--headless` for a line-oriented interface suitable for scripts
//! and automated testing:
//!
//! ```bash
//! cargo run -p touie -- --headless --simulate
//! ```

mod app;
mod events;
mod headless;
mod ui;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::{self, OpenOptions};
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use touie_core::{
    render as text, save_pictograms, Category, FileStore, GenerationResult, HistoryLog,
    HttpBackend, LoadPolicy, SimulatedBackend, StoryBackend, Studio, StudioConfig,
};

use app::{App, Tab};
use events::{handle_event, EventResult};
use ui::render::render;

type AppStudio = Studio<Box<dyn StoryBackend>, FileStore>;

#[derive(Parser, Debug)]
#[command(
    name = "touie",
    version,
    about = "Calm, simple stories as text, audio or pictograms"
)]
struct Cli {
    /// Run the line protocol on stdin/stdout instead of the TUI
    #[arg(long)]
    headless: bool,

    /// Answer with canned stories instead of calling the service
    #[arg(long)]
    simulate: bool,

    /// Base URL of the generation service (overrides TOUIE_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Where the history and logs are kept (overrides TOUIE_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// strict or reset: what to do with an unreadable history
    #[arg(long)]
    history_policy: Option<LoadPolicy>,

    /// Write generated pictogram images to this directory
    #[arg(long)]
    pictogram_dir: Option<PathBuf>,

    /// Starting format in headless mode
    #[arg(long, default_value = "text")]
    format: Category,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one story and print it
    Generate {
        /// pictogram, audio or text
        category: Category,
        /// The idea for the story
        #[arg(required = true, trailing_var_arg = true, num_args = 1..)]
        prompt: Vec<String>,
    },
    /// Print the saved history
    History {
        /// Only this category
        category: Option<Category>,
    },
    /// Show what the generation service reports about itself
    Info,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let tui = cli.command.is_none() && !cli.headless;
    init_logging(tui.then(|| config.log_path()).as_deref())?;

    match cli.command {
        Some(Command::Generate { category, prompt }) => {
            let mut studio = open_studio(&config, cli.simulate)?;
            generate_once(&mut studio, category, &prompt.join(" "), cli.pictogram_dir.as_deref())
                .await
        }
        Some(Command::History { category }) => print_history(&config, category),
        Some(Command::Info) => print_service_info(&config).await,
        None if cli.headless => {
            let mut studio = open_studio(&config, cli.simulate)?;
            headless::run_headless(&mut studio, cli.format, cli.pictogram_dir.as_deref()).await?;
            Ok(())
        }
        None => run_tui(&config, cli.simulate, cli.pictogram_dir.as_deref()).await,
    }
}

/// Environment first, then command-line overrides.
fn load_config(cli: &Cli) -> anyhow::Result<StudioConfig> {
    let mut config = StudioConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(policy) = cli.history_policy {
        config.history_policy = policy;
    }
    Ok(config)
}

/// Log to `log_file` when given (the TUI owns the terminal), else stderr.
fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("could not create {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("could not open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

fn open_history(config: &StudioConfig) -> anyhow::Result<HistoryLog<FileStore>> {
    let path = config.history_path();
    let store = FileStore::open(&path)?;
    HistoryLog::load(store, config.history_policy).with_context(|| {
        format!(
            "could not read history at {} (use --history-policy reset to start over)",
            path.display()
        )
    })
}

fn open_studio(config: &StudioConfig, simulate: bool) -> anyhow::Result<AppStudio> {
    let backend: Box<dyn StoryBackend> = if simulate {
        Box::new(SimulatedBackend::default())
    } else {
        Box::new(HttpBackend::new(config.client()?))
    };
    info!(backend = backend.name(), history = %config.history_path().display(), "opening studio");

    let studio = Studio::new(backend, open_history(config)?)
        .with_story_options(config.story.clone())
        .with_voice_options(config.voice.clone());
    debug!(
        tone = %studio.story_options().tone,
        max_tokens = studio.story_options().max_tokens,
        language = %studio.voice_options().language,
        speed = studio.voice_options().speed,
        "request defaults"
    );
    Ok(studio)
}

async fn generate_once(
    studio: &mut AppStudio,
    category: Category,
    prompt: &str,
    pictogram_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let generation = match studio.generate(category, prompt).await {
        Ok(generation) => generation,
        Err(e) => bail!(text::error_message(category, &e)),
    };

    for line in text::result_lines(&generation) {
        println!("{line}");
    }

    if let (Some(dir), GenerationResult::Pictograms(story)) = (pictogram_dir, &generation.result) {
        for path in save_pictograms(story, dir)? {
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn print_history(config: &StudioConfig, category: Option<Category>) -> anyhow::Result<()> {
    let history = open_history(config)?;
    let categories = match category {
        Some(c) => vec![c],
        None => Category::ALL.to_vec(),
    };

    for c in categories {
        println!("== {} ==", text::category_title(c));
        for line in text::history_lines(c, history.all_of(c)) {
            println!("{line}");
        }
        println!();
    }
    Ok(())
}

async fn print_service_info(config: &StudioConfig) -> anyhow::Result<()> {
    let info = config
        .client()?
        .service_info()
        .await
        .with_context(|| format!("could not reach {}", config.api_url))?;

    println!("{} (version {})", info.message, info.version);
    let mut endpoints: Vec<_> = info.endpoints.iter().collect();
    endpoints.sort();
    for (name, path) in endpoints {
        println!("  {name}: {path}");
    }
    Ok(())
}

async fn run_tui(
    config: &StudioConfig,
    simulate: bool,
    pictogram_dir: Option<&Path>,
) -> anyhow::Result<()> {
    // Open everything before touching the terminal so errors print normally
    let mut studio = open_studio(config, simulate)?;
    let mut app = App::new(
        studio.backend().name().to_string(),
        studio.history().snapshot().clone(),
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &mut studio, pictogram_dir).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result.map_err(Into::into)
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    studio: &mut AppStudio,
    pictogram_dir: Option<&Path>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout for animations
        if event::poll(Duration::from_millis(100))? {
            let ev = event::read()?;
            let tab_before = app.tab;

            match handle_event(app, ev) {
                EventResult::Quit => return Ok(()),
                EventResult::Generate(category) => {
                    if let Some(prompt) = app.start_generation(category) {
                        generate_in_tui(terminal, app, studio, category, &prompt, pictogram_dir)
                            .await?;
                    }
                }
                EventResult::NeedsRedraw | EventResult::Continue => {}
            }

            if app.tab == Tab::History && tab_before != Tab::History {
                app.history = studio.history().snapshot().clone();
            }
        } else {
            app.tick();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Run one generation, keeping the loading animation alive meanwhile.
async fn generate_in_tui<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    studio: &mut AppStudio,
    category: Category,
    prompt: &str,
    pictogram_dir: Option<&Path>,
) -> io::Result<()> {
    let outcome = {
        let generation = studio.generate(category, prompt);
        tokio::pin!(generation);
        loop {
            terminal.draw(|f| render(f, app))?;
            tokio::select! {
                outcome = &mut generation => break outcome,
                _ = tokio::time::sleep(Duration::from_millis(120)) => app.tick(),
            }
        }
    };

    let saved_images = match (pictogram_dir, &outcome) {
        (Some(dir), Ok(generation)) => match &generation.result {
            GenerationResult::Pictograms(story) => match save_pictograms(story, dir) {
                Ok(paths) => Some(format!(
                    "{} pictogramas guardados en {}",
                    paths.len(),
                    dir.display()
                )),
                Err(e) => {
                    warn!(error = %e, "could not save pictograms");
                    Some(format!("No se pudieron guardar los pictogramas: {e}"))
                }
            },
            _ => None,
        },
        _ => None,
    };

    app.finish_generation(category, outcome, studio.history().snapshot().clone());
    if let Some(message) = saved_images {
        app.set_status(message);
    }
    Ok(())
}
