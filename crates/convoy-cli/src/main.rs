//! `convoy`: record road obstacles along an oversize-convoy route.
//!
//! # Usage
//!
//! ```text
//! convoy                                   # interactive terminal UI
//! convoy add --title "Pont bas" --description "Hauteur limitée à 4,2m" --here
//! convoy list --json
//! convoy --config ~/.config/convoy/convoy.toml contacts
//! ```

mod app;
mod commands;
mod providers;
mod settings;
mod ui;

use std::{
  fs::File,
  io::{self, Write},
  path::{Path, PathBuf},
  process::ExitCode,
  sync::Mutex,
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use commands::{AddArgs, Devices};
use convoy_core::{
  provider::Dialer,
  store::{KeyValueStore, ObstacleStore},
  validate::ObstacleInput,
};
use convoy_store_sqlite::SqliteStore;
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use providers::{ConfiguredGeolocator, FileImageSource, NominatimGeocoder, SystemDialer};
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::Settings;
use tracing::{debug, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "convoy", version, about = "Road obstacle log for oversize convoys")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "convoy.toml")]
  config: PathBuf,

  /// SQLite store to use instead of the configured one.
  #[arg(long, value_name = "FILE", env = "CONVOY_STORE")]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Browse obstacles and contacts interactively (the default).
  Tui,

  /// Print every recorded obstacle.
  List {
    /// Emit the stored JSON records instead of text.
    #[arg(long)]
    json: bool,
  },

  /// Validate and record a new obstacle.
  Add {
    #[arg(short, long)]
    title: String,

    #[arg(short, long)]
    description: String,

    /// Attach an image file.
    #[arg(long, value_name = "FILE", conflicts_with = "camera")]
    photo: Option<PathBuf>,

    /// Capture a photo with the camera.
    #[arg(long)]
    camera: bool,

    /// Latitude in decimal degrees.
    #[arg(long, allow_hyphen_values = true, requires = "lon", conflicts_with_all = ["here", "address"])]
    lat: Option<String>,

    /// Longitude in decimal degrees.
    #[arg(long, allow_hyphen_values = true, requires = "lat", conflicts_with_all = ["here", "address"])]
    lon: Option<String>,

    /// Use the current device position.
    #[arg(long, conflicts_with = "address")]
    here: bool,

    /// Look up coordinates for a postal address.
    #[arg(long)]
    address: Option<String>,
  },

  /// Delete an obstacle by id.
  Remove {
    id: String,

    /// Do not ask for confirmation.
    #[arg(short, long)]
    yes: bool,
  },

  /// Delete every obstacle.
  Clear {
    /// Do not ask for confirmation.
    #[arg(short, long)]
    yes: bool,
  },

  /// Show the emergency contact directory.
  Contacts,

  /// Dial a contact from the directory.
  Call {
    /// Contact id as shown by `convoy contacts`.
    contact_id: String,
  },

  /// Check obstacle fields without saving anything.
  Validate {
    #[arg(short, long, default_value = "")]
    title: String,

    #[arg(short, long, default_value = "")]
    description: String,

    #[arg(long, allow_hyphen_values = true)]
    lat: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    lon: Option<String>,
  },

  /// Append the three sample obstacles.
  Seed,

  /// Verify that the stored collection can be read.
  Check,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<ExitCode> {
  let cli = Cli::parse();

  let mut settings = Settings::load(&cli.config)?;
  if let Some(store) = cli.store {
    settings.store_path = store;
  }
  let store_path = settings.resolved_store_path();

  let command = cli.command.unwrap_or(Command::Tui);
  let interactive = matches!(command, Command::Tui);
  init_tracing(interactive.then(|| store_path.with_extension("log")).as_deref())?;
  debug!(?settings, "settings loaded");

  let kv = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store {}", store_path.display()))?;
  let store = ObstacleStore::new(kv);
  let dialer = SystemDialer { command: settings.dialer_command.clone() };

  let mut out = io::stdout();
  match command {
    Command::Tui => run_tui(App::new(store, dialer)).await,

    Command::List { json } => commands::list(&store, json, &mut out).await,

    Command::Add { title, description, photo, camera, lat, lon, here, address } => {
      let geolocator = ConfiguredGeolocator { position: settings.position };
      let geocoder = NominatimGeocoder::new(settings.geocoder_url.clone())?;
      let images = FileImageSource { path: photo.clone() };
      let devices = Devices {
        geolocator: &geolocator,
        geocoder:   &geocoder,
        images:     &images,
      };
      let args = AddArgs {
        title,
        description,
        photo,
        camera,
        latitude: lat,
        longitude: lon,
        here,
        address,
      };
      commands::add(&store, devices, args, &mut out).await
    }

    Command::Remove { id, yes } => {
      commands::remove(&store, &id, yes, &mut io::stdin().lock(), &mut out).await
    }

    Command::Clear { yes } => commands::clear(&store, yes, &mut io::stdin().lock(), &mut out).await,

    Command::Contacts => commands::contacts(&mut out),

    Command::Call { contact_id } => commands::call(&dialer, &contact_id, &mut out),

    Command::Validate { title, description, lat, lon } => {
      let input = ObstacleInput {
        title:       &title,
        description: &description,
        latitude:    lat.as_deref(),
        longitude:   lon.as_deref(),
      };
      commands::validate(&input, &mut out)
    }

    Command::Seed => commands::seed(&store, &mut out).await,

    Command::Check => commands::check(&store, &mut out).await,
  }
}

// ─── Logging ──────────────────────────────────────────────────────────────────

/// Log to stderr, or to `log_file` while the terminal UI owns the screen.
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::WARN.into())
    .from_env_lossy();

  match log_file {
    Some(path) => {
      if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
          .with_context(|| format!("failed to create {}", parent.display()))?;
      }
      let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
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

// ─── Terminal UI ──────────────────────────────────────────────────────────────

async fn run_tui<K: KeyValueStore, D: Dialer>(mut app: App<K, D>) -> Result<ExitCode> {
  app.load_obstacles().await;

  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();
  terminal.backend_mut().flush().ok();

  run_result.map(|()| ExitCode::SUCCESS)
}

async fn run_event_loop<K: KeyValueStore, D: Dialer>(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<K, D>,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    match maybe_event {
      Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
        if !app.handle_key(key).await {
          break;
        }
      }
      // Resize and everything else: redraw on the next iteration.
      _ => {}
    }
  }

  Ok(())
}
