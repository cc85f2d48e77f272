//! `certview`: CPF certification lookup.
//!
//! # Usage
//!
//! ```text
//! certview                                   # interactive TUI
//! certview lookup 11111111111 22222222222    # print results to stdout
//! certview ingest cpfs.csv --export out.xlsx --sort dueDate --desc
//! certview --url https://certs.example.com/api --config ~/.config/certview.toml
//! ```

mod app;
mod client;
mod headless;
mod settings;
mod ui;

use std::{
  fs::File,
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use headless::{Output, Source};
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "certview", about = "Look up professional certifications by CPF")]
struct Args {
  /// Path to a TOML config file. A missing file is not an error.
  #[arg(short, long, value_name = "FILE", default_value = "certview.toml")]
  config: PathBuf,

  /// Base URL of the lookup service (overrides the config file).
  #[arg(long, env = "CERTVIEW_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Look up one or more CPFs and print the results.
  Lookup {
    #[arg(required = true, value_name = "CPF")]
    ids: Vec<String>,

    #[command(flatten)]
    output: OutputArgs,
  },
  /// Upload a CPF file and print the results.
  Ingest {
    file: PathBuf,

    #[command(flatten)]
    output: OutputArgs,
  },
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
  /// Also write the results to an xlsx workbook.
  #[arg(long, value_name = "FILE")]
  export: Option<PathBuf>,

  /// Sort key (taxId, name, phone, email, certification, firstCertification,
  /// lastUpdate, dueDate, status).
  #[arg(long, default_value = "name")]
  sort: String,

  /// Sort descending.
  #[arg(long)]
  desc: bool,

  /// Print records as JSON instead of tab-separated rows.
  #[arg(long)]
  json: bool,
}

impl From<OutputArgs> for Output {
  fn from(args: OutputArgs) -> Self {
    Self {
      export:     args.export,
      sort:       args.sort,
      descending: args.desc,
      json:       args.json,
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let mut settings = Settings::load(&args.config)?;
  if let Some(url) = args.url {
    settings.base_url = url;
  }

  init_tracing(args.command.is_none(), settings.log_file.as_deref())?;

  let client = ApiClient::new(ApiConfig {
    base_url: settings.base_url.clone(),
    timeout:  Duration::from_secs(settings.timeout_secs),
  })?;

  let (source, output) = match args.command {
    None => return run_tui(client, &settings).await,
    Some(Command::Lookup { ids, output }) => (Source::Identifiers(ids), output),
    Some(Command::Ingest { file, output }) => (Source::File(file), output),
  };

  let mut stdout = io::stdout().lock();
  headless::run(&client, source, &output.into(), &mut stdout).await
}

/// Headless runs log to stderr. The TUI owns the terminal, so it logs to
/// `log_file` or not at all.
fn init_tracing(tui: bool, log_file: Option<&Path>) -> Result<()> {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy();

  if !tui {
    tracing_subscriber::fmt()
      .with_env_filter(filter)
      .with_writer(io::stderr)
      .init();
    return Ok(());
  }

  if let Some(path) = log_file {
    let file = File::options()
      .create(true)
      .append(true)
      .open(path)
      .with_context(|| format!("opening log file {}", path.display()))?;
    tracing_subscriber::fmt()
      .with_env_filter(filter)
      .with_ansi(false)
      .with_writer(Mutex::new(file))
      .init();
  }
  Ok(())
}

// ─── TUI ──────────────────────────────────────────────────────────────────────

async fn run_tui(client: ApiClient, settings: &Settings) -> Result<()> {
  let mut app = App::new(client, settings);

  // Set up the terminal.
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

  run_result
}

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    app.poll_completions();
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event {
      if key.kind == KeyEventKind::Press && !app.handle_key(key) {
        break;
      }
    }

    app.advance_tick();
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn no_subcommand_means_tui() {
    let args = Args::try_parse_from(["certview"]).unwrap();
    assert!(args.command.is_none());
    assert_eq!(args.config, PathBuf::from("certview.toml"));
  }

  #[test]
  fn lookup_takes_ids_and_output_flags() {
    let args = Args::try_parse_from([
      "certview", "lookup", "111", "222", "--sort", "dueDate", "--desc", "--export", "out.xlsx",
    ])
    .unwrap();
    let Some(Command::Lookup { ids, output }) = args.command else {
      panic!("expected lookup");
    };
    assert_eq!(ids, ["111", "222"]);
    let output = Output::from(output);
    assert_eq!(output.sort, "dueDate");
    assert!(output.descending);
    assert!(!output.json);
    assert_eq!(output.export, Some(PathBuf::from("out.xlsx")));
  }

  #[test]
  fn lookup_requires_an_id() {
    assert!(Args::try_parse_from(["certview", "lookup"]).is_err());
  }

  #[test]
  fn ingest_takes_a_file() {
    let args = Args::try_parse_from(["certview", "ingest", "cpfs.csv", "--json"]).unwrap();
    let Some(Command::Ingest { file, output }) = args.command else {
      panic!("expected ingest");
    };
    assert_eq!(file, PathBuf::from("cpfs.csv"));
    assert!(output.json);
    assert_eq!(output.sort, "name");
  }
}
