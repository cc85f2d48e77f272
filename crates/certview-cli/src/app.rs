//! Application state machine and event dispatcher.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use certview_core::{
  columns::{Column, ColumnSet},
  identifiers::IdentifierList,
  lookup::{LookupMode, LookupRequest, Orchestrator, RecordTable, Settled, UploadFile},
  record::{PersonRecord, RecordSet, TierRules},
};
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use crate::{
  client::{ApiClient, ClientError},
  settings::Settings,
};

// ─── Focus / prompts ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
  /// Typing CPFs into the identifier list.
  Identifiers,
  /// Navigating, sorting and paging the results table.
  Table,
}

/// A one-line path prompt shown over the identifier input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
  IngestFile,
  ExportFile,
}

impl Prompt {
  pub fn label(&self) -> &'static str {
    match self {
      Prompt::IngestFile => "Arquivo",
      Prompt::ExportFile => "Exportar para",
    }
  }
}

/// Outcome of a spawned request, delivered back to the event loop.
struct Completion {
  mode:    LookupMode,
  outcome: Result<RecordSet, ClientError>,
}

/// `certificacoes-YYYYMMDD.xlsx` inside `dir`.
pub fn default_export_path(dir: &Path, today: NaiveDate) -> PathBuf {
  dir.join(format!("certificacoes-{}.xlsx", today.format("%Y%m%d")))
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub focus: Focus,

  /// Text typed into the identifier input.
  pub input: String,

  /// Active path prompt, if any, and its buffer.
  pub prompt:        Option<Prompt>,
  pub prompt_buffer: String,

  /// CPFs queued for the next lookup.
  pub identifiers: IdentifierList,

  /// Selected entry in the identifier list.
  pub id_cursor: usize,

  /// Sorted, paginated results.
  pub table: RecordTable,

  /// Columns shown and exported; re-detected on every successful lookup.
  pub columns: ColumnSet,

  /// Column under the header cursor (sort target).
  pub column_cursor: usize,

  /// Row cursor within the visible page.
  pub row_cursor: usize,

  pub orchestrator: Orchestrator,

  pub tiers: TierRules,

  pub export_dir: PathBuf,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Frame counter driving the loading spinner.
  pub tick: usize,

  /// Shared HTTP client.
  pub client: Arc<ApiClient>,

  tx: mpsc::UnboundedSender<Completion>,
  rx: mpsc::UnboundedReceiver<Completion>,
}

impl App {
  /// Create an [`App`] with an empty identifier list and no results.
  pub fn new(client: ApiClient, settings: &Settings) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      focus: Focus::Identifiers,
      input: String::new(),
      prompt: None,
      prompt_buffer: String::new(),
      identifiers: IdentifierList::new(),
      id_cursor: 0,
      table: RecordTable::with_page_size(settings.page_size),
      columns: ColumnSet::basic(),
      column_cursor: 0,
      row_cursor: 0,
      orchestrator: Orchestrator::new(),
      tiers: settings.tier_rules(),
      export_dir: settings.export_dir.clone(),
      status_msg: String::new(),
      tick: 0,
      client: Arc::new(client),
      tx,
      rx,
    }
  }

  pub fn visible_page(&self) -> Vec<PersonRecord> { self.table.visible_page() }

  pub fn selected_column(&self) -> Option<Column> { self.columns.get(self.column_cursor) }

  // ── Requests ──────────────────────────────────────────────────────────────

  /// Query the service with the identifier list.
  pub fn start_lookup(&mut self) {
    match self.orchestrator.begin_lookup(&mut self.table, &self.identifiers) {
      Ok(request) => self.dispatch(request),
      Err(e) => self.status_msg = format!("Não foi possível consultar: {e}"),
    }
  }

  /// Upload the file at `path`.
  pub fn start_ingest(&mut self, path: &Path) {
    let file = match UploadFile::from_path(path) {
      Ok(file) => file,
      Err(e) => {
        self.status_msg = format!("Não foi possível ler {}: {e}", path.display());
        return;
      }
    };
    match self.orchestrator.begin_ingest(&mut self.table, file) {
      Ok(request) => self.dispatch(request),
      Err(e) => self.status_msg = format!("Não foi possível enviar: {e}"),
    }
  }

  /// Run `request` on a background task; the outcome comes back through
  /// [`poll_completions`](Self::poll_completions).
  fn dispatch(&mut self, request: LookupRequest) {
    let client = Arc::clone(&self.client);
    let tx = self.tx.clone();
    let mode = request.mode();
    self.row_cursor = 0;
    self.status_msg = "Carregando…".into();
    tokio::spawn(async move {
      let outcome = request.send(client.as_ref()).await;
      // The receiver lives as long as the app.
      let _ = tx.send(Completion { mode, outcome });
    });
  }

  /// Apply finished requests. Returns `true` if anything settled.
  pub fn poll_completions(&mut self) -> bool {
    let mut settled_any = false;
    while let Ok(Completion { mode, outcome }) = self.rx.try_recv() {
      settled_any = true;
      match self.orchestrator.settle(&mut self.table, mode, outcome) {
        Settled::Loaded { count } => {
          self.columns = ColumnSet::detect(self.table.records());
          self.column_cursor = self.column_cursor.min(self.columns.len().saturating_sub(1));
          self.row_cursor = 0;
          self.status_msg = match count {
            0 => "Nenhum resultado encontrado".into(),
            1 => "1 resultado encontrado".into(),
            n => format!("{n} resultados encontrados"),
          };
        }
        Settled::Failed => self.status_msg = String::new(),
        Settled::Ignored => {}
      }
    }
    settled_any
  }

  /// Write the full result set to `path`.
  pub fn export_to(&mut self, path: &Path) {
    match certview_export::write_xlsx(path, self.table.records(), &self.columns) {
      Ok(rows) => self.status_msg = format!("{rows} linhas exportadas para {}", path.display()),
      Err(e) => {
        tracing::warn!(path = %path.display(), error = %e, "export failed");
        self.status_msg = format!("Falha ao exportar: {e}");
      }
    }
  }

  pub fn advance_tick(&mut self) { self.tick = self.tick.wrapping_add(1); }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    if let Some(prompt) = self.prompt {
      self.handle_prompt_key(prompt, key);
      return true;
    }

    match key.code {
      KeyCode::Tab => {
        self.focus = match self.focus {
          Focus::Identifiers => Focus::Table,
          Focus::Table => Focus::Identifiers,
        };
        return true;
      }
      KeyCode::F(2) => {
        self.open_prompt(Prompt::IngestFile);
        return true;
      }
      KeyCode::F(3) => {
        self.open_prompt(Prompt::ExportFile);
        return true;
      }
      KeyCode::F(5) => {
        self.start_lookup();
        return true;
      }
      _ => {}
    }

    match self.focus {
      Focus::Identifiers => {
        self.handle_identifier_key(key);
        true
      }
      Focus::Table => self.handle_table_key(key),
    }
  }

  fn open_prompt(&mut self, prompt: Prompt) {
    self.prompt_buffer = match prompt {
      Prompt::IngestFile => String::new(),
      Prompt::ExportFile => {
        let today = chrono::Local::now().date_naive();
        default_export_path(&self.export_dir, today).display().to_string()
      }
    };
    self.prompt = Some(prompt);
  }

  fn handle_prompt_key(&mut self, prompt: Prompt, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.prompt = None;
        self.prompt_buffer.clear();
      }
      KeyCode::Enter => {
        self.prompt = None;
        let path = PathBuf::from(std::mem::take(&mut self.prompt_buffer).trim());
        if path.as_os_str().is_empty() {
          return;
        }
        match prompt {
          Prompt::IngestFile => self.start_ingest(&path),
          Prompt::ExportFile => self.export_to(&path),
        }
      }
      KeyCode::Backspace => {
        self.prompt_buffer.pop();
      }
      KeyCode::Char(c) => self.prompt_buffer.push(c),
      _ => {}
    }
  }

  fn handle_identifier_key(&mut self, key: KeyEvent) {
    match key.code {
      // Enter adds what was typed; on an empty input it runs the lookup.
      KeyCode::Enter => {
        if self.input.trim().is_empty() {
          self.input.clear();
          self.start_lookup();
        } else {
          let input = std::mem::take(&mut self.input);
          if self.identifiers.extend_delimited(&input) == 0 {
            self.status_msg = "CPF já incluído".into();
          } else {
            self.status_msg = String::new();
            self.id_cursor = self.identifiers.len() - 1;
          }
        }
      }
      KeyCode::Backspace => {
        self.input.pop();
      }
      KeyCode::Delete => self.remove_selected_identifier(),
      KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.remove_selected_identifier();
      }
      KeyCode::Down => {
        if self.id_cursor + 1 < self.identifiers.len() {
          self.id_cursor += 1;
        }
      }
      KeyCode::Up => {
        self.id_cursor = self.id_cursor.saturating_sub(1);
      }
      KeyCode::Esc => self.input.clear(),
      KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => self.input.push(c),
      _ => {}
    }
  }

  fn remove_selected_identifier(&mut self) {
    let Some(id) = self.identifiers.as_slice().get(self.id_cursor).cloned() else {
      return;
    };
    self.identifiers.remove(&id);
    self.id_cursor = self.id_cursor.min(self.identifiers.len().saturating_sub(1));
  }

  fn handle_table_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      // Quit
      KeyCode::Char('q') => return false,

      // Column cursor and sorting
      KeyCode::Left | KeyCode::Char('h') => {
        self.column_cursor = self.column_cursor.saturating_sub(1);
      }
      KeyCode::Right | KeyCode::Char('l') => {
        if self.column_cursor + 1 < self.columns.len() {
          self.column_cursor += 1;
        }
      }
      KeyCode::Enter | KeyCode::Char('s') => {
        if let Some(column) = self.selected_column() {
          self.table.request_sort(column.sort_key());
          self.row_cursor = 0;
        }
      }

      // Rows
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.visible_page().len();
        if self.row_cursor + 1 < len {
          self.row_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.row_cursor = self.row_cursor.saturating_sub(1);
      }

      // Pages
      KeyCode::PageDown | KeyCode::Char('n') => {
        self.table.next_page();
        self.row_cursor = 0;
      }
      KeyCode::PageUp | KeyCode::Char('p') => {
        self.table.prev_page();
        self.row_cursor = 0;
      }
      KeyCode::Char('+') | KeyCode::Char('z') => {
        self.table.cycle_page_size();
        self.row_cursor = 0;
      }

      // Shortcuts mirrored from the function keys
      KeyCode::Char('o') => self.open_prompt(Prompt::IngestFile),
      KeyCode::Char('x') => self.open_prompt(Prompt::ExportFile),
      KeyCode::Char('r') => self.start_lookup(),

      _ => {}
    }
    true
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use axum::{Json, Router, extract::Path as UrlPath, http::StatusCode, routing::get};
  use certview_core::sort::{SortDirection, SortKey};

  use super::*;
  use crate::client::ApiConfig;

  fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  fn app_at(base_url: &str) -> App {
    let client = ApiClient::new(ApiConfig {
      base_url: base_url.into(),
      timeout:  Duration::from_secs(5),
    })
    .unwrap();
    App::new(client, &Settings::default())
  }

  fn app() -> App { app_at("http://127.0.0.1:9") }

  fn type_str(app: &mut App, s: &str) {
    for c in s.chars() {
      app.handle_key(key(KeyCode::Char(c)));
    }
  }

  async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
  }

  async fn wait_settled(app: &mut App) {
    for _ in 0..200 {
      if app.poll_completions() {
        return;
      }
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("request never settled");
  }

  #[test]
  fn typing_and_enter_adds_identifiers_once() {
    let mut app = app();
    type_str(&mut app, "111");
    app.handle_key(key(KeyCode::Enter));
    type_str(&mut app, "111");
    app.handle_key(key(KeyCode::Enter));
    type_str(&mut app, "222, 333");
    app.handle_key(key(KeyCode::Enter));

    assert_eq!(app.identifiers.as_slice(), ["111", "222", "333"]);
    assert!(app.input.is_empty());
    assert_eq!(app.id_cursor, 2);
  }

  #[test]
  fn delete_removes_selected_identifier() {
    let mut app = app();
    app.identifiers.add("111");
    app.identifiers.add("222");
    app.id_cursor = 1;

    app.handle_key(key(KeyCode::Delete));

    assert_eq!(app.identifiers.as_slice(), ["111"]);
    assert_eq!(app.id_cursor, 0);
  }

  #[test]
  fn table_keys_sort_and_page() {
    let mut app = app();
    app.table.set_records(
      (0..12)
        .map(|i| PersonRecord::new(format!("{i}"), format!("P{i:02}")))
        .collect(),
    );
    app.handle_key(key(KeyCode::Tab));
    assert_eq!(app.focus, Focus::Table);

    // Column 1 is Nome; pressing Enter twice flips to descending.
    app.handle_key(key(KeyCode::Right));
    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.table.sort().key, SortKey::Name);
    assert_eq!(app.table.sort().direction, SortDirection::Descending);

    app.handle_key(key(KeyCode::Char('n')));
    assert_eq!(app.table.page_index(), 1);
    app.handle_key(key(KeyCode::Char('+')));
    assert_eq!(app.table.page_size(), 10);
    assert_eq!(app.table.page_index(), 0);

    assert!(!app.handle_key(key(KeyCode::Char('q'))));
  }

  #[test]
  fn q_is_text_while_typing_identifiers() {
    let mut app = app();
    assert!(app.handle_key(key(KeyCode::Char('q'))));
    assert_eq!(app.input, "q");
    let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert!(!app.handle_key(ctrl_c));
  }

  #[test]
  fn lookup_with_empty_list_reports_and_stays_idle() {
    let mut app = app();
    app.handle_key(key(KeyCode::Enter));
    assert!(!app.orchestrator.is_loading());
    assert!(!app.status_msg.is_empty());
  }

  #[test]
  fn unreadable_ingest_file_does_not_start_a_request() {
    let mut app = app();
    app.start_ingest(Path::new("/nonexistent/cpfs.csv"));
    assert!(!app.orchestrator.is_loading());
    assert!(!app.orchestrator.ingest_error());
  }

  #[test]
  fn export_prompt_proposes_dated_file() {
    let path = default_export_path(Path::new("out"), NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
    assert_eq!(path, PathBuf::from("out/certificacoes-20240307.xlsx"));

    let mut app = app();
    app.handle_key(key(KeyCode::F(3)));
    assert_eq!(app.prompt, Some(Prompt::ExportFile));
    assert!(app.prompt_buffer.ends_with(".xlsx"));
    app.handle_key(key(KeyCode::Esc));
    assert!(app.prompt.is_none());
  }

  #[tokio::test]
  async fn lookup_round_trip_through_stub_service() {
    let router = Router::new().route(
      "/cpfs",
      get(|| async {
        let mut p = PersonRecord::new("222", "Bia");
        p.phone = Some("+55 11 90000-0000".into());
        Json(vec![PersonRecord::new("111", "Ana"), p])
      }),
    );
    let mut app = app_at(&serve(router).await);
    app.table.set_records(vec![PersonRecord::new("999", "Velho")]);
    app.identifiers.add("111");
    app.identifiers.add("222");

    app.handle_key(key(KeyCode::F(5)));
    assert!(app.orchestrator.is_loading());
    assert!(app.table.records().is_empty());

    // A second trigger while loading is refused.
    app.handle_key(key(KeyCode::F(5)));

    wait_settled(&mut app).await;
    assert!(!app.orchestrator.is_loading());
    assert_eq!(app.table.records().len(), 2);
    assert_eq!(app.columns, ColumnSet::with_contact());
  }

  #[tokio::test]
  async fn failed_lookup_keeps_identifiers_and_sets_lookup_flag() {
    let router = Router::new().route(
      "/cpf/{id}",
      get(|UrlPath(_id): UrlPath<String>| async { StatusCode::BAD_REQUEST }),
    );
    let mut app = app_at(&serve(router).await);
    app.identifiers.add("123");

    app.start_lookup();
    wait_settled(&mut app).await;

    assert!(app.orchestrator.lookup_error());
    assert!(!app.orchestrator.ingest_error());
    assert_eq!(app.identifiers.as_slice(), ["123"]);
    assert!(app.table.records().is_empty());
  }

  #[test]
  fn export_writes_full_result_set() {
    let mut app = app();
    app.table.set_records((0..13).map(|i| PersonRecord::new(format!("{i}"), "X")).collect());
    app.table.set_page_size(5);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.xlsx");
    app.export_to(&path);

    assert!(path.exists());
    assert!(app.status_msg.starts_with("13 linhas"), "{}", app.status_msg);
  }
}
