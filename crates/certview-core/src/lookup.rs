//! The lookup service abstraction and the orchestrator driving it.
//!
//! Each request runs one lifecycle: clear the store, mark the mode in
//! flight, await the service, then either replace the store wholesale or
//! raise that mode's error flag. Failures stop here; they are logged and
//! turned into flags, never returned to the caller.

use std::{
  fmt,
  future::Future,
  path::Path,
};

use crate::{
  Error, Result,
  identifiers::IdentifierList,
  record::{PersonRecord, RecordSet},
  table::TableView,
};

/// The table type the orchestrator feeds.
pub type RecordTable = TableView<PersonRecord>;

// ─── Upload ──────────────────────────────────────────────────────────────────

/// A file selected for bulk ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
  pub file_name:    String,
  pub content_type: String,
  pub bytes:        Vec<u8>,
}

impl UploadFile {
  /// Read `path`, guessing the content type from its extension.
  pub fn from_path(path: &Path) -> Result<Self> {
    let bytes = std::fs::read(path)?;
    let file_name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| "upload".to_string());
    let content_type = content_type_for(path).to_string();
    Ok(Self { file_name, content_type, bytes })
  }
}

fn content_type_for(path: &Path) -> &'static str {
  let ext = path
    .extension()
    .map(|e| e.to_string_lossy().to_ascii_lowercase())
    .unwrap_or_default();
  match ext.as_str() {
    "csv" => "text/csv",
    "txt" => "text/plain",
    "json" => "application/json",
    "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "xls" => "application/vnd.ms-excel",
    _ => "application/octet-stream",
  }
}

// ─── Service trait ───────────────────────────────────────────────────────────

/// The remote lookup service.
///
/// All three operations return the same record-set shape. Any transport or
/// validation failure surfaces as a single `Self::Error`.
pub trait LookupService: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Upload one file and return every record parsed from it.
  fn ingest(
    &self,
    file: UploadFile,
  ) -> impl Future<Output = Result<RecordSet, Self::Error>> + Send + '_;

  /// Records for a single identifier.
  fn lookup_one(
    &self,
    id: String,
  ) -> impl Future<Output = Result<RecordSet, Self::Error>> + Send + '_;

  /// Records for two or more identifiers.
  fn lookup_many(
    &self,
    ids: Vec<String>,
  ) -> impl Future<Output = Result<RecordSet, Self::Error>> + Send + '_;
}

// ─── Requests ────────────────────────────────────────────────────────────────

/// The two retrieval paths. Each has its own error flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupMode {
  Ingest,
  Identifiers,
}

impl fmt::Display for LookupMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Ingest => f.write_str("file ingest"),
      Self::Identifiers => f.write_str("identifier lookup"),
    }
  }
}

/// A request accepted by the orchestrator, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupRequest {
  Ingest(UploadFile),
  One(String),
  Many(Vec<String>),
}

impl LookupRequest {
  pub fn mode(&self) -> LookupMode {
    match self {
      Self::Ingest(_) => LookupMode::Ingest,
      Self::One(_) | Self::Many(_) => LookupMode::Identifiers,
    }
  }

  pub async fn send<S: LookupService>(self, service: &S) -> Result<RecordSet, S::Error> {
    match self {
      Self::Ingest(file) => service.ingest(file).await,
      Self::One(id) => service.lookup_one(id).await,
      Self::Many(ids) => service.lookup_many(ids).await,
    }
  }
}

// ─── Orchestrator ────────────────────────────────────────────────────────────

/// What [`Orchestrator::settle`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
  Loaded { count: usize },
  Failed,
  /// Nothing was in flight for that mode.
  Ignored,
}

/// Loading and error state for the two retrieval modes.
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
  in_flight:    Option<LookupMode>,
  ingest_error: bool,
  lookup_error: bool,
}

impl Orchestrator {
  pub fn new() -> Self { Self::default() }

  pub fn is_loading(&self) -> bool { self.in_flight.is_some() }

  pub fn in_flight(&self) -> Option<LookupMode> { self.in_flight }

  pub fn ingest_error(&self) -> bool { self.ingest_error }

  pub fn lookup_error(&self) -> bool { self.lookup_error }

  /// Accept a bulk-file request.
  pub fn begin_ingest(&mut self, table: &mut RecordTable, file: UploadFile) -> Result<LookupRequest> {
    self.begin(table, LookupRequest::Ingest(file))
  }

  /// Accept an identifier-list request. One identifier becomes a single
  /// lookup; two or more become a batch.
  pub fn begin_lookup(
    &mut self,
    table: &mut RecordTable,
    ids: &IdentifierList,
  ) -> Result<LookupRequest> {
    let request = match ids.as_slice() {
      [] => return Err(Error::NoIdentifiers),
      [one] => LookupRequest::One(one.clone()),
      many => LookupRequest::Many(many.to_vec()),
    };
    self.begin(table, request)
  }

  fn begin(&mut self, table: &mut RecordTable, request: LookupRequest) -> Result<LookupRequest> {
    // Both modes write the same store, so one request at a time overall.
    if let Some(mode) = self.in_flight {
      return Err(Error::RequestInFlight(mode));
    }
    let mode = request.mode();
    table.clear();
    self.ingest_error = false;
    self.lookup_error = false;
    self.in_flight = Some(mode);
    tracing::debug!(%mode, "lookup started");
    Ok(request)
  }

  /// Apply the outcome of the request in flight for `mode`.
  pub fn settle<E: fmt::Display>(
    &mut self,
    table: &mut RecordTable,
    mode: LookupMode,
    outcome: Result<RecordSet, E>,
  ) -> Settled {
    if self.in_flight != Some(mode) {
      tracing::warn!(%mode, "ignoring outcome for a request that is not in flight");
      return Settled::Ignored;
    }
    self.in_flight = None;

    match outcome {
      Ok(records) => {
        let count = records.len();
        table.set_records(records);
        tracing::info!(%mode, count, "lookup settled");
        Settled::Loaded { count }
      }
      Err(e) => {
        table.clear();
        match mode {
          LookupMode::Ingest => self.ingest_error = true,
          LookupMode::Identifiers => self.lookup_error = true,
        }
        tracing::warn!(%mode, error = %e, "lookup failed");
        Settled::Failed
      }
    }
  }

  /// Send an accepted request and settle it.
  pub async fn run<S: LookupService>(
    &mut self,
    service: &S,
    table: &mut RecordTable,
    request: LookupRequest,
  ) -> Settled {
    let mode = request.mode();
    let outcome = request.send(service).await;
    self.settle(table, mode, outcome)
  }

  /// Begin, send and settle a bulk-file request.
  pub async fn ingest<S: LookupService>(
    &mut self,
    service: &S,
    table: &mut RecordTable,
    file: UploadFile,
  ) -> Result<Settled> {
    let request = self.begin_ingest(table, file)?;
    Ok(self.run(service, table, request).await)
  }

  /// Begin, send and settle an identifier-list request.
  pub async fn lookup<S: LookupService>(
    &mut self,
    service: &S,
    table: &mut RecordTable,
    ids: &IdentifierList,
  ) -> Result<Settled> {
    let request = self.begin_lookup(table, ids)?;
    Ok(self.run(service, table, request).await)
  }
}
