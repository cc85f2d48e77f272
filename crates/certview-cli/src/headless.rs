//! Non-interactive `lookup` and `ingest` commands.
//!
//! Runs one request through the orchestrator, prints the result set (as
//! flattened tab-separated rows, or as JSON) and optionally exports it.

use std::{
  io::Write,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use certview_core::{
  columns::ColumnSet,
  identifiers::IdentifierList,
  lookup::{LookupService, Orchestrator, RecordTable, UploadFile},
  sort::{SortDirection, SortKey, SortState},
};
use certview_export::{FlatRow, flatten};

/// Where the records come from.
#[derive(Debug, Clone)]
pub enum Source {
  Identifiers(Vec<String>),
  File(PathBuf),
}

/// How the result set is printed and exported.
#[derive(Debug, Clone)]
pub struct Output {
  pub export:     Option<PathBuf>,
  pub sort:       String,
  pub descending: bool,
  /// Print the sorted records as a JSON array instead of TSV.
  pub json:       bool,
}

/// Tab-separated header plus one line per flat row.
pub fn render_tsv(rows: &[FlatRow], columns: &ColumnSet) -> String {
  let mut out = String::new();
  let header: Vec<&str> = columns.iter().map(|c| c.label()).collect();
  out.push_str(&header.join("\t"));
  out.push('\n');
  for row in rows {
    out.push_str(&row.cells(columns).join("\t"));
    out.push('\n');
  }
  out
}

pub async fn run<S: LookupService>(
  service: &S,
  source: Source,
  output: &Output,
  out: &mut impl Write,
) -> Result<()> {
  let key: SortKey = output.sort.parse()?;
  let direction = if output.descending { SortDirection::Descending } else { SortDirection::Ascending };

  let mut orchestrator = Orchestrator::new();
  let mut table = RecordTable::new();

  match source {
    Source::Identifiers(ids) => {
      let mut list = IdentifierList::new();
      for id in &ids {
        list.add(id);
      }
      orchestrator.lookup(service, &mut table, &list).await?;
    }
    Source::File(path) => {
      let file = UploadFile::from_path(&path)
        .with_context(|| format!("reading {}", path.display()))?;
      orchestrator.ingest(service, &mut table, file).await?;
    }
  }

  if orchestrator.ingest_error() {
    bail!("Arquivo inválido");
  }
  if orchestrator.lookup_error() {
    bail!("CPF inválido");
  }

  table.set_sort(SortState { key, direction });
  table.set_page_size(table.records().len().max(1));
  let columns = ColumnSet::detect(table.records());

  let sorted = table.visible_page();
  if output.json {
    serde_json::to_writer_pretty(&mut *out, &sorted).context("encoding results")?;
    writeln!(out).context("writing results")?;
  } else {
    out
      .write_all(render_tsv(&flatten(&sorted), &columns).as_bytes())
      .context("writing results")?;
  }

  if let Some(path) = &output.export {
    export(path, &table, &columns)?;
  }
  Ok(())
}

fn export(path: &Path, table: &RecordTable, columns: &ColumnSet) -> Result<()> {
  let rows = certview_export::write_xlsx(path, table.records(), columns)
    .with_context(|| format!("exporting to {}", path.display()))?;
  tracing::info!(rows, path = %path.display(), "exported");
  Ok(())
}
