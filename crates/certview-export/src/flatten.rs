//! One-to-many expansion of person records into flat rows.
//!
//! A person with no certification yields exactly one row carrying its note
//! in the certification column. Otherwise each certification yields one row
//! repeating the person's identifying fields.

use certview_core::{
  columns::{Column, ColumnSet},
  record::{Certification, PersonRecord},
};

/// A single spreadsheet row. Absent values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRow {
  pub tax_id:              String,
  pub name:                String,
  pub phone:               String,
  pub email:               String,
  /// Certification code, or the person's note when it has none.
  pub certification:       String,
  pub first_certification: String,
  pub last_update:         String,
  pub due_date:            String,
  /// `active` / `inactive`; empty on a note row.
  pub status:              String,
}

impl FlatRow {
  fn person(record: &PersonRecord) -> Self {
    Self {
      tax_id: record.tax_id.clone(),
      name: record.name.clone(),
      phone: record.phone.clone().unwrap_or_default(),
      email: record.email.clone().unwrap_or_default(),
      ..Self::default()
    }
  }

  fn with_certification(mut self, cert: &Certification) -> Self {
    self.certification = cert.name.clone();
    self.first_certification = cert.first_certification_date.clone();
    self.last_update = cert.last_update_date.clone();
    self.due_date = cert.due_date.clone();
    self.status = cert.status().as_str().to_string();
    self
  }

  pub fn cell(&self, column: Column) -> &str {
    match column {
      Column::TaxId => &self.tax_id,
      Column::Name => &self.name,
      Column::Phone => &self.phone,
      Column::Email => &self.email,
      Column::Certification => &self.certification,
      Column::FirstCertification => &self.first_certification,
      Column::LastUpdate => &self.last_update,
      Column::DueDate => &self.due_date,
      Column::Status => &self.status,
    }
  }

  /// Cells in `columns` order.
  pub fn cells(&self, columns: &ColumnSet) -> Vec<&str> {
    columns.iter().map(|c| self.cell(c)).collect()
  }
}

/// Flatten `records`, in order.
pub fn flatten(records: &[PersonRecord]) -> Vec<FlatRow> {
  let mut rows = Vec::with_capacity(records.iter().map(|r| r.certifications.len().max(1)).sum());
  for record in records {
    if record.certifications.is_empty() {
      rows.push(FlatRow {
        certification: record.note.clone().unwrap_or_default(),
        ..FlatRow::person(record)
      });
    } else {
      let base = FlatRow::person(record);
      rows.extend(
        record
          .certifications
          .iter()
          .map(|cert| base.clone().with_certification(cert)),
      );
    }
  }
  rows
}
