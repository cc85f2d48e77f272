//! Column sets shared by the on-screen table and the spreadsheet export.
//!
//! Both surfaces read the same [`ColumnSet`] so the exported file's columns
//! line up with the table.

use crate::{record::PersonRecord, sort::SortKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
  TaxId,
  Name,
  Phone,
  Email,
  Certification,
  FirstCertification,
  LastUpdate,
  DueDate,
  Status,
}

impl Column {
  /// Header label.
  pub fn label(&self) -> &'static str {
    match self {
      Self::TaxId => "CPF",
      Self::Name => "Nome",
      Self::Phone => "Telefone",
      Self::Email => "E-mail",
      Self::Certification => "Certificação",
      Self::FirstCertification => "1ª Certificação",
      Self::LastUpdate => "Ultima Atualização",
      Self::DueDate => "Vencimento",
      Self::Status => "Situação",
    }
  }

  pub fn sort_key(&self) -> SortKey {
    match self {
      Self::TaxId => SortKey::TaxId,
      Self::Name => SortKey::Name,
      Self::Phone => SortKey::Phone,
      Self::Email => SortKey::Email,
      Self::Certification => SortKey::Certification,
      Self::FirstCertification => SortKey::FirstCertification,
      Self::LastUpdate => SortKey::LastUpdate,
      Self::DueDate => SortKey::DueDate,
      Self::Status => SortKey::Status,
    }
  }
}

/// An ordered selection of columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSet {
  columns: Vec<Column>,
}

impl ColumnSet {
  pub fn new(columns: Vec<Column>) -> Self { Self { columns } }

  /// Identifier lookups: no contact columns.
  pub fn basic() -> Self {
    Self::new(vec![
      Column::TaxId,
      Column::Name,
      Column::Certification,
      Column::FirstCertification,
      Column::LastUpdate,
      Column::DueDate,
      Column::Status,
    ])
  }

  /// Lookups that return phone and email.
  pub fn with_contact() -> Self {
    Self::new(vec![
      Column::TaxId,
      Column::Name,
      Column::Phone,
      Column::Email,
      Column::Certification,
      Column::FirstCertification,
      Column::LastUpdate,
      Column::DueDate,
      Column::Status,
    ])
  }

  /// Contact columns appear when any record carries a phone or an email.
  pub fn detect(records: &[PersonRecord]) -> Self {
    if records.iter().any(PersonRecord::has_contact) {
      Self::with_contact()
    } else {
      Self::basic()
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = Column> + '_ { self.columns.iter().copied() }

  pub fn len(&self) -> usize { self.columns.len() }

  pub fn is_empty(&self) -> bool { self.columns.is_empty() }

  pub fn position(&self, column: Column) -> Option<usize> {
    self.columns.iter().position(|&c| c == column)
  }

  pub fn get(&self, index: usize) -> Option<Column> { self.columns.get(index).copied() }
}

impl Default for ColumnSet {
  fn default() -> Self { Self::basic() }
}
