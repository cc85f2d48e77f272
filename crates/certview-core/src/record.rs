//! Person and certification records as returned by the lookup service.
//!
//! A person owns zero or more certifications. The nested shape is kept as-is
//! in the result store; the flat tabular form is derived on export.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sort::{SortKey, SortValue, Sortable};

/// The single status value the service uses for an active certification.
pub const ACTIVE_STATUS: &str = "Ativa";

// ─── Certification ───────────────────────────────────────────────────────────

/// One certification held by a person.
///
/// Dates are kept as the literal strings the service returns (`DD/MM/YYYY`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
  /// Certification code, e.g. `CPA-20`.
  pub name:                     String,
  #[serde(default)]
  pub first_certification_date: String,
  #[serde(default)]
  pub last_update_date:         String,
  #[serde(default)]
  pub due_date:                 String,
  #[serde(default)]
  pub status:                   String,
}

impl Certification {
  /// The normalised status; anything but [`ACTIVE_STATUS`] is inactive.
  pub fn status(&self) -> CertificationStatus {
    CertificationStatus::from_raw(&self.status)
  }
}

/// Two-valued display status of a certification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CertificationStatus {
  Active,
  Inactive,
}

impl CertificationStatus {
  pub fn from_raw(raw: &str) -> Self {
    if raw == ACTIVE_STATUS { Self::Active } else { Self::Inactive }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Inactive => "inactive",
    }
  }

  pub fn is_active(&self) -> bool { matches!(self, Self::Active) }
}

impl fmt::Display for CertificationStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Person ──────────────────────────────────────────────────────────────────

/// A person looked up by tax identifier (CPF).
///
/// `phone` and `email` are only filled in by some retrieval modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
  #[serde(alias = "cpf")]
  pub tax_id:         String,
  pub name:           String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub phone:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:          Option<String>,
  /// Free-text status shown when the person holds no certification.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub note:           Option<String>,
  #[serde(default)]
  pub certifications: Vec<Certification>,
}

impl PersonRecord {
  /// Convenience constructor with no contact fields and no certifications.
  pub fn new(tax_id: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      tax_id:         tax_id.into(),
      name:           name.into(),
      phone:          None,
      email:          None,
      note:           None,
      certifications: Vec::new(),
    }
  }

  pub fn has_contact(&self) -> bool {
    self.phone.is_some() || self.email.is_some()
  }

  fn first_certification(&self) -> Option<&Certification> {
    self.certifications.first()
  }
}

/// The collection returned by one lookup or ingest call.
pub type RecordSet = Vec<PersonRecord>;

impl Sortable for PersonRecord {
  fn sort_value(&self, key: SortKey) -> SortValue<'_> {
    let cert = self.first_certification();
    match key {
      SortKey::TaxId => SortValue::identifier(&self.tax_id),
      SortKey::Name => SortValue::Text(&self.name),
      SortKey::Phone => SortValue::optional(self.phone.as_deref()),
      SortKey::Email => SortValue::optional(self.email.as_deref()),
      SortKey::Certification => SortValue::optional(cert.map(|c| c.name.as_str())),
      SortKey::FirstCertification => {
        SortValue::optional(cert.map(|c| c.first_certification_date.as_str()))
      }
      SortKey::LastUpdate => SortValue::optional(cert.map(|c| c.last_update_date.as_str())),
      SortKey::DueDate => SortValue::optional(cert.map(|c| c.due_date.as_str())),
      SortKey::Status => SortValue::optional(cert.map(|c| c.status().as_str())),
    }
  }
}

// ─── Tiers ───────────────────────────────────────────────────────────────────

/// Display emphasis for a certification code. Not used for ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
  Primary,
  Secondary,
  Other,
}

/// Which certification codes belong to the primary and secondary tiers.
///
/// Codes are matched case-insensitively, ignoring `-`, `_` and spaces, so
/// `CPA-20`, `cpa20` and `CPA 20` are the same code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRules {
  pub primary:   Vec<String>,
  pub secondary: Vec<String>,
}

impl Default for TierRules {
  fn default() -> Self {
    Self {
      primary:   vec!["CPA-20".into()],
      secondary: vec!["CPA-10".into()],
    }
  }
}

impl TierRules {
  pub fn classify(&self, code: &str) -> Tier {
    let code = normalize_code(code);
    let matches = |list: &[String]| list.iter().any(|c| normalize_code(c) == code);
    if matches(&self.primary) {
      Tier::Primary
    } else if matches(&self.secondary) {
      Tier::Secondary
    } else {
      Tier::Other
    }
  }
}

fn normalize_code(code: &str) -> String {
  code
    .chars()
    .filter(|c| !matches!(c, '-' | '_') && !c.is_whitespace())
    .flat_map(char::to_uppercase)
    .collect()
}
