//! Comparator engine.
//!
//! Ordering is defined in terms of the descending comparator: ascending is
//! its exact negation, so ties compare equal under both directions. There is
//! no secondary key; equal rows keep their input order because
//! [`slice::sort_by`] is stable.

use std::{cmp::Ordering, fmt, str::FromStr};

use crate::Error;

// ─── Direction ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
  #[default]
  Ascending,
  Descending,
}

impl SortDirection {
  pub fn flipped(self) -> Self {
    match self {
      Self::Ascending => Self::Descending,
      Self::Descending => Self::Ascending,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Ascending => "asc",
      Self::Descending => "desc",
    }
  }
}

// ─── Keys ────────────────────────────────────────────────────────────────────

/// A record field the table can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
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

impl SortKey {
  pub const ALL: [SortKey; 9] = [
    SortKey::TaxId,
    SortKey::Name,
    SortKey::Phone,
    SortKey::Email,
    SortKey::Certification,
    SortKey::FirstCertification,
    SortKey::LastUpdate,
    SortKey::DueDate,
    SortKey::Status,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::TaxId => "taxId",
      Self::Name => "name",
      Self::Phone => "phone",
      Self::Email => "email",
      Self::Certification => "certification",
      Self::FirstCertification => "firstCertification",
      Self::LastUpdate => "lastUpdate",
      Self::DueDate => "dueDate",
      Self::Status => "status",
    }
  }
}

impl fmt::Display for SortKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for SortKey {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let key = match s {
      "taxId" | "cpf" => Self::TaxId,
      "name" => Self::Name,
      "phone" => Self::Phone,
      "email" => Self::Email,
      "certification" => Self::Certification,
      "firstCertification" => Self::FirstCertification,
      "lastUpdate" => Self::LastUpdate,
      "dueDate" | "maturity" => Self::DueDate,
      "status" | "situation" => Self::Status,
      other => return Err(Error::UnknownSortKey(other.to_string())),
    };
    Ok(key)
  }
}

/// The active ordering of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
  pub key:       SortKey,
  pub direction: SortDirection,
}

impl Default for SortState {
  fn default() -> Self {
    Self { key: SortKey::Name, direction: SortDirection::Ascending }
  }
}

impl SortState {
  /// Header-click semantics: the same key flips the direction, a new key
  /// starts ascending.
  pub fn request(&mut self, key: SortKey) {
    if self.key == key {
      self.direction = self.direction.flipped();
    } else {
      self.key = key;
      self.direction = SortDirection::Ascending;
    }
  }
}

// ─── Values ──────────────────────────────────────────────────────────────────

/// A field value extracted for comparison. Variants order as declared, so a
/// missing value sorts before any present one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue<'a> {
  Missing,
  /// Parsed value, then the raw digits so `0123` and `123` stay distinct.
  Number(u64, &'a str),
  Text(&'a str),
}

impl<'a> SortValue<'a> {
  pub fn optional(value: Option<&'a str>) -> Self {
    value.map_or(Self::Missing, Self::Text)
  }

  /// Identifiers made only of digits compare numerically.
  pub fn identifier(value: &'a str) -> Self {
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
      if let Ok(n) = value.parse() {
        return Self::Number(n, value);
      }
    }
    Self::Text(value)
  }
}

/// Anything the table can sort.
pub trait Sortable {
  fn sort_value(&self, key: SortKey) -> SortValue<'_>;
}

// ─── Comparators ─────────────────────────────────────────────────────────────

/// `Less` when `b < a`, `Greater` when `b > a`, otherwise `Equal`.
pub fn descending<T: PartialOrd + ?Sized>(a: &T, b: &T) -> Ordering {
  if b < a {
    Ordering::Less
  } else if b > a {
    Ordering::Greater
  } else {
    Ordering::Equal
  }
}

pub fn compare<R: Sortable>(direction: SortDirection, key: SortKey, a: &R, b: &R) -> Ordering {
  let ord = descending(&a.sort_value(key), &b.sort_value(key));
  match direction {
    SortDirection::Descending => ord,
    SortDirection::Ascending => ord.reverse(),
  }
}

pub fn comparator<R: Sortable>(
  direction: SortDirection,
  key: SortKey,
) -> impl Fn(&R, &R) -> Ordering {
  move |a, b| compare(direction, key, a, b)
}

/// Stable in-place sort by `state`.
pub fn sort_records<R: Sortable>(records: &mut [R], state: SortState) {
  records.sort_by(comparator(state.direction, state.key));
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Clone, PartialEq)]
  struct Row {
    id:   &'static str,
    name: &'static str,
  }

  impl Sortable for Row {
    fn sort_value(&self, key: SortKey) -> SortValue<'_> {
      match key {
        SortKey::TaxId => SortValue::identifier(self.id),
        SortKey::Name => SortValue::Text(self.name),
        _ => SortValue::Missing,
      }
    }
  }

  fn rows() -> Vec<Row> {
    vec![
      Row { id: "33333333333", name: "Bruno" },
      Row { id: "98674653600", name: "Abel" },
      Row { id: "11111111111", name: "Carla" },
      Row { id: "900", name: "Abel" },
    ]
  }

  fn names(rows: &[Row]) -> Vec<&str> { rows.iter().map(|r| r.name).collect() }

  #[test]
  fn descending_comparator_contract() {
    assert_eq!(descending(&2, &1), Ordering::Less);
    assert_eq!(descending(&1, &2), Ordering::Greater);
    assert_eq!(descending("x", "x"), Ordering::Equal);
  }

  #[test]
  fn ties_are_equal_in_both_directions() {
    let a = Row { id: "1", name: "Abel" };
    let b = Row { id: "2", name: "Abel" };
    for dir in [SortDirection::Ascending, SortDirection::Descending] {
      assert_eq!(compare(dir, SortKey::Name, &a, &b), Ordering::Equal);
    }
  }

  #[test]
  fn ascending_is_reverse_of_descending_on_distinct_keys() {
    let mut asc = rows();
    let mut desc = rows();
    sort_records(&mut asc, SortState { key: SortKey::TaxId, direction: SortDirection::Ascending });
    sort_records(&mut desc, SortState { key: SortKey::TaxId, direction: SortDirection::Descending });
    desc.reverse();
    assert_eq!(asc, desc);
  }

  #[test]
  fn numeric_identifiers_compare_as_numbers() {
    let mut r = rows();
    sort_records(&mut r, SortState { key: SortKey::TaxId, direction: SortDirection::Ascending });
    let ids: Vec<&str> = r.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["900", "11111111111", "33333333333", "98674653600"]);
  }

  #[test]
  fn leading_zeros_do_not_make_identifiers_tie() {
    let padded = Row { id: "0123", name: "Abel" };
    let bare = Row { id: "123", name: "Bruno" };
    assert_eq!(compare(SortDirection::Ascending, SortKey::TaxId, &padded, &bare), Ordering::Less);
    assert_eq!(compare(SortDirection::Descending, SortKey::TaxId, &padded, &bare), Ordering::Greater);
    assert!(SortValue::identifier("0123") < SortValue::identifier("124"));
  }

  #[test]
  fn equal_keys_keep_input_order() {
    let mut r = rows();
    sort_records(&mut r, SortState::default());
    assert_eq!(names(&r), vec!["Abel", "Abel", "Bruno", "Carla"]);
    assert_eq!(r[0].id, "98674653600");
    assert_eq!(r[1].id, "900");

    let mut r = rows();
    sort_records(&mut r, SortState { key: SortKey::Name, direction: SortDirection::Descending });
    assert_eq!(names(&r), vec!["Carla", "Bruno", "Abel", "Abel"]);
    assert_eq!(r[2].id, "98674653600");
  }

  #[test]
  fn key_without_values_keeps_original_order() {
    let mut r = rows();
    sort_records(&mut r, SortState { key: SortKey::Email, direction: SortDirection::Descending });
    assert_eq!(r, rows());
  }

  #[test]
  fn request_toggles_then_resets() {
    let mut state = SortState::default();
    state.request(SortKey::Name);
    assert_eq!(state.direction, SortDirection::Descending);
    state.request(SortKey::Name);
    assert_eq!(state.direction, SortDirection::Ascending);
    state.request(SortKey::Name);
    state.request(SortKey::DueDate);
    assert_eq!(state, SortState { key: SortKey::DueDate, direction: SortDirection::Ascending });
  }

  #[test]
  fn parses_key_names_and_legacy_ids() {
    assert_eq!("dueDate".parse::<SortKey>().unwrap(), SortKey::DueDate);
    assert_eq!("maturity".parse::<SortKey>().unwrap(), SortKey::DueDate);
    assert_eq!("cpf".parse::<SortKey>().unwrap(), SortKey::TaxId);
    assert!("bogus".parse::<SortKey>().is_err());
    for key in SortKey::ALL {
      assert_eq!(key.as_str().parse::<SortKey>().unwrap(), key);
    }
  }
}
