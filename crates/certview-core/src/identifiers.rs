//! The list of tax identifiers queued for lookup.

/// Insertion-ordered identifiers with set semantics on membership.
///
/// Input is free text; the only validation is "not blank and not already
/// present". No format or checksum check is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierList {
  ids: Vec<String>,
}

impl IdentifierList {
  pub fn new() -> Self { Self::default() }

  /// Append `id` (trimmed). Returns `false` when it was blank or already
  /// present.
  pub fn add(&mut self, id: &str) -> bool {
    let id = id.trim();
    if id.is_empty() || self.contains(id) {
      return false;
    }
    self.ids.push(id.to_string());
    true
  }

  /// Remove the entry equal to `id` (trimmed, as in [`add`](Self::add)).
  /// Returns `false` if none matched.
  pub fn remove(&mut self, id: &str) -> bool {
    let id = id.trim();
    let before = self.ids.len();
    self.ids.retain(|existing| existing != id);
    self.ids.len() != before
  }

  /// Add each identifier found in pasted text, split on commas, semicolons
  /// and whitespace. Returns how many were new.
  pub fn extend_delimited(&mut self, text: &str) -> usize {
    text
      .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
      .filter(|piece| self.add(piece))
      .count()
  }

  pub fn contains(&self, id: &str) -> bool { self.ids.iter().any(|e| e == id) }

  pub fn as_slice(&self) -> &[String] { &self.ids }

  pub fn iter(&self) -> impl Iterator<Item = &str> { self.ids.iter().map(String::as_str) }

  pub fn len(&self) -> usize { self.ids.len() }

  pub fn is_empty(&self) -> bool { self.ids.is_empty() }

  pub fn clear(&mut self) { self.ids.clear(); }

  /// Comma-delimited form used by batch lookups.
  pub fn joined(&self) -> String { self.ids.join(",") }
}
