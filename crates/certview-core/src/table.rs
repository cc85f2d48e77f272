//! Result store and the paginated, sorted table view over it.
//!
//! The store holds the canonical record set, which is also the export source.
//! Sorting only ever happens on a clone made for the visible page.

use std::ops::Range;

use crate::sort::{SortKey, SortState, Sortable, sort_records};

/// Page sizes offered by the pager.
pub const PAGE_SIZE_OPTIONS: [usize; 3] = [5, 10, 25];

pub const DEFAULT_PAGE_SIZE: usize = 5;

// ─── ResultStore ─────────────────────────────────────────────────────────────

/// The record set fetched by the last successful lookup.
#[derive(Debug, Clone)]
pub struct ResultStore<R> {
  records: Vec<R>,
}

impl<R> Default for ResultStore<R> {
  fn default() -> Self { Self { records: Vec::new() } }
}

impl<R: Sortable + Clone> ResultStore<R> {
  /// Replace the whole set.
  pub fn set(&mut self, records: Vec<R>) { self.records = records; }

  pub fn clear(&mut self) { self.records.clear(); }

  pub fn records(&self) -> &[R] { &self.records }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }

  /// Sort a clone of the set and return rows `[i*n, i*n + n)`, clamped to the
  /// set length.
  pub fn visible_page(&self, sort: SortState, page_index: usize, page_size: usize) -> Vec<R> {
    let range = page_bounds(self.records.len(), page_index, page_size);
    if range.is_empty() {
      return Vec::new();
    }
    let mut sorted = self.records.clone();
    sort_records(&mut sorted, sort);
    sorted.drain(range).collect()
  }
}

fn page_bounds(len: usize, page_index: usize, page_size: usize) -> Range<usize> {
  let start = page_index.saturating_mul(page_size).min(len);
  let end = start.saturating_add(page_size).min(len);
  start..end
}

// ─── TableView ───────────────────────────────────────────────────────────────

/// Sort and pagination state over a [`ResultStore`].
#[derive(Debug, Clone)]
pub struct TableView<R> {
  sort:       SortState,
  page_index: usize,
  page_size:  usize,
  store:      ResultStore<R>,
}

impl<R> Default for TableView<R> {
  fn default() -> Self {
    Self {
      sort:       SortState::default(),
      page_index: 0,
      page_size:  DEFAULT_PAGE_SIZE,
      store:      ResultStore::default(),
    }
  }
}

impl<R: Sortable + Clone> TableView<R> {
  pub fn new() -> Self { Self::default() }

  pub fn with_page_size(page_size: usize) -> Self {
    let mut view = Self::default();
    view.set_page_size(page_size);
    view
  }

  // ── Records ───────────────────────────────────────────────────────────────

  pub fn store(&self) -> &ResultStore<R> { &self.store }

  pub fn records(&self) -> &[R] { self.store.records() }

  /// Replace the record set and go back to the first page.
  pub fn set_records(&mut self, records: Vec<R>) {
    self.store.set(records);
    self.page_index = 0;
  }

  pub fn clear(&mut self) {
    self.store.clear();
    self.page_index = 0;
  }

  // ── Sorting ───────────────────────────────────────────────────────────────

  pub fn sort(&self) -> SortState { self.sort }

  pub fn request_sort(&mut self, key: SortKey) { self.sort.request(key); }

  pub fn set_sort(&mut self, sort: SortState) { self.sort = sort; }

  /// Like [`request_sort`](Self::request_sort) for a key given by name.
  /// Unknown names leave the ordering unchanged and return `false`.
  pub fn request_sort_by_name(&mut self, name: &str) -> bool {
    match name.parse() {
      Ok(key) => {
        self.request_sort(key);
        true
      }
      Err(_) => false,
    }
  }

  // ── Pagination ────────────────────────────────────────────────────────────

  pub fn page_index(&self) -> usize { self.page_index }

  pub fn page_size(&self) -> usize { self.page_size }

  /// Changing the page size always returns to the first page. Zero is
  /// ignored.
  pub fn set_page_size(&mut self, page_size: usize) {
    if page_size == 0 || page_size == self.page_size {
      return;
    }
    self.page_size = page_size;
    self.page_index = 0;
  }

  /// Step to the next entry of [`PAGE_SIZE_OPTIONS`], wrapping around.
  pub fn cycle_page_size(&mut self) {
    let next = PAGE_SIZE_OPTIONS
      .iter()
      .position(|&n| n == self.page_size)
      .map_or(PAGE_SIZE_OPTIONS[0], |i| PAGE_SIZE_OPTIONS[(i + 1) % PAGE_SIZE_OPTIONS.len()]);
    self.set_page_size(next);
  }

  /// Number of pages; an empty set still has one (empty) page.
  pub fn page_count(&self) -> usize { self.store.len().div_ceil(self.page_size).max(1) }

  /// Move to `page_index`, clamped to the last page.
  pub fn set_page(&mut self, page_index: usize) {
    self.page_index = page_index.min(self.page_count() - 1);
  }

  pub fn next_page(&mut self) { self.set_page(self.page_index + 1); }

  pub fn prev_page(&mut self) { self.set_page(self.page_index.saturating_sub(1)); }

  /// 1-based `(from, to, total)` for a "1–5 of 13" label; `(0, 0, 0)` when
  /// empty.
  pub fn page_range(&self) -> (usize, usize, usize) {
    let total = self.store.len();
    let range = page_bounds(total, self.page_index, self.page_size);
    if range.is_empty() {
      (0, 0, total)
    } else {
      (range.start + 1, range.end, total)
    }
  }

  pub fn visible_page(&self) -> Vec<R> {
    self.store.visible_page(self.sort, self.page_index, self.page_size)
  }
}
