//! Core types and view-model logic for certview.
//!
//! This crate is free of HTTP and file-format dependencies. It owns the
//! record model, the comparator-based sort engine, the identifier list, the
//! paginated result table and the lookup orchestrator. The lookup service
//! itself is abstracted behind [`lookup::LookupService`].

// Native `async fn` in traits; the `Send` bounds are spelled out on the
// trait's return types.
#![allow(async_fn_in_trait)]

pub mod columns;
pub mod error;
pub mod identifiers;
pub mod lookup;
pub mod record;
pub mod sort;
pub mod table;

pub use error::{Error, Result};
