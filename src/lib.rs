//! Shelf core: smart shelves for a personal media library
//!
//! A smart shelf is a user-authored rule tree. `rules` compiles the tree into
//! a `BookFilter`; `storage` loads a consistent `CatalogSnapshot` from SQLite
//! that the filter is executed against.

pub mod catalog;
pub mod config;
pub mod error;
pub mod rules;
pub mod storage;

pub use catalog::{BookRecord, CatalogSnapshot};
pub use config::ShelfConfig;
pub use error::{Result, ShelfError};
pub use rules::{BookFilter, RuleCompiler, RuleGroup};
