// Shelf - Smart shelves for a personal media library
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Catalog storage
//!
//! SQLite persistence for the catalog the shelf rules run against. Other
//! services (ingestion, metadata reconciliation, device sync) write these
//! rows; the rule engine reads them as a `CatalogSnapshot`.
//!
//! # Database Schema
//! - Libraries, Users
//! - Books: metadata plus the series triple
//! - Authors / Categories / Moods / Tags with junction tables
//! - ComicEntities (characters, teams, locations) and ComicCreators
//! - BookFiles: one primary file per book, optional audiobook duration
//! - UserBookProgress: one row per (user, book)
//!
//! # Usage Example
//! ```no_run
//! use shelf_core::rules::{RuleCompiler, RuleGroup};
//! use shelf_core::storage::{models::NewBook, queries, Database};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new("./library.db").await?;
//! let library_id = queries::insert_library(db.pool(), "Main").await?;
//! queries::insert_book(db.pool(), &NewBook::new(library_id, "Dune".to_string())).await?;
//!
//! let tree = RuleGroup::from_json(r#"{"type":"group","join":"and","rules":[]}"#)?;
//! let filter = RuleCompiler::new(1).compile(&tree);
//! let books = queries::find_matching_books(db.pool(), &filter).await?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::{Database, DatabaseStats};
pub use models::{
    Book, BookFile, ComicCreator, ComicEntityKind, CreatorRole, NameCollection, NewBook,
    NewBookFile, ReadStatus, UserBookProgress,
};
