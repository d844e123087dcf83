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


//! Database models
//!
//! Row types for the catalog tables. Ingestion, metadata reconciliation and
//! device sync write these rows; the rule engine only reads them.
//!
//! **SQLite Adaptations:**
//! - Enums (read status, creator role, comic entity kind) stored as upper-case TEXT
//! - Dates stored as ISO 8601 TEXT (`YYYY-MM-DD`), timestamps as RFC 3339 TEXT
//! - Series membership is not a table: it is the (`series_name`, `series_number`,
//!   `series_total`) triple on the book row
//! - Owned collections (authors, categories, moods, tags) use junction tables

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// ENUMS
// ============================================================================

/// Read status of a book for one user
///
/// A missing progress row is not a status; rules see it as the `UNSET` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadStatus {
    Unread,
    Reading,
    ReReading,
    Read,
    PartiallyRead,
    Paused,
    WontRead,
    Abandoned,
}

impl ReadStatus {
    /// Token for "no progress row"
    pub const UNSET: &'static str = "UNSET";

    pub fn as_str(&self) -> &'static str {
        match self {
            ReadStatus::Unread => "UNREAD",
            ReadStatus::Reading => "READING",
            ReadStatus::ReReading => "RE_READING",
            ReadStatus::Read => "READ",
            ReadStatus::PartiallyRead => "PARTIALLY_READ",
            ReadStatus::Paused => "PAUSED",
            ReadStatus::WontRead => "WONT_READ",
            ReadStatus::Abandoned => "ABANDONED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "UNREAD" => Some(ReadStatus::Unread),
            "READING" => Some(ReadStatus::Reading),
            "RE_READING" => Some(ReadStatus::ReReading),
            "READ" => Some(ReadStatus::Read),
            "PARTIALLY_READ" => Some(ReadStatus::PartiallyRead),
            "PAUSED" => Some(ReadStatus::Paused),
            "WONT_READ" => Some(ReadStatus::WontRead),
            "ABANDONED" => Some(ReadStatus::Abandoned),
            _ => None,
        }
    }

    /// Currently being read (first time or again)
    pub fn is_in_progress(&self) -> bool {
        matches!(self, ReadStatus::Reading | ReadStatus::ReReading)
    }
}

/// Role of a comic creator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreatorRole {
    Writer,
    Penciller,
    Inker,
    Colorist,
    Letterer,
    CoverArtist,
    Editor,
}

impl CreatorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreatorRole::Writer => "WRITER",
            CreatorRole::Penciller => "PENCILLER",
            CreatorRole::Inker => "INKER",
            CreatorRole::Colorist => "COLORIST",
            CreatorRole::Letterer => "LETTERER",
            CreatorRole::CoverArtist => "COVER_ARTIST",
            CreatorRole::Editor => "EDITOR",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "WRITER" => Some(CreatorRole::Writer),
            "PENCILLER" => Some(CreatorRole::Penciller),
            "INKER" => Some(CreatorRole::Inker),
            "COLORIST" => Some(CreatorRole::Colorist),
            "LETTERER" => Some(CreatorRole::Letterer),
            "COVER_ARTIST" => Some(CreatorRole::CoverArtist),
            "EDITOR" => Some(CreatorRole::Editor),
            _ => None,
        }
    }
}

/// Kind of named comic entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComicEntityKind {
    Character,
    Team,
    Location,
}

impl ComicEntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComicEntityKind::Character => "CHARACTER",
            ComicEntityKind::Team => "TEAM",
            ComicEntityKind::Location => "LOCATION",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CHARACTER" => Some(ComicEntityKind::Character),
            "TEAM" => Some(ComicEntityKind::Team),
            "LOCATION" => Some(ComicEntityKind::Location),
            _ => None,
        }
    }
}

/// Owned name collections stored through junction tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameCollection {
    Authors,
    Categories,
    Moods,
    Tags,
}

impl NameCollection {
    pub const ALL: [NameCollection; 4] = [
        NameCollection::Authors,
        NameCollection::Categories,
        NameCollection::Moods,
        NameCollection::Tags,
    ];

    /// (entity table, junction table, id column)
    pub(crate) fn tables(&self) -> (&'static str, &'static str, &'static str) {
        match self {
            NameCollection::Authors => ("Authors", "BookAuthors", "author_id"),
            NameCollection::Categories => ("Categories", "BookCategories", "category_id"),
            NameCollection::Moods => ("Moods", "BookMoods", "mood_id"),
            NameCollection::Tags => ("Tags", "BookTags", "tag_id"),
        }
    }
}

// ============================================================================
// MAIN ENTITIES
// ============================================================================

/// Book entity with its resolved metadata
///
/// Lock flags and provider merge state live with the metadata collaborator;
/// the values here are already final.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Book {
    /// Primary key (auto-increment)
    pub book_id: i64,
    pub library_id: i64,

    pub title: String,
    #[sqlx(default)]
    pub subtitle: Option<String>,
    #[sqlx(default)]
    pub description: Option<String>,
    #[sqlx(default)]
    pub publisher: Option<String>,
    #[sqlx(default)]
    pub language: Option<String>,
    #[sqlx(default)]
    pub isbn13: Option<String>,
    #[sqlx(default)]
    pub isbn10: Option<String>,
    #[sqlx(default)]
    pub published_date: Option<NaiveDate>,
    #[sqlx(default)]
    pub page_count: Option<i32>,
    pub is_physical: bool,
    /// How well the stored metadata matched providers (0-100)
    #[sqlx(default)]
    pub metadata_match_score: Option<f64>,

    // Series triple; a blank name means "not in a series"
    #[sqlx(default)]
    pub series_name: Option<String>,
    #[sqlx(default)]
    pub series_number: Option<f64>,
    #[sqlx(default)]
    pub series_total: Option<i32>,

    pub added_on: DateTime<Utc>,
}

impl Book {
    /// Series name if the book belongs to a series (non-blank)
    pub fn series_key(&self) -> Option<&str> {
        self.series_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }
}

/// File backing a book (ebook, comic archive, audiobook)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct BookFile {
    pub file_id: i64,
    pub book_id: i64,
    pub file_name: String,
    /// Lower-case extension style type (`epub`, `pdf`, `cbz`, `m4b`)
    pub file_type: String,
    #[sqlx(default)]
    pub file_size_kb: Option<i64>,
    pub is_primary: bool,
    /// Audiobook files only
    #[sqlx(default)]
    pub duration_seconds: Option<i64>,
}

/// Comic creator credited on a book
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ComicCreator {
    pub book_id: i64,
    pub name: String,
    pub role: String,
}

impl ComicCreator {
    pub fn get_role(&self) -> Option<CreatorRole> {
        CreatorRole::parse(&self.role)
    }
}

/// Reading state of one book for one user
///
/// Each reader integration (PDF/EPUB/CBX viewers, audiobook player, KOReader,
/// Kobo) records its own percentage.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct UserBookProgress {
    pub user_id: i64,
    pub book_id: i64,
    #[sqlx(default)]
    pub read_status: Option<String>,
    #[sqlx(default)]
    pub pdf_progress: Option<f64>,
    #[sqlx(default)]
    pub epub_progress: Option<f64>,
    #[sqlx(default)]
    pub cbx_progress: Option<f64>,
    #[sqlx(default)]
    pub audiobook_progress: Option<f64>,
    #[sqlx(default)]
    pub koreader_progress: Option<f64>,
    #[sqlx(default)]
    pub kobo_progress: Option<f64>,
    #[sqlx(default)]
    pub personal_rating: Option<f64>,
    #[sqlx(default)]
    pub date_finished: Option<DateTime<Utc>>,
    #[sqlx(default)]
    pub last_read_time: Option<DateTime<Utc>>,
}

impl UserBookProgress {
    pub fn new(user_id: i64, book_id: i64) -> Self {
        Self {
            user_id,
            book_id,
            read_status: None,
            pdf_progress: None,
            epub_progress: None,
            cbx_progress: None,
            audiobook_progress: None,
            koreader_progress: None,
            kobo_progress: None,
            personal_rating: None,
            date_finished: None,
            last_read_time: None,
        }
    }

    /// Builder-style status setter
    pub fn with_status(mut self, status: ReadStatus) -> Self {
        self.read_status = Some(status.as_str().to_string());
        self
    }

    /// Get read status as enum (unknown text is treated as no status)
    pub fn get_read_status(&self) -> Option<ReadStatus> {
        self.read_status.as_deref().and_then(ReadStatus::parse)
    }

    /// Per-source progress percentages, in a fixed order
    pub fn source_percentages(&self) -> [Option<f64>; 6] {
        [
            self.pdf_progress,
            self.epub_progress,
            self.cbx_progress,
            self.audiobook_progress,
            self.koreader_progress,
            self.kobo_progress,
        ]
    }
}

// ============================================================================
// NEW RECORD STRUCTS (for inserts)
// ============================================================================

/// New book record for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBook {
    pub library_id: i64,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub publisher: Option<String>,
    pub language: Option<String>,
    pub isbn13: Option<String>,
    pub isbn10: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub page_count: Option<i32>,
    pub is_physical: bool,
    pub metadata_match_score: Option<f64>,
    pub series_name: Option<String>,
    pub series_number: Option<f64>,
    pub series_total: Option<i32>,
    /// Defaults to the insertion time when `None`
    pub added_on: Option<DateTime<Utc>>,
}

impl NewBook {
    pub fn new(library_id: i64, title: String) -> Self {
        Self {
            library_id,
            title,
            subtitle: None,
            description: None,
            publisher: None,
            language: None,
            isbn13: None,
            isbn10: None,
            published_date: None,
            page_count: None,
            is_physical: false,
            metadata_match_score: None,
            series_name: None,
            series_number: None,
            series_total: None,
            added_on: None,
        }
    }

    /// Place the book in a series
    pub fn in_series(mut self, name: &str, number: Option<f64>, total: Option<i32>) -> Self {
        self.series_name = Some(name.to_string());
        self.series_number = number;
        self.series_total = total;
        self
    }
}

/// New file record for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBookFile {
    pub book_id: i64,
    pub file_name: String,
    pub file_type: String,
    pub file_size_kb: Option<i64>,
    pub is_primary: bool,
    pub duration_seconds: Option<i64>,
}

impl NewBookFile {
    pub fn new(book_id: i64, file_name: String, file_type: String) -> Self {
        Self {
            book_id,
            file_name,
            file_type,
            file_size_kb: None,
            is_primary: true,
            duration_seconds: None,
        }
    }
}
