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


//! Catalog snapshot
//!
//! A consistent, read-only view of the catalog for one compile-and-execute
//! cycle: every book with its owned collections, comic metadata and files,
//! plus all progress rows. `storage::queries::load_catalog_snapshot` reads it
//! inside a single transaction so series and progress facts are never torn.

use crate::rules::field::{CollectionField, ScalarField};
use crate::rules::value::FieldValue;
use crate::storage::models::{Book, BookFile, ComicCreator, CreatorRole, UserBookProgress};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Comic-specific metadata of a book
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComicDetails {
    pub characters: Vec<String>,
    pub teams: Vec<String>,
    pub locations: Vec<String>,
    pub creators: Vec<ComicCreator>,
}

impl ComicDetails {
    pub fn has_creator(&self, role: CreatorRole) -> bool {
        self.creators
            .iter()
            .any(|creator| creator.get_role() == Some(role))
    }
}

/// A book with everything it owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub book: Book,
    pub authors: Vec<String>,
    pub categories: Vec<String>,
    pub moods: Vec<String>,
    pub tags: Vec<String>,
    pub comic: Option<ComicDetails>,
    pub files: Vec<BookFile>,
}

impl BookRecord {
    pub fn new(book: Book) -> Self {
        Self {
            book,
            authors: Vec::new(),
            categories: Vec::new(),
            moods: Vec::new(),
            tags: Vec::new(),
            comic: None,
            files: Vec::new(),
        }
    }

    pub fn id(&self) -> i64 {
        self.book.book_id
    }

    /// Primary file, falling back to the first file on record
    pub fn primary_file(&self) -> Option<&BookFile> {
        self.files
            .iter()
            .find(|file| file.is_primary)
            .or_else(|| self.files.first())
    }

    /// Longest audiobook duration among the book's files
    pub fn audiobook_duration(&self) -> Option<i64> {
        self.files.iter().filter_map(|file| file.duration_seconds).max()
    }

    /// Resolve a direct scalar
    pub fn scalar(&self, field: ScalarField) -> FieldValue<'_> {
        let book = &self.book;
        match field {
            ScalarField::Library => FieldValue::Number(book.library_id as f64),
            ScalarField::Title => FieldValue::Text(&book.title),
            ScalarField::Subtitle => FieldValue::text(book.subtitle.as_deref()),
            ScalarField::Description => FieldValue::text(book.description.as_deref()),
            ScalarField::Publisher => FieldValue::text(book.publisher.as_deref()),
            ScalarField::Language => FieldValue::text(book.language.as_deref()),
            ScalarField::Isbn13 => FieldValue::text(book.isbn13.as_deref()),
            ScalarField::Isbn10 => FieldValue::text(book.isbn10.as_deref()),
            ScalarField::PublishedDate => FieldValue::date(book.published_date),
            ScalarField::PageCount => FieldValue::number(book.page_count.map(f64::from)),
            ScalarField::IsPhysical => FieldValue::Boolean(book.is_physical),
            ScalarField::MetadataScore => FieldValue::number(book.metadata_match_score),
            ScalarField::AddedOn => FieldValue::Timestamp(book.added_on),
            ScalarField::SeriesName => FieldValue::text(book.series_name.as_deref()),
            ScalarField::SeriesNumber => FieldValue::number(book.series_number),
            ScalarField::SeriesTotal => FieldValue::number(book.series_total.map(f64::from)),
            ScalarField::FileType => {
                FieldValue::text(self.primary_file().map(|file| file.file_type.as_str()))
            }
            ScalarField::FileSize => FieldValue::number(
                self.primary_file()
                    .and_then(|file| file.file_size_kb)
                    .map(|kb| kb as f64),
            ),
            ScalarField::AudiobookDuration => {
                FieldValue::number(self.audiobook_duration().map(|secs| secs as f64))
            }
        }
    }

    /// Resolve an owned collection (empty when absent)
    pub fn collection(&self, field: CollectionField) -> &[String] {
        let comic = self.comic.as_ref();
        match field {
            CollectionField::Authors => &self.authors,
            CollectionField::Categories => &self.categories,
            CollectionField::Moods => &self.moods,
            CollectionField::Tags => &self.tags,
            CollectionField::ComicCharacters => comic.map(|c| c.characters.as_slice()).unwrap_or_default(),
            CollectionField::ComicTeams => comic.map(|c| c.teams.as_slice()).unwrap_or_default(),
            CollectionField::ComicLocations => comic.map(|c| c.locations.as_slice()).unwrap_or_default(),
        }
    }
}

/// Read-only catalog view for one compile-and-execute cycle
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    books: Vec<BookRecord>,
    progress: HashMap<(i64, i64), UserBookProgress>,
    // Positions in `books`
    by_id: HashMap<i64, usize>,
    by_series: HashMap<String, Vec<usize>>,
}

impl CatalogSnapshot {
    pub fn new(books: Vec<BookRecord>, progress: Vec<UserBookProgress>) -> Self {
        let progress = progress
            .into_iter()
            .map(|row| ((row.user_id, row.book_id), row))
            .collect();

        let mut by_id = HashMap::with_capacity(books.len());
        let mut by_series: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, record) in books.iter().enumerate() {
            by_id.entry(record.id()).or_insert(position);
            if let Some(name) = record.book.series_key() {
                by_series.entry(name.to_string()).or_default().push(position);
            }
        }

        Self {
            books,
            progress,
            by_id,
            by_series,
        }
    }

    pub fn books(&self) -> &[BookRecord] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn book(&self, book_id: i64) -> Option<&BookRecord> {
        self.by_id.get(&book_id).map(|&position| &self.books[position])
    }

    /// Books sharing the record's exact series name, the record included
    pub fn siblings(&self, record: &BookRecord) -> Vec<&BookRecord> {
        record
            .book
            .series_key()
            .and_then(|name| self.by_series.get(name))
            .map(|positions| positions.iter().map(|&p| &self.books[p]).collect())
            .unwrap_or_default()
    }

    /// Progress row of a (user, book) pair, if any
    pub fn progress_for(&self, user_id: i64, book_id: i64) -> Option<&UserBookProgress> {
        self.progress.get(&(user_id, book_id))
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn file(book_id: i64, file_type: &str, primary: bool, duration: Option<i64>) -> BookFile {
        BookFile {
            file_id: 0,
            book_id,
            file_name: format!("book.{}", file_type),
            file_type: file_type.to_string(),
            file_size_kb: Some(2048),
            is_primary: primary,
            duration_seconds: duration,
        }
    }

    #[test]
    fn test_primary_file_resolution() {
        let mut record = book(1, "Dune");
        assert!(record.primary_file().is_none());
        assert_eq!(record.scalar(ScalarField::FileType), FieldValue::Null);

        record.files.push(file(1, "pdf", false, None));
        record.files.push(file(1, "epub", true, None));
        assert_eq!(record.scalar(ScalarField::FileType), FieldValue::Text("epub"));
        assert_eq!(record.scalar(ScalarField::FileSize), FieldValue::Number(2048.0));
    }

    #[test]
    fn test_audiobook_duration_takes_longest_file() {
        let mut record = book(1, "Dune");
        record.files.push(file(1, "m4b", true, Some(3_600)));
        record.files.push(file(1, "mp3", false, Some(7_200)));
        assert_eq!(record.audiobook_duration(), Some(7_200));
    }

    #[test]
    fn test_comic_collections_default_to_empty() {
        let mut record = book(1, "Watchmen");
        assert!(record.collection(CollectionField::ComicTeams).is_empty());

        record.comic = Some(ComicDetails {
            teams: vec!["Minutemen".to_string()],
            ..Default::default()
        });
        assert_eq!(record.collection(CollectionField::ComicTeams), ["Minutemen".to_string()]);
    }

    #[test]
    fn test_progress_lookup_is_per_user() {
        use crate::storage::models::ReadStatus;

        let snapshot = CatalogSnapshot::new(
            vec![book(1, "Dune")],
            vec![progress(7, 1, ReadStatus::Read)],
        );
        assert!(snapshot.progress_for(7, 1).is_some());
        assert!(snapshot.progress_for(8, 1).is_none());
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_lookup_by_id_and_series() {
        let snapshot = CatalogSnapshot::new(
            vec![
                series_book(10, "Foo", Some(1.0), None),
                book(11, "Standalone"),
                series_book(12, "Foo", Some(2.0), None),
                series_book(13, "foo", Some(1.0), None),
            ],
            Vec::new(),
        );

        assert_eq!(snapshot.book(12).map(BookRecord::id), Some(12));
        assert!(snapshot.book(99).is_none());

        let foo = snapshot.book(10).unwrap();
        let siblings: Vec<i64> = snapshot.siblings(foo).into_iter().map(BookRecord::id).collect();
        assert_eq!(siblings, vec![10, 12]);

        let standalone = snapshot.book(11).unwrap();
        assert!(snapshot.siblings(standalone).is_empty());
    }
}
