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


//! Database query functions
//!
//! Write helpers for the collaborators that own catalog rows, and the
//! snapshot loader the rule engine reads through.
//!
//! # Query Patterns
//! - Free async functions over `&SqlitePool`
//! - Runtime-checked `sqlx::query` / `query_as` (no build-time database)
//! - The snapshot is read inside one transaction

use crate::catalog::{BookRecord, CatalogSnapshot, ComicDetails};
use crate::error::{Result, ShelfError};
use crate::rules::BookFilter;
use crate::storage::models::*;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::HashMap;

// ============================================================================
// OWNERS
// ============================================================================

/// Insert a library, returning its id
pub async fn insert_library(pool: &SqlitePool, name: &str) -> Result<i64> {
    let result = sqlx::query("INSERT INTO Libraries (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Insert a user, returning its id
pub async fn insert_user(pool: &SqlitePool, username: &str) -> Result<i64> {
    let result = sqlx::query("INSERT INTO Users (username) VALUES (?)")
        .bind(username)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

// ============================================================================
// BOOK QUERIES
// ============================================================================

/// Insert a new book
///
/// Returns the book_id of the inserted book.
pub async fn insert_book(pool: &SqlitePool, book: &NewBook) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO Books (
            library_id, title, subtitle, description, publisher, language,
            isbn13, isbn10, published_date, page_count, is_physical,
            metadata_match_score, series_name, series_number, series_total, added_on
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(book.library_id)
    .bind(&book.title)
    .bind(&book.subtitle)
    .bind(&book.description)
    .bind(&book.publisher)
    .bind(&book.language)
    .bind(&book.isbn13)
    .bind(&book.isbn10)
    .bind(book.published_date)
    .bind(book.page_count)
    .bind(book.is_physical)
    .bind(book.metadata_match_score)
    .bind(&book.series_name)
    .bind(book.series_number)
    .bind(book.series_total)
    .bind(book.added_on.unwrap_or_else(Utc::now))
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Find book by ID
pub async fn find_book_by_id(pool: &SqlitePool, book_id: i64) -> Result<Option<Book>> {
    let book = sqlx::query_as::<_, Book>("SELECT * FROM Books WHERE book_id = ?")
        .bind(book_id)
        .fetch_optional(pool)
        .await?;

    Ok(book)
}

/// Delete a book and (by cascade) everything it owns
pub async fn delete_book(pool: &SqlitePool, book_id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM Books WHERE book_id = ?")
        .bind(book_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ShelfError::not_found(format!("Book {}", book_id)));
    }
    Ok(())
}

pub async fn count_books(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Books")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

// ============================================================================
// OWNED COLLECTIONS
// ============================================================================

/// Attach a named member (author, category, mood, tag) to a book
///
/// The name row is shared between books; attaching twice is a no-op.
pub async fn add_to_collection(
    pool: &SqlitePool,
    book_id: i64,
    collection: NameCollection,
    name: &str,
) -> Result<()> {
    let (entity, junction, id_column) = collection.tables();

    sqlx::query(&format!("INSERT OR IGNORE INTO {} (name) VALUES (?)", entity))
        .bind(name)
        .execute(pool)
        .await?;

    let member_id: i64 = sqlx::query_scalar(&format!(
        "SELECT {} FROM {} WHERE name = ?",
        id_column, entity
    ))
    .bind(name)
    .fetch_one(pool)
    .await?;

    sqlx::query(&format!(
        "INSERT OR IGNORE INTO {} (book_id, {}) VALUES (?, ?)",
        junction, id_column
    ))
    .bind(book_id)
    .bind(member_id)
    .execute(pool)
    .await?;

    Ok(())
}

// ============================================================================
// COMIC METADATA
// ============================================================================

pub async fn add_comic_entity(
    pool: &SqlitePool,
    book_id: i64,
    kind: ComicEntityKind,
    name: &str,
) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO ComicEntities (book_id, kind, name) VALUES (?, ?, ?)")
        .bind(book_id)
        .bind(kind.as_str())
        .bind(name)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn add_comic_creator(
    pool: &SqlitePool,
    book_id: i64,
    role: CreatorRole,
    name: &str,
) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO ComicCreators (book_id, name, role) VALUES (?, ?, ?)")
        .bind(book_id)
        .bind(name)
        .bind(role.as_str())
        .execute(pool)
        .await?;

    Ok(())
}

// ============================================================================
// FILES
// ============================================================================

/// Insert a file record, returning its id
pub async fn insert_book_file(pool: &SqlitePool, file: &NewBookFile) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO BookFiles (book_id, file_name, file_type, file_size_kb, is_primary, duration_seconds)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(file.book_id)
    .bind(&file.file_name)
    .bind(&file.file_type)
    .bind(file.file_size_kb)
    .bind(file.is_primary)
    .bind(file.duration_seconds)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

// ============================================================================
// READING PROGRESS
// ============================================================================

/// Insert or replace the progress row of a (user, book) pair
pub async fn upsert_progress(pool: &SqlitePool, progress: &UserBookProgress) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO UserBookProgress (
            user_id, book_id, read_status, pdf_progress, epub_progress, cbx_progress,
            audiobook_progress, koreader_progress, kobo_progress, personal_rating,
            date_finished, last_read_time
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id, book_id) DO UPDATE SET
            read_status = excluded.read_status,
            pdf_progress = excluded.pdf_progress,
            epub_progress = excluded.epub_progress,
            cbx_progress = excluded.cbx_progress,
            audiobook_progress = excluded.audiobook_progress,
            koreader_progress = excluded.koreader_progress,
            kobo_progress = excluded.kobo_progress,
            personal_rating = excluded.personal_rating,
            date_finished = excluded.date_finished,
            last_read_time = excluded.last_read_time
        "#,
    )
    .bind(progress.user_id)
    .bind(progress.book_id)
    .bind(&progress.read_status)
    .bind(progress.pdf_progress)
    .bind(progress.epub_progress)
    .bind(progress.cbx_progress)
    .bind(progress.audiobook_progress)
    .bind(progress.koreader_progress)
    .bind(progress.kobo_progress)
    .bind(progress.personal_rating)
    .bind(progress.date_finished)
    .bind(progress.last_read_time)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn find_progress(
    pool: &SqlitePool,
    user_id: i64,
    book_id: i64,
) -> Result<Option<UserBookProgress>> {
    let progress = sqlx::query_as::<_, UserBookProgress>(
        "SELECT * FROM UserBookProgress WHERE user_id = ? AND book_id = ?",
    )
    .bind(user_id)
    .bind(book_id)
    .fetch_optional(pool)
    .await?;

    Ok(progress)
}

/// Remove a progress row; the book reads as UNSET for that user afterwards
pub async fn delete_progress(pool: &SqlitePool, user_id: i64, book_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM UserBookProgress WHERE user_id = ? AND book_id = ?")
        .bind(user_id)
        .bind(book_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Load the whole catalog in one read transaction
///
/// Series and progress facts derived from the snapshot are therefore never
/// computed from a half-written catalog.
pub async fn load_catalog_snapshot(pool: &SqlitePool) -> Result<CatalogSnapshot> {
    let mut tx = pool.begin().await?;

    let books = sqlx::query_as::<_, Book>("SELECT * FROM Books ORDER BY book_id")
        .fetch_all(&mut *tx)
        .await?;

    let mut records: Vec<BookRecord> = books.into_iter().map(BookRecord::new).collect();
    let index: HashMap<i64, usize> = records
        .iter()
        .enumerate()
        .map(|(i, record)| (record.id(), i))
        .collect();

    for collection in NameCollection::ALL {
        let (entity, junction, id_column) = collection.tables();
        let rows: Vec<(i64, String)> = sqlx::query_as(&format!(
            "SELECT j.book_id, e.name FROM {junction} j JOIN {entity} e ON e.{id_column} = j.{id_column} ORDER BY j.book_id, e.name",
        ))
        .fetch_all(&mut *tx)
        .await?;

        for (book_id, name) in rows {
            if let Some(&i) = index.get(&book_id) {
                let record = &mut records[i];
                match collection {
                    NameCollection::Authors => record.authors.push(name),
                    NameCollection::Categories => record.categories.push(name),
                    NameCollection::Moods => record.moods.push(name),
                    NameCollection::Tags => record.tags.push(name),
                }
            }
        }
    }

    let entities: Vec<(i64, String, String)> =
        sqlx::query_as("SELECT book_id, kind, name FROM ComicEntities ORDER BY book_id, name")
            .fetch_all(&mut *tx)
            .await?;

    for (book_id, kind, name) in entities {
        let Some(&i) = index.get(&book_id) else {
            continue;
        };
        let comic = records[i].comic.get_or_insert_with(ComicDetails::default);
        match ComicEntityKind::parse(&kind) {
            Some(ComicEntityKind::Character) => comic.characters.push(name),
            Some(ComicEntityKind::Team) => comic.teams.push(name),
            Some(ComicEntityKind::Location) => comic.locations.push(name),
            None => tracing::warn!(book_id, %kind, "skipping comic entity of unknown kind"),
        }
    }

    let creators = sqlx::query_as::<_, ComicCreator>(
        "SELECT book_id, name, role FROM ComicCreators ORDER BY book_id, name",
    )
    .fetch_all(&mut *tx)
    .await?;

    for creator in creators {
        if let Some(&i) = index.get(&creator.book_id) {
            records[i]
                .comic
                .get_or_insert_with(ComicDetails::default)
                .creators
                .push(creator);
        }
    }

    let files = sqlx::query_as::<_, BookFile>("SELECT * FROM BookFiles ORDER BY book_id, file_id")
        .fetch_all(&mut *tx)
        .await?;

    for file in files {
        if let Some(&i) = index.get(&file.book_id) {
            records[i].files.push(file);
        }
    }

    let progress = sqlx::query_as::<_, UserBookProgress>("SELECT * FROM UserBookProgress")
        .fetch_all(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::debug!(
        books = records.len(),
        progress_rows = progress.len(),
        "loaded catalog snapshot"
    );
    Ok(CatalogSnapshot::new(records, progress))
}

/// Execute a compiled filter against a fresh snapshot
pub async fn find_matching_books(pool: &SqlitePool, filter: &BookFilter) -> Result<Vec<BookRecord>> {
    let snapshot = load_catalog_snapshot(pool).await?;
    let matches: Vec<BookRecord> = filter.apply(&snapshot).into_iter().cloned().collect();

    tracing::debug!(
        user_id = filter.user_id(),
        matched = matches.len(),
        total = snapshot.len(),
        "executed shelf filter"
    );
    Ok(matches)
}

// ============================================================================
// STATISTICS
// ============================================================================

/// Row counts of the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub libraries: i64,
    pub users: i64,
    pub books: i64,
    /// Distinct non-blank series names
    pub series: i64,
    pub files: i64,
    pub progress_rows: i64,
}

pub async fn get_catalog_stats(pool: &SqlitePool) -> Result<CatalogStats> {
    let (libraries, users, books, series, files, progress_rows): (i64, i64, i64, i64, i64, i64) =
        sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM Libraries),
                (SELECT COUNT(*) FROM Users),
                (SELECT COUNT(*) FROM Books),
                (SELECT COUNT(DISTINCT series_name) FROM Books WHERE TRIM(series_name) != ''),
                (SELECT COUNT(*) FROM BookFiles),
                (SELECT COUNT(*) FROM UserBookProgress)
            "#,
        )
        .fetch_one(pool)
        .await?;

    Ok(CatalogStats {
        libraries,
        users,
        books,
        series,
        files,
        progress_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Rule, RuleCompiler, RuleField, RuleGroup, RuleOperator};
    use crate::storage::database::Database;

    async fn setup() -> (Database, i64, i64) {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let library_id = insert_library(db.pool(), "Main").await.expect("Failed to insert library");
        let user_id = insert_user(db.pool(), "reader").await.expect("Failed to insert user");
        (db, library_id, user_id)
    }

    #[tokio::test]
    async fn test_insert_and_find_book() {
        let (db, library_id, _) = setup().await;

        let mut new_book = NewBook::new(library_id, "Dune".to_string());
        new_book.page_count = Some(412);
        new_book.published_date = chrono::NaiveDate::from_ymd_opt(1965, 8, 1);

        let book_id = insert_book(db.pool(), &new_book).await.expect("Failed to insert book");
        assert!(book_id > 0);

        let book = find_book_by_id(db.pool(), book_id)
            .await
            .expect("Failed to find book")
            .expect("Book missing");
        assert_eq!(book.title, "Dune");
        assert_eq!(book.page_count, Some(412));
        assert_eq!(book.published_date, new_book.published_date);
        assert!(!book.is_physical);
        assert_eq!(book.series_key(), None);
    }

    #[tokio::test]
    async fn test_delete_missing_book() {
        let (db, _, _) = setup().await;
        let result = delete_book(db.pool(), 404).await;
        assert!(matches!(result, Err(ShelfError::RecordNotFound(_))));
    }

    #[tokio::test]
    async fn test_collections_are_shared_and_deduplicated() {
        let (db, library_id, _) = setup().await;
        let first = insert_book(db.pool(), &NewBook::new(library_id, "Good Omens".to_string()))
            .await
            .unwrap();
        let second = insert_book(db.pool(), &NewBook::new(library_id, "Discworld".to_string()))
            .await
            .unwrap();

        for book_id in [first, second, first] {
            add_to_collection(db.pool(), book_id, NameCollection::Authors, "Terry Pratchett")
                .await
                .expect("Failed to add author");
        }
        add_to_collection(db.pool(), first, NameCollection::Authors, "Neil Gaiman")
            .await
            .unwrap();

        let authors: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Authors")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(authors, 2);

        let snapshot = load_catalog_snapshot(db.pool()).await.expect("Failed to load snapshot");
        assert_eq!(
            snapshot.book(first).unwrap().authors,
            vec!["Neil Gaiman".to_string(), "Terry Pratchett".to_string()]
        );
        assert_eq!(snapshot.book(second).unwrap().authors, vec!["Terry Pratchett".to_string()]);
    }

    #[tokio::test]
    async fn test_progress_upsert_and_delete() {
        let (db, library_id, user_id) = setup().await;
        let book_id = insert_book(db.pool(), &NewBook::new(library_id, "Emma".to_string()))
            .await
            .unwrap();

        let mut progress = UserBookProgress::new(user_id, book_id).with_status(ReadStatus::Reading);
        progress.epub_progress = Some(25.0);
        upsert_progress(db.pool(), &progress).await.expect("Failed to insert progress");

        progress.read_status = Some(ReadStatus::Read.as_str().to_string());
        progress.date_finished = Some(Utc::now());
        upsert_progress(db.pool(), &progress).await.expect("Failed to update progress");

        let stored = find_progress(db.pool(), user_id, book_id)
            .await
            .unwrap()
            .expect("Progress missing");
        assert_eq!(stored.get_read_status(), Some(ReadStatus::Read));
        assert_eq!(stored.epub_progress, Some(25.0));
        assert!(stored.date_finished.is_some());

        assert!(delete_progress(db.pool(), user_id, book_id).await.unwrap());
        assert!(!delete_progress(db.pool(), user_id, book_id).await.unwrap());
        assert!(find_progress(db.pool(), user_id, book_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_snapshot_assembles_comic_and_files() {
        let (db, library_id, _) = setup().await;
        let book_id = insert_book(db.pool(), &NewBook::new(library_id, "Watchmen".to_string()))
            .await
            .unwrap();

        add_comic_entity(db.pool(), book_id, ComicEntityKind::Team, "Minutemen").await.unwrap();
        add_comic_entity(db.pool(), book_id, ComicEntityKind::Character, "Rorschach").await.unwrap();
        add_comic_creator(db.pool(), book_id, CreatorRole::Penciller, "Dave Gibbons").await.unwrap();

        let mut file = NewBookFile::new(book_id, "watchmen.cbz".to_string(), "cbz".to_string());
        file.file_size_kb = Some(81_920);
        insert_book_file(db.pool(), &file).await.unwrap();

        let snapshot = load_catalog_snapshot(db.pool()).await.unwrap();
        let record = snapshot.book(book_id).expect("Book missing from snapshot");
        let comic = record.comic.as_ref().expect("Comic details missing");

        assert_eq!(comic.teams, vec!["Minutemen".to_string()]);
        assert_eq!(comic.characters, vec!["Rorschach".to_string()]);
        assert!(comic.has_creator(CreatorRole::Penciller));
        assert_eq!(record.primary_file().map(|f| f.file_type.as_str()), Some("cbz"));
    }

    #[tokio::test]
    async fn test_find_matching_books() {
        let (db, library_id, user_id) = setup().await;
        let mut long = NewBook::new(library_id, "Long".to_string());
        long.page_count = Some(900);
        let long_id = insert_book(db.pool(), &long).await.unwrap();
        insert_book(db.pool(), &NewBook::new(library_id, "Short".to_string()))
            .await
            .unwrap();

        let tree = RuleGroup::and([
            Rule::new(RuleField::PageCount, RuleOperator::GreaterThan).value(500)
        ]);
        let filter = RuleCompiler::new(user_id).compile(&tree);
        let matches = find_matching_books(db.pool(), &filter).await.unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id(), long_id);
    }

    #[tokio::test]
    async fn test_catalog_stats() {
        let (db, library_id, user_id) = setup().await;
        let first = insert_book(
            db.pool(),
            &NewBook::new(library_id, "Saga 1".to_string()).in_series("Saga", Some(1.0), None),
        )
        .await
        .unwrap();
        insert_book(
            db.pool(),
            &NewBook::new(library_id, "Saga 2".to_string()).in_series("Saga", Some(2.0), None),
        )
        .await
        .unwrap();
        insert_book(db.pool(), &NewBook::new(library_id, "Solo".to_string()))
            .await
            .unwrap();
        upsert_progress(db.pool(), &UserBookProgress::new(user_id, first))
            .await
            .unwrap();

        let stats = get_catalog_stats(db.pool()).await.unwrap();
        assert_eq!(stats.books, 3);
        assert_eq!(stats.series, 1);
        assert_eq!(stats.progress_rows, 1);
        assert_eq!(stats.libraries, 1);
        assert_eq!(count_books(db.pool()).await.unwrap(), 3);
    }
}
