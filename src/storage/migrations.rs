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


//! Database migrations
//!
//! Migrations are plain SQL executed at runtime and tracked in `_migrations`,
//! so a database file can be opened without a build-time connection.

use crate::error::Result;
use sqlx::{Executor, SqlitePool};

/// Run all pending migrations in order
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    create_migrations_table(pool).await?;

    run_migration(pool, 1, "catalog_schema", create_catalog_schema(pool)).await?;

    Ok(())
}

async fn create_migrations_table(pool: &SqlitePool) -> Result<()> {
    pool.execute(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .await?;

    Ok(())
}

/// Run a single migration if it hasn't been applied yet
async fn run_migration(
    pool: &SqlitePool,
    id: i32,
    name: &str,
    migration_fn: impl std::future::Future<Output = Result<()>>,
) -> Result<()> {
    let applied: Option<i32> = sqlx::query_scalar("SELECT id FROM _migrations WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    if applied.is_some() {
        return Ok(());
    }

    migration_fn.await?;

    sqlx::query("INSERT INTO _migrations (id, name) VALUES (?, ?)")
        .bind(id)
        .bind(name)
        .execute(pool)
        .await?;

    tracing::info!(id, name, "applied migration");
    Ok(())
}

async fn create_catalog_schema(pool: &SqlitePool) -> Result<()> {
    pool.execute(
        r#"
-- ============================================================================
-- OWNERS
-- ============================================================================

CREATE TABLE IF NOT EXISTS Libraries (
    library_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS Users (
    user_id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE
);

-- ============================================================================
-- BOOKS
-- ============================================================================

CREATE TABLE IF NOT EXISTS Books (
    book_id INTEGER PRIMARY KEY AUTOINCREMENT,
    library_id INTEGER NOT NULL,

    title TEXT NOT NULL,
    subtitle TEXT,
    description TEXT,
    publisher TEXT,
    language TEXT,
    isbn13 TEXT,
    isbn10 TEXT,
    published_date TEXT,  -- YYYY-MM-DD
    page_count INTEGER,
    is_physical INTEGER NOT NULL DEFAULT 0,
    metadata_match_score REAL,

    -- Series triple; blank/NULL name = not in a series
    series_name TEXT,
    series_number REAL,
    series_total INTEGER,

    added_on TEXT NOT NULL,

    FOREIGN KEY (library_id) REFERENCES Libraries(library_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_books_library ON Books(library_id);
CREATE INDEX IF NOT EXISTS idx_books_series_name ON Books(series_name);

-- ============================================================================
-- OWNED COLLECTIONS
-- ============================================================================

CREATE TABLE IF NOT EXISTS Authors (
    author_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS BookAuthors (
    book_id INTEGER NOT NULL,
    author_id INTEGER NOT NULL,
    PRIMARY KEY (book_id, author_id),
    FOREIGN KEY (book_id) REFERENCES Books(book_id) ON DELETE CASCADE,
    FOREIGN KEY (author_id) REFERENCES Authors(author_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS Categories (
    category_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS BookCategories (
    book_id INTEGER NOT NULL,
    category_id INTEGER NOT NULL,
    PRIMARY KEY (book_id, category_id),
    FOREIGN KEY (book_id) REFERENCES Books(book_id) ON DELETE CASCADE,
    FOREIGN KEY (category_id) REFERENCES Categories(category_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS Moods (
    mood_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS BookMoods (
    book_id INTEGER NOT NULL,
    mood_id INTEGER NOT NULL,
    PRIMARY KEY (book_id, mood_id),
    FOREIGN KEY (book_id) REFERENCES Books(book_id) ON DELETE CASCADE,
    FOREIGN KEY (mood_id) REFERENCES Moods(mood_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS Tags (
    tag_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS BookTags (
    book_id INTEGER NOT NULL,
    tag_id INTEGER NOT NULL,
    PRIMARY KEY (book_id, tag_id),
    FOREIGN KEY (book_id) REFERENCES Books(book_id) ON DELETE CASCADE,
    FOREIGN KEY (tag_id) REFERENCES Tags(tag_id) ON DELETE CASCADE
);

-- ============================================================================
-- COMIC METADATA
-- ============================================================================

CREATE TABLE IF NOT EXISTS ComicEntities (
    book_id INTEGER NOT NULL,
    kind TEXT NOT NULL,  -- CHARACTER, TEAM, LOCATION
    name TEXT NOT NULL,
    PRIMARY KEY (book_id, kind, name),
    FOREIGN KEY (book_id) REFERENCES Books(book_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS ComicCreators (
    book_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    role TEXT NOT NULL,  -- WRITER, PENCILLER, INKER, COLORIST, LETTERER, COVER_ARTIST, EDITOR
    PRIMARY KEY (book_id, name, role),
    FOREIGN KEY (book_id) REFERENCES Books(book_id) ON DELETE CASCADE
);

-- ============================================================================
-- FILES
-- ============================================================================

CREATE TABLE IF NOT EXISTS BookFiles (
    file_id INTEGER PRIMARY KEY AUTOINCREMENT,
    book_id INTEGER NOT NULL,
    file_name TEXT NOT NULL,
    file_type TEXT NOT NULL,
    file_size_kb INTEGER,
    is_primary INTEGER NOT NULL DEFAULT 0,
    duration_seconds INTEGER,
    FOREIGN KEY (book_id) REFERENCES Books(book_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_book_files_book ON BookFiles(book_id);

-- ============================================================================
-- READING PROGRESS
-- ============================================================================

CREATE TABLE IF NOT EXISTS UserBookProgress (
    user_id INTEGER NOT NULL,
    book_id INTEGER NOT NULL,
    read_status TEXT,
    pdf_progress REAL,
    epub_progress REAL,
    cbx_progress REAL,
    audiobook_progress REAL,
    koreader_progress REAL,
    kobo_progress REAL,
    personal_rating REAL,
    date_finished TEXT,
    last_read_time TEXT,
    PRIMARY KEY (user_id, book_id),
    FOREIGN KEY (user_id) REFERENCES Users(user_id) ON DELETE CASCADE,
    FOREIGN KEY (book_id) REFERENCES Books(book_id) ON DELETE CASCADE
);
        "#,
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::Database;

    #[tokio::test]
    async fn test_migrations() {
        let db = Database::new_in_memory()
            .await
            .expect("Failed to create database");

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '_migrations' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .expect("Failed to query tables");

        let expected_tables = vec![
            "Authors",
            "BookAuthors",
            "BookCategories",
            "BookFiles",
            "BookMoods",
            "BookTags",
            "Books",
            "Categories",
            "ComicCreators",
            "ComicEntities",
            "Libraries",
            "Moods",
            "Tags",
            "UserBookProgress",
            "Users",
        ];

        assert_eq!(tables, expected_tables, "Missing or extra tables");
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::new_in_memory()
            .await
            .expect("Failed to create database");

        run_migrations(db.pool()).await.expect("Second run failed");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _migrations")
            .fetch_one(db.pool())
            .await
            .expect("Failed to query migrations");

        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let db = Database::new_in_memory()
            .await
            .expect("Failed to create database");

        let fk_enabled: i32 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(db.pool())
            .await
            .expect("Failed to check foreign keys");

        assert_eq!(fk_enabled, 1, "Foreign keys not enabled");
    }
}
