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


//! Series aggregate engine
//!
//! Series are not stored: a book's sibling set is every book whose
//! `series_name` is exactly (case-sensitively) the same non-blank string.
//! `SeriesIndex` groups one snapshot's books by that name and derives, per
//! series, the status and gap categories that apply and, per book, its
//! position. The index lives only as long as one evaluation.
//!
//! # Categories
//! - Status: `fully_read`, `not_started`, `reading`, `completed`, `ongoing`
//! - Gaps: `any_gap`, `missing_first`, `missing_latest`, `duplicate_number`
//! - Position: `first_in_series`, `last_in_series`, `next_unread`
//!
//! Several categories can apply to one series at once (`completed` and
//! `reading`, for example).

use crate::catalog::BookRecord;
use crate::storage::models::ReadStatus;
use std::collections::{BTreeSet, HashMap};

/// Series-wide read/ownership status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesStatus {
    FullyRead,
    NotStarted,
    Reading,
    Completed,
    Ongoing,
}

impl SeriesStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fully_read" => Some(SeriesStatus::FullyRead),
            "not_started" => Some(SeriesStatus::NotStarted),
            "reading" => Some(SeriesStatus::Reading),
            "completed" => Some(SeriesStatus::Completed),
            "ongoing" => Some(SeriesStatus::Ongoing),
            _ => None,
        }
    }
}

/// Holes and collisions in a series' numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesGap {
    AnyGap,
    MissingFirst,
    MissingLatest,
    DuplicateNumber,
}

impl SeriesGap {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "any_gap" => Some(SeriesGap::AnyGap),
            "missing_first" => Some(SeriesGap::MissingFirst),
            "missing_latest" => Some(SeriesGap::MissingLatest),
            "duplicate_number" => Some(SeriesGap::DuplicateNumber),
            _ => None,
        }
    }
}

/// Position of an individual book within its series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesPosition {
    FirstInSeries,
    LastInSeries,
    NextUnread,
}

impl SeriesPosition {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "first_in_series" => Some(SeriesPosition::FirstInSeries),
            "last_in_series" => Some(SeriesPosition::LastInSeries),
            "next_unread" => Some(SeriesPosition::NextUnread),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Sibling {
    book_id: i64,
    number: Option<f64>,
    total: Option<i32>,
    status: ReadStatus,
}

/// Derived facts of one sibling set
#[derive(Debug, Clone, Default)]
pub struct SeriesFacts {
    book_ids: Vec<i64>,
    statuses: Vec<SeriesStatus>,
    gaps: Vec<SeriesGap>,
    min_number: Option<f64>,
    max_number: Option<f64>,
    next_unread: Vec<i64>,
}

impl SeriesFacts {
    fn derive(siblings: &[Sibling]) -> Self {
        let numbers: Vec<f64> = siblings.iter().filter_map(|s| s.number).collect();
        // Siblings may disagree on the total; the largest one wins
        let total = siblings.iter().filter_map(|s| s.total).max();
        let owns_final = total.map(|t| numbers.iter().any(|n| *n == f64::from(t)));

        let mut statuses = Vec::new();
        if siblings.iter().all(|s| s.status == ReadStatus::Read) {
            statuses.push(SeriesStatus::FullyRead);
        }
        if siblings.iter().all(|s| s.status == ReadStatus::Unread) {
            statuses.push(SeriesStatus::NotStarted);
        }
        if siblings.iter().any(|s| s.status.is_in_progress()) {
            statuses.push(SeriesStatus::Reading);
        }
        match owns_final {
            Some(true) => statuses.push(SeriesStatus::Completed),
            Some(false) => statuses.push(SeriesStatus::Ongoing),
            None => {}
        }

        let mut gaps = Vec::new();
        let whole: BTreeSet<i64> = numbers.iter().map(|n| n.trunc() as i64).collect();
        if let (Some(low), Some(high)) = (whole.first(), whole.last()) {
            let span = high.abs_diff(*low).checked_add(1);
            if span.map_or(true, |span| span > whole.len() as u64) {
                gaps.push(SeriesGap::AnyGap);
            }
        }
        if !numbers.iter().any(|n| *n == 1.0) && numbers.iter().any(|n| *n > 1.0) {
            gaps.push(SeriesGap::MissingFirst);
        }
        if owns_final == Some(false) {
            gaps.push(SeriesGap::MissingLatest);
        }
        let mut sorted = numbers.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        if sorted.windows(2).any(|pair| pair[0] == pair[1]) {
            gaps.push(SeriesGap::DuplicateNumber);
        }

        Self {
            book_ids: siblings.iter().map(|s| s.book_id).collect(),
            statuses,
            gaps,
            min_number: sorted.first().copied(),
            max_number: sorted.last().copied(),
            next_unread: next_unread(siblings),
        }
    }

    pub fn book_ids(&self) -> &[i64] {
        &self.book_ids
    }

    pub fn has_status(&self, status: SeriesStatus) -> bool {
        self.statuses.contains(&status)
    }

    pub fn has_gap(&self, gap: SeriesGap) -> bool {
        self.gaps.contains(&gap)
    }

    /// Position test for one sibling; books without a number never match
    pub fn is_at(&self, book_id: i64, number: Option<f64>, position: SeriesPosition) -> bool {
        let Some(number) = number else {
            return false;
        };
        match position {
            SeriesPosition::FirstInSeries => self.min_number == Some(number),
            SeriesPosition::LastInSeries => self.max_number == Some(number),
            SeriesPosition::NextUnread => self.next_unread.contains(&book_id),
        }
    }
}

/// Lowest-numbered UNREAD siblings, provided something before them was started
fn next_unread(siblings: &[Sibling]) -> Vec<i64> {
    let lowest_unread = siblings
        .iter()
        .filter(|s| s.status == ReadStatus::Unread)
        .filter_map(|s| s.number)
        .min_by(|a, b| a.total_cmp(b));

    let Some(lowest) = lowest_unread else {
        return Vec::new();
    };

    let started = siblings.iter().any(|s| {
        s.status != ReadStatus::Unread && s.number.map_or(false, |n| n < lowest)
    });
    if !started {
        return Vec::new();
    }

    siblings
        .iter()
        .filter(|s| s.status == ReadStatus::Unread && s.number == Some(lowest))
        .map(|s| s.book_id)
        .collect()
}

/// Sibling sets of one snapshot, keyed by exact series name
#[derive(Debug, Clone, Default)]
pub struct SeriesIndex {
    series: HashMap<String, SeriesFacts>,
}

impl SeriesIndex {
    /// Group books into sibling sets
    ///
    /// `status_of` resolves the acting user's read status for a book id
    /// (absence must already be mapped to UNREAD).
    pub fn build<'a, I, F>(books: I, status_of: F) -> Self
    where
        I: IntoIterator<Item = &'a BookRecord>,
        F: Fn(i64) -> ReadStatus,
    {
        let mut grouped: HashMap<&'a str, Vec<Sibling>> = HashMap::new();
        for record in books {
            let Some(name) = record.book.series_key() else {
                continue;
            };
            grouped.entry(name).or_default().push(Sibling {
                book_id: record.id(),
                number: record.book.series_number,
                total: record.book.series_total,
                status: status_of(record.id()),
            });
        }

        let series = grouped
            .into_iter()
            .map(|(name, siblings)| (name.to_string(), SeriesFacts::derive(&siblings)))
            .collect();
        Self { series }
    }

    /// Facts of the book's sibling set; `None` for books outside any series
    pub fn facts_for(&self, record: &BookRecord) -> Option<&SeriesFacts> {
        record
            .book
            .series_key()
            .and_then(|name| self.series.get(name))
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::{book, series_book};

    fn index(books: &[BookRecord], statuses: &[(i64, ReadStatus)]) -> SeriesIndex {
        let statuses: HashMap<i64, ReadStatus> = statuses.iter().copied().collect();
        SeriesIndex::build(books, |id| {
            statuses.get(&id).copied().unwrap_or(ReadStatus::Unread)
        })
    }

    #[test]
    fn test_category_tokens() {
        assert_eq!(SeriesStatus::parse("Fully_Read"), Some(SeriesStatus::FullyRead));
        assert_eq!(SeriesGap::parse("duplicate_number"), Some(SeriesGap::DuplicateNumber));
        assert_eq!(SeriesPosition::parse("next_unread"), Some(SeriesPosition::NextUnread));
        assert_eq!(SeriesStatus::parse("abandoned"), None);
    }

    #[test]
    fn test_non_series_books_have_no_facts() {
        let books = vec![book(1, "Standalone"), series_book(2, "  ", Some(1.0), None)];
        let idx = index(&books, &[]);
        assert_eq!(idx.series_count(), 0);
        assert!(idx.facts_for(&books[0]).is_none());
        assert!(idx.facts_for(&books[1]).is_none());
    }

    #[test]
    fn test_series_names_are_case_sensitive() {
        let books = vec![
            series_book(1, "Expanse", Some(1.0), None),
            series_book(2, "expanse", Some(2.0), None),
        ];
        let idx = index(&books, &[]);
        assert_eq!(idx.series_count(), 2);
    }

    #[test]
    fn test_completed_with_gap() {
        let books = vec![
            series_book(1, "Foo", Some(1.0), Some(3)),
            series_book(3, "Foo", Some(3.0), Some(3)),
        ];
        let idx = index(&books, &[(1, ReadStatus::Read), (3, ReadStatus::Read)]);
        let facts = idx.facts_for(&books[0]).unwrap();

        assert!(facts.has_status(SeriesStatus::Completed));
        assert!(facts.has_status(SeriesStatus::FullyRead));
        assert!(!facts.has_status(SeriesStatus::Ongoing));
        assert!(facts.has_gap(SeriesGap::AnyGap));
        assert!(!facts.has_gap(SeriesGap::MissingFirst));
        assert!(!facts.has_gap(SeriesGap::MissingLatest));
        assert_eq!(facts.book_ids(), &[1, 3]);
    }

    #[test]
    fn test_ongoing_and_missing_latest() {
        let books = vec![
            series_book(1, "Bar", Some(2.0), Some(5)),
            series_book(2, "Bar", Some(3.0), None),
        ];
        let idx = index(&books, &[(1, ReadStatus::Reading)]);
        let facts = idx.facts_for(&books[1]).unwrap();

        assert!(facts.has_status(SeriesStatus::Ongoing));
        assert!(facts.has_status(SeriesStatus::Reading));
        assert!(!facts.has_status(SeriesStatus::NotStarted));
        assert!(facts.has_gap(SeriesGap::MissingLatest));
        assert!(facts.has_gap(SeriesGap::MissingFirst));
        assert!(!facts.has_gap(SeriesGap::AnyGap));
    }

    #[test]
    fn test_no_total_means_neither_completed_nor_ongoing() {
        let books = vec![series_book(1, "Open", Some(1.0), None)];
        let facts_idx = index(&books, &[]);
        let facts = facts_idx.facts_for(&books[0]).unwrap();
        assert!(!facts.has_status(SeriesStatus::Completed));
        assert!(!facts.has_status(SeriesStatus::Ongoing));
        assert!(facts.has_status(SeriesStatus::NotStarted));
    }

    #[test]
    fn test_extreme_numbers_do_not_overflow() {
        let books = vec![
            series_book(1, "Huge", Some(0.0), None),
            series_book(2, "Huge", Some(1e19), None),
            series_book(3, "Wide", Some(-1e19), None),
            series_book(4, "Wide", Some(1e19), None),
            series_book(5, "Negative", Some(-2.0), None),
            series_book(6, "Negative", Some(-1.0), None),
        ];
        let idx = index(&books, &[]);

        assert!(idx.facts_for(&books[0]).unwrap().has_gap(SeriesGap::AnyGap));
        assert!(idx.facts_for(&books[2]).unwrap().has_gap(SeriesGap::AnyGap));
        assert!(!idx.facts_for(&books[4]).unwrap().has_gap(SeriesGap::AnyGap));
    }

    #[test]
    fn test_duplicate_numbers() {
        let books = vec![
            series_book(1, "Dup", Some(2.0), None),
            series_book(2, "Dup", Some(2.0), None),
            series_book(3, "Dup", None, None),
        ];
        let idx = index(&books, &[]);
        assert!(idx.facts_for(&books[0]).unwrap().has_gap(SeriesGap::DuplicateNumber));
    }

    #[test]
    fn test_fractional_numbers_for_position() {
        let books = vec![
            series_book(1, "Frac", Some(0.5), None),
            series_book(2, "Frac", Some(1.0), None),
            series_book(3, "Frac", Some(2.0), None),
            series_book(4, "Frac", None, None),
        ];
        let idx = index(&books, &[]);
        let facts = idx.facts_for(&books[0]).unwrap();

        assert!(facts.is_at(1, Some(0.5), SeriesPosition::FirstInSeries));
        assert!(!facts.is_at(2, Some(1.0), SeriesPosition::FirstInSeries));
        assert!(facts.is_at(3, Some(2.0), SeriesPosition::LastInSeries));
        assert!(!facts.is_at(4, None, SeriesPosition::FirstInSeries));
        assert!(!facts.is_at(4, None, SeriesPosition::LastInSeries));
    }

    #[test]
    fn test_next_unread_requires_started_series() {
        let books = vec![
            series_book(1, "Saga", Some(1.0), None),
            series_book(2, "Saga", Some(2.0), None),
            series_book(3, "Saga", Some(3.0), None),
        ];

        let started = index(&books, &[(1, ReadStatus::Read)]);
        let facts = started.facts_for(&books[0]).unwrap();
        assert!(facts.is_at(2, Some(2.0), SeriesPosition::NextUnread));
        assert!(!facts.is_at(3, Some(3.0), SeriesPosition::NextUnread));
        assert!(!facts.is_at(1, Some(1.0), SeriesPosition::NextUnread));

        let untouched = index(&books, &[]);
        let facts = untouched.facts_for(&books[0]).unwrap();
        assert!(!facts.is_at(1, Some(1.0), SeriesPosition::NextUnread));

        let finished = index(
            &books,
            &[(1, ReadStatus::Read), (2, ReadStatus::Read), (3, ReadStatus::Read)],
        );
        let facts = finished.facts_for(&books[0]).unwrap();
        assert!((1..=3).all(|id| !facts.is_at(id, Some(id as f64), SeriesPosition::NextUnread)));
    }

    #[test]
    fn test_next_unread_ignores_started_books_numbered_higher() {
        let books = vec![
            series_book(1, "Skip", Some(1.0), None),
            series_book(2, "Skip", Some(2.0), None),
        ];
        let idx = index(&books, &[(2, ReadStatus::Reading)]);
        let facts = idx.facts_for(&books[0]).unwrap();
        assert!(!facts.is_at(1, Some(1.0), SeriesPosition::NextUnread));
    }
}
