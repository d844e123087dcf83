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


//! Compiled predicates
//!
//! A `Predicate` is the compiled, side-effect free form of a rule tree. It is
//! evaluated book by book against an `EvalContext`, which pairs a catalog
//! snapshot with the acting user and the series facts derived from both.

use crate::catalog::{BookRecord, CatalogSnapshot};
use crate::rules::field::{CollectionField, ProgressField, ScalarField};
use crate::rules::operator::{CompiledTest, ValueTest};
use crate::rules::presence::PresenceKey;
use crate::rules::progress::{progress_value, series_read_status};
use crate::rules::series::{SeriesGap, SeriesIndex, SeriesPosition, SeriesStatus};
use crate::rules::value::FieldValue;
use crate::storage::models::UserBookProgress;

/// Series-derived condition on a single book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesCheck {
    /// Book has a sibling set (non-blank series name)
    Member,
    /// Book has a series number
    Numbered,
    Status(SeriesStatus),
    Gap(SeriesGap),
    Position(SeriesPosition),
}

/// Compiled book predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Always,
    Never,
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
    Not(Box<Predicate>),
    Scalar {
        field: ScalarField,
        test: ValueTest,
    },
    Collection {
        field: CollectionField,
        test: ValueTest,
    },
    Progress {
        field: ProgressField,
        test: ValueTest,
    },
    Presence(PresenceKey),
    Series(SeriesCheck),
}

impl Predicate {
    /// Conjunction; constant members are folded away
    pub fn all(parts: impl IntoIterator<Item = Predicate>) -> Self {
        let mut kept = Vec::new();
        for part in parts {
            match part {
                Predicate::Always => {}
                Predicate::Never => return Predicate::Never,
                other => kept.push(other),
            }
        }
        match kept.len() {
            0 => Predicate::Always,
            1 => kept.remove(0),
            _ => Predicate::All(kept),
        }
    }

    /// Disjunction; constant members are folded away (no members is `Never`)
    pub fn any(parts: impl IntoIterator<Item = Predicate>) -> Self {
        let mut kept = Vec::new();
        for part in parts {
            match part {
                Predicate::Never => {}
                Predicate::Always => return Predicate::Always,
                other => kept.push(other),
            }
        }
        match kept.len() {
            0 => Predicate::Never,
            1 => kept.remove(0),
            _ => Predicate::Any(kept),
        }
    }

    pub fn negate(self) -> Self {
        match self {
            Predicate::Always => Predicate::Never,
            Predicate::Never => Predicate::Always,
            Predicate::Not(inner) => *inner,
            other => Predicate::Not(Box::new(other)),
        }
    }

    pub(crate) fn scalar(field: ScalarField, compiled: CompiledTest) -> Self {
        Self::apply_negation(Predicate::Scalar { field, test: compiled.test }, compiled.negated)
    }

    pub(crate) fn collection(field: CollectionField, compiled: CompiledTest) -> Self {
        Self::apply_negation(Predicate::Collection { field, test: compiled.test }, compiled.negated)
    }

    pub(crate) fn progress(field: ProgressField, compiled: CompiledTest) -> Self {
        Self::apply_negation(Predicate::Progress { field, test: compiled.test }, compiled.negated)
    }

    fn apply_negation(predicate: Predicate, negated: bool) -> Self {
        if negated {
            predicate.negate()
        } else {
            predicate
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Predicate::Always | Predicate::Never)
    }

    /// Whether evaluation needs the series index
    pub fn uses_series(&self) -> bool {
        match self {
            Predicate::Series(_) => true,
            Predicate::All(parts) | Predicate::Any(parts) => parts.iter().any(Predicate::uses_series),
            Predicate::Not(inner) => inner.uses_series(),
            _ => false,
        }
    }

    /// Evaluate for one book
    pub fn evaluate(&self, record: &BookRecord, ctx: &EvalContext<'_>) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Never => false,
            Predicate::All(parts) => parts.iter().all(|part| part.evaluate(record, ctx)),
            Predicate::Any(parts) => parts.iter().any(|part| part.evaluate(record, ctx)),
            Predicate::Not(inner) => !inner.evaluate(record, ctx),
            Predicate::Scalar { field, test } => test.test(&record.scalar(*field)),
            Predicate::Collection { field, test } => {
                test.test(&FieldValue::List(record.collection(*field)))
            }
            Predicate::Progress { field, test } => {
                test.test(&progress_value(*field, ctx.progress(record)))
            }
            Predicate::Presence(key) => key.is_present(record, ctx.progress(record)),
            Predicate::Series(check) => ctx.series_check(record, *check),
        }
    }
}

/// Everything a predicate needs besides the book itself
#[derive(Debug)]
pub struct EvalContext<'a> {
    user_id: i64,
    snapshot: &'a CatalogSnapshot,
    series: SeriesIndex,
}

impl<'a> EvalContext<'a> {
    /// Build a context for one execution
    ///
    /// The series index is only derived when `with_series` is set.
    pub fn new(snapshot: &'a CatalogSnapshot, user_id: i64, with_series: bool) -> Self {
        let series = if with_series {
            Self::series_index(snapshot, user_id, snapshot.books())
        } else {
            SeriesIndex::default()
        };

        Self {
            user_id,
            snapshot,
            series,
        }
    }

    /// Context for evaluating a single book; only its own sibling set is derived
    pub fn for_book(
        snapshot: &'a CatalogSnapshot,
        user_id: i64,
        with_series: bool,
        record: &BookRecord,
    ) -> Self {
        let series = if with_series {
            Self::series_index(snapshot, user_id, snapshot.siblings(record))
        } else {
            SeriesIndex::default()
        };

        Self {
            user_id,
            snapshot,
            series,
        }
    }

    fn series_index<'b>(
        snapshot: &CatalogSnapshot,
        user_id: i64,
        books: impl IntoIterator<Item = &'b BookRecord>,
    ) -> SeriesIndex {
        SeriesIndex::build(books, |book_id| {
            series_read_status(snapshot.progress_for(user_id, book_id))
        })
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn series(&self) -> &SeriesIndex {
        &self.series
    }

    fn progress(&self, record: &BookRecord) -> Option<&'a UserBookProgress> {
        self.snapshot.progress_for(self.user_id, record.id())
    }

    fn series_check(&self, record: &BookRecord, check: SeriesCheck) -> bool {
        let facts = self.series.facts_for(record);
        match check {
            SeriesCheck::Member => facts.is_some(),
            SeriesCheck::Numbered => record.book.series_number.is_some(),
            SeriesCheck::Status(status) => facts.map_or(false, |f| f.has_status(status)),
            SeriesCheck::Gap(gap) => facts.map_or(false, |f| f.has_gap(gap)),
            SeriesCheck::Position(position) => facts.map_or(false, |f| {
                f.is_at(record.id(), record.book.series_number, position)
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::{book, progress, series_book};
    use crate::rules::value::Literal;
    use crate::storage::models::ReadStatus;

    fn title_is(title: &str) -> Predicate {
        Predicate::Scalar {
            field: ScalarField::Title,
            test: ValueTest::Equals(Literal::Text(title.to_lowercase())),
        }
    }

    #[test]
    fn test_all_and_any_fold_constants() {
        assert_eq!(Predicate::all(vec![]), Predicate::Always);
        assert_eq!(Predicate::any(vec![]), Predicate::Never);
        assert_eq!(
            Predicate::all(vec![Predicate::Always, title_is("Dune")]),
            title_is("Dune")
        );
        assert_eq!(
            Predicate::all(vec![Predicate::Never, title_is("Dune")]),
            Predicate::Never
        );
        assert_eq!(
            Predicate::any(vec![Predicate::Always, title_is("Dune")]),
            Predicate::Always
        );
    }

    #[test]
    fn test_negate_collapses() {
        assert_eq!(Predicate::Always.negate(), Predicate::Never);
        assert_eq!(title_is("Dune").negate().negate(), title_is("Dune"));
    }

    #[test]
    fn test_uses_series() {
        let series = Predicate::Series(SeriesCheck::Member);
        assert!(Predicate::any(vec![title_is("Dune"), series.clone()]).uses_series());
        assert!(series.negate().uses_series());
        assert!(!title_is("Dune").uses_series());
    }

    #[test]
    fn test_evaluate_scalar_and_progress() {
        let snapshot = CatalogSnapshot::new(
            vec![book(1, "Dune"), book(2, "Emma")],
            vec![progress(9, 2, ReadStatus::Read)],
        );
        let ctx = EvalContext::new(&snapshot, 9, false);
        let read = Predicate::Progress {
            field: ProgressField::ReadStatus,
            test: ValueTest::Equals(Literal::Text("read".to_string())),
        };

        let dune = snapshot.book(1).unwrap();
        let emma = snapshot.book(2).unwrap();
        assert!(title_is("dune").evaluate(dune, &ctx));
        assert!(!read.evaluate(dune, &ctx));
        assert!(read.evaluate(emma, &ctx));

        // other users do not see this progress row
        let stranger = EvalContext::new(&snapshot, 10, false);
        assert!(!read.evaluate(emma, &stranger));
    }

    #[test]
    fn test_series_checks_use_acting_user() {
        let snapshot = CatalogSnapshot::new(
            vec![
                series_book(1, "Saga", Some(1.0), None),
                series_book(2, "Saga", Some(2.0), None),
                book(3, "Standalone"),
            ],
            vec![progress(9, 1, ReadStatus::Read)],
        );
        let next = Predicate::Series(SeriesCheck::Position(SeriesPosition::NextUnread));

        let reader = EvalContext::new(&snapshot, 9, true);
        assert!(next.evaluate(snapshot.book(2).unwrap(), &reader));
        assert!(!Predicate::Series(SeriesCheck::Member).evaluate(snapshot.book(3).unwrap(), &reader));

        let newcomer = EvalContext::new(&snapshot, 10, true);
        assert!(!next.evaluate(snapshot.book(2).unwrap(), &newcomer));
    }
}
