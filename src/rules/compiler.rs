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


//! Rule compiler and group composer
//!
//! Walks a `RuleGroup` top-down and produces a `BookFilter`. Each rule is
//! dispatched on its field's strategy (scalar, collection, progress,
//! presence, series); groups fold their children with AND/OR.
//!
//! Compilation never fails. A rule that cannot constrain anything (null
//! value, unknown field, operator that does not apply to the field) compiles
//! to `Predicate::Always` and is logged at debug level.
//!
//! # Example
//! ```rust,ignore
//! let tree = RuleGroup::from_json(&shelf.rules_json)?;
//! let filter = RuleCompiler::new(user_id).compile(&tree);
//! let snapshot = load_catalog_snapshot(db.pool()).await?;
//! let books = filter.apply(&snapshot);
//! ```

use crate::catalog::{BookRecord, CatalogSnapshot};
use crate::error::{Result, ShelfError};
use crate::rules::ast::{Join, Rule, RuleGroup, RuleNode, RuleValue};
use crate::rules::field::{FieldKind, SeriesFacet, ValueShape};
use crate::rules::operator::{compile_test, RuleOperator};
use crate::rules::predicate::{EvalContext, Predicate, SeriesCheck};
use crate::rules::presence::PresenceKey;
use crate::rules::series::{SeriesGap, SeriesPosition, SeriesStatus};
use chrono::{DateTime, Utc};

/// Compiles rule trees for one acting user at one instant
#[derive(Debug, Clone, Copy)]
pub struct RuleCompiler {
    user_id: i64,
    now: DateTime<Utc>,
}

impl RuleCompiler {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            now: Utc::now(),
        }
    }

    /// Pin the instant relative date operators are measured from
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn compile(&self, root: &RuleGroup) -> BookFilter {
        let predicate = self.compile_group(root);
        tracing::trace!(user_id = self.user_id, ?predicate, "compiled rule tree");
        BookFilter {
            user_id: self.user_id,
            predicate,
        }
    }

    fn compile_group(&self, group: &RuleGroup) -> Predicate {
        if group.rules.is_empty() {
            return Predicate::Always;
        }

        let parts = group.rules.iter().map(|node| match node {
            RuleNode::Rule(rule) => self.compile_rule(rule),
            RuleNode::Group(child) => self.compile_group(child),
        });

        match group.join {
            Join::And => Predicate::all(parts),
            Join::Or => Predicate::any(parts),
        }
    }

    fn compile_rule(&self, rule: &Rule) -> Predicate {
        let predicate = match rule.field.kind() {
            FieldKind::Scalar(field) => compile_test(rule, field.shape(), self.now)
                .map(|compiled| Predicate::scalar(field, compiled)),
            FieldKind::Collection(field) => compile_test(rule, ValueShape::List, self.now)
                .map(|compiled| Predicate::collection(field, compiled)),
            FieldKind::Progress(field) => compile_test(rule, field.shape(), self.now)
                .map(|compiled| Predicate::progress(field, compiled)),
            FieldKind::Presence => compile_presence(rule),
            FieldKind::Series(facet) => compile_series(rule, facet),
            FieldKind::Unrecognized => None,
        };

        predicate.unwrap_or_else(|| {
            tracing::debug!(
                field = %rule.field,
                operator = %rule.operator,
                "rule places no constraint; matching all books"
            );
            Predicate::Always
        })
    }
}

/// METADATA_PRESENCE: EQUALS means present, NOT_EQUALS means absent
///
/// Unknown keys and a null value stand for the constant `true`, so the
/// negated form of either matches nothing.
fn compile_presence(rule: &Rule) -> Option<Predicate> {
    let key_predicate = |value: &RuleValue| {
        value
            .as_text()
            .and_then(|name| PresenceKey::parse(&name))
            .map_or(Predicate::Always, Predicate::Presence)
    };

    match rule.operator {
        RuleOperator::Equals | RuleOperator::NotEquals => {
            let present = rule.value.as_ref().map_or(Predicate::Always, key_predicate);
            if rule.operator == RuleOperator::NotEquals {
                Some(present.negate())
            } else {
                Some(present)
            }
        }
        RuleOperator::IncludesAny | RuleOperator::IncludesAll | RuleOperator::ExcludesAll => {
            let keys: Vec<Predicate> = rule
                .value
                .as_ref()?
                .items()
                .into_iter()
                .map(key_predicate)
                .collect();
            if keys.is_empty() {
                return None;
            }
            Some(match rule.operator {
                RuleOperator::IncludesAny => Predicate::any(keys),
                RuleOperator::IncludesAll => Predicate::all(keys),
                _ => Predicate::all(keys.into_iter().map(Predicate::negate)),
            })
        }
        _ => None,
    }
}

/// SERIES_STATUS / SERIES_GAPS / SERIES_POSITION
///
/// Both the positive and the negated forms only ever match books that belong
/// to a series (and, for positions, carry a series number). An unknown
/// category stands for the constant `true` inside that guard.
fn compile_series(rule: &Rule, facet: SeriesFacet) -> Option<Predicate> {
    let guard = match facet {
        SeriesFacet::Position => Predicate::all([
            Predicate::Series(SeriesCheck::Member),
            Predicate::Series(SeriesCheck::Numbered),
        ]),
        SeriesFacet::Status | SeriesFacet::Gaps => Predicate::Series(SeriesCheck::Member),
    };
    let category = |value: &RuleValue| {
        value
            .as_text()
            .and_then(|token| series_check(facet, &token))
            .map_or(Predicate::Always, Predicate::Series)
    };

    let value = rule.value.as_ref()?;
    let inner = match rule.operator {
        RuleOperator::Equals => category(value),
        RuleOperator::NotEquals => category(value).negate(),
        RuleOperator::IncludesAny | RuleOperator::IncludesAll | RuleOperator::ExcludesAll => {
            let checks: Vec<Predicate> = value.items().into_iter().map(category).collect();
            if checks.is_empty() {
                return None;
            }
            match rule.operator {
                RuleOperator::IncludesAny => Predicate::any(checks),
                RuleOperator::IncludesAll => Predicate::all(checks),
                _ => Predicate::any(checks).negate(),
            }
        }
        _ => return None,
    };

    Some(Predicate::all([guard, inner]))
}

fn series_check(facet: SeriesFacet, token: &str) -> Option<SeriesCheck> {
    match facet {
        SeriesFacet::Status => SeriesStatus::parse(token).map(SeriesCheck::Status),
        SeriesFacet::Gaps => SeriesGap::parse(token).map(SeriesCheck::Gap),
        SeriesFacet::Position => SeriesPosition::parse(token).map(SeriesCheck::Position),
    }
}

/// Compiled rule tree bound to the acting user
///
/// Executable against any `CatalogSnapshot`; series facts are derived per
/// execution from the snapshot passed in.
#[derive(Debug, Clone, PartialEq)]
pub struct BookFilter {
    user_id: i64,
    predicate: Predicate,
}

impl BookFilter {
    pub fn new(user_id: i64, predicate: Predicate) -> Self {
        Self { user_id, predicate }
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// True when the filter matches every book
    pub fn is_unrestricted(&self) -> bool {
        self.predicate == Predicate::Always
    }

    fn context<'s>(&self, snapshot: &'s CatalogSnapshot) -> EvalContext<'s> {
        EvalContext::new(snapshot, self.user_id, self.predicate.uses_series())
    }

    /// Books of the snapshot that match, in snapshot order
    pub fn apply<'s>(&self, snapshot: &'s CatalogSnapshot) -> Vec<&'s BookRecord> {
        let ctx = self.context(snapshot);
        snapshot
            .books()
            .iter()
            .filter(|record| self.predicate.evaluate(record, &ctx))
            .collect()
    }

    pub fn matching_ids(&self, snapshot: &CatalogSnapshot) -> Vec<i64> {
        self.apply(snapshot).into_iter().map(BookRecord::id).collect()
    }

    /// Whether a single book of the snapshot matches
    ///
    /// Derives only that book's sibling set. Use `apply` or `matching_ids`
    /// to filter a whole snapshot.
    pub fn matches(&self, snapshot: &CatalogSnapshot, book_id: i64) -> bool {
        snapshot.book(book_id).map_or(false, |record| {
            let ctx = EvalContext::for_book(
                snapshot,
                self.user_id,
                self.predicate.uses_series(),
                record,
            );
            self.predicate.evaluate(record, &ctx)
        })
    }

    /// Conjunction with another filter for the same user
    pub fn and(self, other: BookFilter) -> Result<BookFilter> {
        self.combine(other, Join::And)
    }

    /// Disjunction with another filter for the same user
    pub fn or(self, other: BookFilter) -> Result<BookFilter> {
        self.combine(other, Join::Or)
    }

    fn combine(self, other: BookFilter, join: Join) -> Result<BookFilter> {
        if self.user_id != other.user_id {
            return Err(ShelfError::invalid_input(format!(
                "cannot combine filters of user {} and user {}",
                self.user_id, other.user_id
            )));
        }
        let parts = [self.predicate, other.predicate];
        let predicate = match join {
            Join::And => Predicate::all(parts),
            Join::Or => Predicate::any(parts),
        };
        Ok(BookFilter::new(self.user_id, predicate))
    }
}
