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


//! Operator engine
//!
//! Turns an operator plus the rule's literals into a `ValueTest` for a field of
//! a known `ValueShape`, and evaluates that test against a resolved value.
//!
//! Every test is total: a null value simply fails positive tests, and the
//! negated operators (NOT_EQUALS, DOES_NOT_CONTAIN, IS_NOT_EMPTY) are
//! compiled as the negation of their positive form. When an operator does
//! not apply to the field's shape, or the literal is missing or unreadable,
//! compilation yields `None` and the rule matches everything.

use crate::rules::ast::{Rule, RuleValue};
use crate::rules::dates::{period_start, threshold, Period, TimeUnit};
use crate::rules::field::ValueShape;
use crate::rules::value::{FieldValue, Literal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Comparison operator of a rule
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleOperator {
    Equals,
    NotEquals,
    Contains,
    DoesNotContain,
    StartsWith,
    EndsWith,
    IsEmpty,
    IsNotEmpty,
    GreaterThan,
    GreaterThanEqualTo,
    LessThan,
    LessThanEqualTo,
    InBetween,
    IncludesAny,
    IncludesAll,
    ExcludesAll,
    WithinLast,
    OlderThan,
    ThisPeriod,
    /// Operator not known to this version (kept verbatim)
    Unrecognized(String),
}

impl RuleOperator {
    /// Parse an operator token (`greater_than`, `GREATER_THAN`)
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "equals" => RuleOperator::Equals,
            "not_equals" => RuleOperator::NotEquals,
            "contains" => RuleOperator::Contains,
            "does_not_contain" => RuleOperator::DoesNotContain,
            "starts_with" => RuleOperator::StartsWith,
            "ends_with" => RuleOperator::EndsWith,
            "is_empty" => RuleOperator::IsEmpty,
            "is_not_empty" => RuleOperator::IsNotEmpty,
            "greater_than" => RuleOperator::GreaterThan,
            "greater_than_equal_to" => RuleOperator::GreaterThanEqualTo,
            "less_than" => RuleOperator::LessThan,
            "less_than_equal_to" => RuleOperator::LessThanEqualTo,
            "in_between" => RuleOperator::InBetween,
            "includes_any" => RuleOperator::IncludesAny,
            "includes_all" => RuleOperator::IncludesAll,
            "excludes_all" => RuleOperator::ExcludesAll,
            "within_last" => RuleOperator::WithinLast,
            "older_than" => RuleOperator::OlderThan,
            "this_period" => RuleOperator::ThisPeriod,
            _ => RuleOperator::Unrecognized(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RuleOperator::Equals => "equals",
            RuleOperator::NotEquals => "not_equals",
            RuleOperator::Contains => "contains",
            RuleOperator::DoesNotContain => "does_not_contain",
            RuleOperator::StartsWith => "starts_with",
            RuleOperator::EndsWith => "ends_with",
            RuleOperator::IsEmpty => "is_empty",
            RuleOperator::IsNotEmpty => "is_not_empty",
            RuleOperator::GreaterThan => "greater_than",
            RuleOperator::GreaterThanEqualTo => "greater_than_equal_to",
            RuleOperator::LessThan => "less_than",
            RuleOperator::LessThanEqualTo => "less_than_equal_to",
            RuleOperator::InBetween => "in_between",
            RuleOperator::IncludesAny => "includes_any",
            RuleOperator::IncludesAll => "includes_all",
            RuleOperator::ExcludesAll => "excludes_all",
            RuleOperator::WithinLast => "within_last",
            RuleOperator::OlderThan => "older_than",
            RuleOperator::ThisPeriod => "this_period",
            RuleOperator::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for RuleOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RuleOperator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RuleOperator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(RuleOperator::parse(&raw))
    }
}

/// Ordering operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl Comparison {
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Comparison::Greater => ordering == Ordering::Greater,
            Comparison::GreaterOrEqual => ordering != Ordering::Less,
            Comparison::Less => ordering == Ordering::Less,
            Comparison::LessOrEqual => ordering != Ordering::Greater,
        }
    }
}

/// Compiled test on a single resolved value
#[derive(Debug, Clone, PartialEq)]
pub enum ValueTest {
    Equals(Literal),
    /// Lower-cased needle
    Contains(String),
    StartsWith(String),
    EndsWith(String),
    IsEmpty,
    Compare(Comparison, Literal),
    /// Inclusive on both ends; a missing bound is open
    Between {
        lower: Option<Literal>,
        upper: Option<Literal>,
    },
    IncludesAny(Vec<Literal>),
    IncludesAll(Vec<Literal>),
    ExcludesAll(Vec<Literal>),
    OnOrAfter(DateTime<Utc>),
    Before(DateTime<Utc>),
    /// Inclusive instant range
    Within {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl ValueTest {
    pub fn test(&self, value: &FieldValue<'_>) -> bool {
        match self {
            ValueTest::Equals(literal) => match value {
                FieldValue::List(_) => value.members().iter().any(|member| literal.matches(member)),
                scalar => literal.matches(scalar),
            },
            ValueTest::Contains(needle) => match value {
                FieldValue::Text(text) => text.to_lowercase().contains(needle.as_str()),
                FieldValue::List(items) => items
                    .iter()
                    .any(|item| item.to_lowercase().contains(needle.as_str())),
                _ => false,
            },
            ValueTest::StartsWith(prefix) => match value {
                FieldValue::Text(text) => text.to_lowercase().starts_with(prefix.as_str()),
                _ => false,
            },
            ValueTest::EndsWith(suffix) => match value {
                FieldValue::Text(text) => text.to_lowercase().ends_with(suffix.as_str()),
                _ => false,
            },
            ValueTest::IsEmpty => value.is_empty(),
            ValueTest::Compare(comparison, literal) => literal
                .compare(value)
                .map_or(false, |ordering| comparison.accepts(ordering)),
            ValueTest::Between { lower, upper } => {
                let above = lower.as_ref().map_or(Some(true), |bound| {
                    bound.compare(value).map(|o| Comparison::GreaterOrEqual.accepts(o))
                });
                let below = upper.as_ref().map_or(Some(true), |bound| {
                    bound.compare(value).map(|o| Comparison::LessOrEqual.accepts(o))
                });
                !value.is_empty() && above == Some(true) && below == Some(true)
            }
            ValueTest::IncludesAny(candidates) => {
                let members = value.members();
                candidates
                    .iter()
                    .any(|candidate| members.iter().any(|member| candidate.matches(member)))
            }
            ValueTest::IncludesAll(candidates) => {
                let members = value.members();
                candidates
                    .iter()
                    .all(|candidate| members.iter().any(|member| candidate.matches(member)))
            }
            ValueTest::ExcludesAll(candidates) => {
                let members = value.members();
                !candidates
                    .iter()
                    .any(|candidate| members.iter().any(|member| candidate.matches(member)))
            }
            // Calendar dates compare by whole day against the threshold's day
            ValueTest::OnOrAfter(threshold) => match value {
                FieldValue::Date(date) => *date >= threshold.date_naive(),
                other => other.as_instant().map_or(false, |at| at >= *threshold),
            },
            ValueTest::Before(threshold) => match value {
                FieldValue::Date(date) => *date < threshold.date_naive(),
                other => other.as_instant().map_or(false, |at| at < *threshold),
            },
            ValueTest::Within { start, end } => value
                .as_instant()
                .map_or(false, |at| at >= *start && at <= *end),
        }
    }
}

/// A value test and whether the rule asked for its negation
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTest {
    pub test: ValueTest,
    pub negated: bool,
}

impl CompiledTest {
    fn positive(test: ValueTest) -> Option<Self> {
        Some(Self { test, negated: false })
    }

    fn with_negation(test: ValueTest, negated: bool) -> Option<Self> {
        Some(Self { test, negated })
    }
}

/// Compile a rule's operator and literals against a field shape
///
/// `now` anchors the relative date operators. Returns `None` when the rule
/// places no constraint (null literal, unsupported operator for the shape,
/// unreadable literal).
pub fn compile_test(rule: &Rule, shape: ValueShape, now: DateTime<Utc>) -> Option<CompiledTest> {
    let textual = matches!(shape, ValueShape::Text | ValueShape::Token);
    let ordered = matches!(shape, ValueShape::Number | ValueShape::Date | ValueShape::Timestamp);
    let temporal = matches!(shape, ValueShape::Date | ValueShape::Timestamp);
    let literal = |value: &RuleValue| Literal::parse(value, shape);

    match &rule.operator {
        RuleOperator::Equals | RuleOperator::NotEquals => {
            let expected = literal(rule.value.as_ref()?)?;
            CompiledTest::with_negation(
                ValueTest::Equals(expected),
                rule.operator == RuleOperator::NotEquals,
            )
        }
        RuleOperator::Contains | RuleOperator::DoesNotContain
            if textual || shape == ValueShape::List =>
        {
            let needle = rule.value.as_ref()?.as_text()?.to_lowercase();
            CompiledTest::with_negation(
                ValueTest::Contains(needle),
                rule.operator == RuleOperator::DoesNotContain,
            )
        }
        RuleOperator::StartsWith if textual => {
            CompiledTest::positive(ValueTest::StartsWith(rule.value.as_ref()?.as_text()?.to_lowercase()))
        }
        RuleOperator::EndsWith if textual => {
            CompiledTest::positive(ValueTest::EndsWith(rule.value.as_ref()?.as_text()?.to_lowercase()))
        }
        RuleOperator::IsEmpty => CompiledTest::positive(ValueTest::IsEmpty),
        RuleOperator::IsNotEmpty => CompiledTest::with_negation(ValueTest::IsEmpty, true),
        RuleOperator::GreaterThan
        | RuleOperator::GreaterThanEqualTo
        | RuleOperator::LessThan
        | RuleOperator::LessThanEqualTo
            if ordered =>
        {
            let comparison = match rule.operator {
                RuleOperator::GreaterThan => Comparison::Greater,
                RuleOperator::GreaterThanEqualTo => Comparison::GreaterOrEqual,
                RuleOperator::LessThan => Comparison::Less,
                _ => Comparison::LessOrEqual,
            };
            CompiledTest::positive(ValueTest::Compare(comparison, literal(rule.value.as_ref()?)?))
        }
        RuleOperator::InBetween if ordered => {
            let lower = rule.value_start.as_ref().and_then(literal);
            let upper = rule.value_end.as_ref().and_then(literal);
            if lower.is_none() && upper.is_none() {
                return None;
            }
            CompiledTest::positive(ValueTest::Between { lower, upper })
        }
        RuleOperator::IncludesAny | RuleOperator::IncludesAll | RuleOperator::ExcludesAll
            if textual || matches!(shape, ValueShape::Number | ValueShape::List) =>
        {
            let candidates: Vec<Literal> = rule
                .value
                .as_ref()?
                .items()
                .into_iter()
                .filter_map(literal)
                .collect();
            if candidates.is_empty() {
                return None;
            }
            let test = match rule.operator {
                RuleOperator::IncludesAny => ValueTest::IncludesAny(candidates),
                RuleOperator::IncludesAll => ValueTest::IncludesAll(candidates),
                _ => ValueTest::ExcludesAll(candidates),
            };
            CompiledTest::positive(test)
        }
        RuleOperator::WithinLast | RuleOperator::OlderThan if temporal => {
            let count = rule.value.as_ref()?.as_number()?.trunc() as i64;
            let unit = match rule.value_end.as_ref() {
                None => TimeUnit::Days,
                Some(unit) => TimeUnit::parse(&unit.as_text()?)?,
            };
            let cutoff = threshold(now, count, unit)?;
            let test = if rule.operator == RuleOperator::WithinLast {
                ValueTest::OnOrAfter(cutoff)
            } else {
                ValueTest::Before(cutoff)
            };
            CompiledTest::positive(test)
        }
        RuleOperator::ThisPeriod if temporal => {
            let period = Period::parse(&rule.value.as_ref()?.as_text()?)?;
            CompiledTest::positive(ValueTest::Within {
                start: period_start(now, period),
                end: now,
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::field::RuleField;
    use chrono::{NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn rule(operator: RuleOperator) -> Rule {
        Rule::new(RuleField::Title, operator)
    }

    fn check(rule: &Rule, shape: ValueShape, value: FieldValue<'_>) -> bool {
        match compile_test(rule, shape, now()) {
            None => true,
            Some(compiled) => compiled.test.test(&value) != compiled.negated,
        }
    }

    #[test]
    fn test_operator_tokens() {
        assert_eq!(RuleOperator::parse("GREATER_THAN_EQUAL_TO"), RuleOperator::GreaterThanEqualTo);
        assert_eq!(RuleOperator::parse("this_period"), RuleOperator::ThisPeriod);
        assert_eq!(
            RuleOperator::parse("near"),
            RuleOperator::Unrecognized("near".to_string())
        );
        assert_eq!(RuleOperator::InBetween.to_string(), "in_between");
    }

    #[test]
    fn test_equals_and_not_equals_on_text() {
        let equals = rule(RuleOperator::Equals).value("Dune");
        assert!(check(&equals, ValueShape::Text, FieldValue::Text("DUNE")));
        assert!(!check(&equals, ValueShape::Text, FieldValue::Null));

        let not_equals = rule(RuleOperator::NotEquals).value("Dune");
        assert!(!check(&not_equals, ValueShape::Text, FieldValue::Text("dune")));
        assert!(check(&not_equals, ValueShape::Text, FieldValue::Null));
    }

    #[test]
    fn test_null_literal_is_vacuous() {
        for operator in [RuleOperator::Equals, RuleOperator::NotEquals, RuleOperator::Contains] {
            assert!(compile_test(&rule(operator), ValueShape::Text, now()).is_none());
        }
    }

    #[test]
    fn test_boolean_equals_from_string() {
        let physical = rule(RuleOperator::Equals).value("true");
        assert!(check(&physical, ValueShape::Boolean, FieldValue::Boolean(true)));
        assert!(!check(&physical, ValueShape::Boolean, FieldValue::Boolean(false)));
    }

    #[test]
    fn test_string_operators() {
        let contains = rule(RuleOperator::Contains).value("ring");
        assert!(check(&contains, ValueShape::Text, FieldValue::Text("The Lord of the Rings")));
        assert!(!check(&contains, ValueShape::Text, FieldValue::Null));

        let does_not = rule(RuleOperator::DoesNotContain).value("ring");
        assert!(!check(&does_not, ValueShape::Text, FieldValue::Text("RINGWORLD")));
        assert!(check(&does_not, ValueShape::Text, FieldValue::Null));

        let starts = rule(RuleOperator::StartsWith).value("the");
        assert!(check(&starts, ValueShape::Text, FieldValue::Text("The Hobbit")));
        let ends = rule(RuleOperator::EndsWith).value("BIT");
        assert!(check(&ends, ValueShape::Text, FieldValue::Text("The Hobbit")));
        assert!(!check(&ends, ValueShape::Text, FieldValue::Text("Rabbits")));
    }

    #[test]
    fn test_contains_on_collection_matches_any_member() {
        let names = vec!["Ursula K. Le Guin".to_string(), "Iain M. Banks".to_string()];
        let contains = rule(RuleOperator::Contains).value("banks");
        assert!(check(&contains, ValueShape::List, FieldValue::List(&names)));

        let missing = rule(RuleOperator::Contains).value("tolkien");
        assert!(!check(&missing, ValueShape::List, FieldValue::List(&names)));

        // prefix tests are not defined on collections
        assert!(compile_test(&rule(RuleOperator::StartsWith).value("x"), ValueShape::List, now()).is_none());
    }

    #[test]
    fn test_empty_operators() {
        let empty = rule(RuleOperator::IsEmpty);
        let not_empty = rule(RuleOperator::IsNotEmpty);
        assert!(check(&empty, ValueShape::Text, FieldValue::Text("  ")));
        assert!(check(&empty, ValueShape::List, FieldValue::List(&[])));
        assert!(check(&not_empty, ValueShape::Number, FieldValue::Number(0.0)));
        assert!(!check(&not_empty, ValueShape::Number, FieldValue::Null));
    }

    #[test]
    fn test_numeric_comparisons() {
        let greater = rule(RuleOperator::GreaterThan).value(100);
        assert!(check(&greater, ValueShape::Number, FieldValue::Number(200.0)));
        assert!(!check(&greater, ValueShape::Number, FieldValue::Number(100.0)));
        assert!(!check(&greater, ValueShape::Number, FieldValue::Null));

        let at_most = rule(RuleOperator::LessThanEqualTo).value("100");
        assert!(check(&at_most, ValueShape::Number, FieldValue::Number(100.0)));

        // ordering is not defined on text
        assert!(compile_test(&greater, ValueShape::Text, now()).is_none());
    }

    #[test]
    fn test_in_between_is_inclusive() {
        let between = rule(RuleOperator::InBetween).range(10, 20);
        assert!(check(&between, ValueShape::Number, FieldValue::Number(10.0)));
        assert!(check(&between, ValueShape::Number, FieldValue::Number(20.0)));
        assert!(!check(&between, ValueShape::Number, FieldValue::Number(20.5)));
        assert!(!check(&between, ValueShape::Number, FieldValue::Null));

        let dates = rule(RuleOperator::InBetween).range("2001-01-01", "2001-12-31");
        let inside = NaiveDate::from_ymd_opt(2001, 12, 31).unwrap();
        let outside = NaiveDate::from_ymd_opt(2002, 1, 1).unwrap();
        assert!(check(&dates, ValueShape::Date, FieldValue::Date(inside)));
        assert!(!check(&dates, ValueShape::Date, FieldValue::Date(outside)));

        assert!(compile_test(&rule(RuleOperator::InBetween), ValueShape::Number, now()).is_none());
    }

    #[test]
    fn test_multi_value_operators() {
        let tags = vec!["Space".to_string(), "Opera".to_string()];
        let any = rule(RuleOperator::IncludesAny).value(vec!["space", "horror"]);
        let all = rule(RuleOperator::IncludesAll).value(vec!["space", "horror"]);
        let none = rule(RuleOperator::ExcludesAll).value(vec!["horror", "romance"]);

        assert!(check(&any, ValueShape::List, FieldValue::List(&tags)));
        assert!(!check(&all, ValueShape::List, FieldValue::List(&tags)));
        assert!(check(&none, ValueShape::List, FieldValue::List(&tags)));
        assert!(!check(&any, ValueShape::List, FieldValue::List(&[])));
        assert!(check(&none, ValueShape::List, FieldValue::List(&[])));
    }

    #[test]
    fn test_multi_value_on_token_scalar() {
        let statuses = rule(RuleOperator::IncludesAny).value(vec!["READ", "UNSET"]);
        assert!(check(&statuses, ValueShape::Token, FieldValue::Text("UNSET")));
        assert!(!check(&statuses, ValueShape::Token, FieldValue::Text("READING")));

        let excluded = rule(RuleOperator::ExcludesAll).value(vec!["READ"]);
        assert!(check(&excluded, ValueShape::Token, FieldValue::Text("UNREAD")));

        let both = rule(RuleOperator::IncludesAll).value(vec!["READ", "UNREAD"]);
        assert!(!check(&both, ValueShape::Token, FieldValue::Text("READ")));
    }

    #[test]
    fn test_within_last_and_older_than() {
        let within = rule(RuleOperator::WithinLast).value(2).unit("weeks");
        let older = rule(RuleOperator::OlderThan).value(2).unit("weeks");
        let recent = Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        let stale = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();

        assert!(check(&within, ValueShape::Timestamp, FieldValue::Timestamp(recent)));
        assert!(!check(&within, ValueShape::Timestamp, FieldValue::Timestamp(stale)));
        assert!(check(&older, ValueShape::Timestamp, FieldValue::Timestamp(stale)));
        assert!(!check(&older, ValueShape::Timestamp, FieldValue::Null));
        assert!(!check(&within, ValueShape::Timestamp, FieldValue::Null));
    }

    #[test]
    fn test_within_last_months_on_dates() {
        let within = rule(RuleOperator::WithinLast).value(1).unit("months");
        let may_20 = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        let may_10 = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        assert!(check(&within, ValueShape::Date, FieldValue::Date(may_20)));
        assert!(!check(&within, ValueShape::Date, FieldValue::Date(may_10)));
    }

    #[test]
    fn test_relative_dates_include_boundary_day() {
        let may_15 = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        let june_15 = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();

        let within_month = rule(RuleOperator::WithinLast).value(1).unit("months");
        let older_month = rule(RuleOperator::OlderThan).value(1).unit("months");
        assert!(check(&within_month, ValueShape::Date, FieldValue::Date(may_15)));
        assert!(!check(&older_month, ValueShape::Date, FieldValue::Date(may_15)));
        assert!(check(&within_month, ValueShape::Date, FieldValue::Date(june_15)));

        let today = rule(RuleOperator::WithinLast).value(0).unit("days");
        assert!(check(&today, ValueShape::Date, FieldValue::Date(june_15)));
        assert!(!check(&today, ValueShape::Date, FieldValue::Date(may_15)));

        // Timestamps keep the time of day
        let morning = Utc.with_ymd_and_hms(2024, 5, 15, 9, 0, 0).unwrap();
        assert!(!check(&within_month, ValueShape::Timestamp, FieldValue::Timestamp(morning)));
        assert!(check(&older_month, ValueShape::Timestamp, FieldValue::Timestamp(morning)));
    }

    #[test]
    fn test_relative_dates_degrade() {
        // null count
        assert!(compile_test(&rule(RuleOperator::WithinLast).unit("days"), ValueShape::Date, now()).is_none());
        // unknown unit
        let odd = rule(RuleOperator::OlderThan).value(3).unit("fortnights");
        assert!(compile_test(&odd, ValueShape::Date, now()).is_none());
        // not a date field
        let numeric = rule(RuleOperator::WithinLast).value(3).unit("days");
        assert!(compile_test(&numeric, ValueShape::Number, now()).is_none());
    }

    #[test]
    fn test_this_period() {
        let this_month = rule(RuleOperator::ThisPeriod).value("month");
        let june_1 = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let may_31 = Utc.with_ymd_and_hms(2024, 5, 31, 23, 59, 59).unwrap();
        let tomorrow = Utc.with_ymd_and_hms(2024, 6, 16, 9, 0, 0).unwrap();

        assert!(check(&this_month, ValueShape::Timestamp, FieldValue::Timestamp(june_1)));
        assert!(!check(&this_month, ValueShape::Timestamp, FieldValue::Timestamp(may_31)));
        assert!(!check(&this_month, ValueShape::Timestamp, FieldValue::Timestamp(tomorrow)));
    }

    #[test]
    fn test_unrecognized_operator_is_vacuous() {
        let odd = rule(RuleOperator::parse("sounds_like")).value("x");
        assert!(compile_test(&odd, ValueShape::Text, now()).is_none());
    }
}
