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


//! Resolved field values and compiled literals

use crate::rules::ast::RuleValue;
use crate::rules::field::ValueShape;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use std::cmp::Ordering;

/// Value of a field for one book, borrowed from the catalog snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Null,
    Text(&'a str),
    Number(f64),
    Boolean(bool),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    List(&'a [String]),
}

impl<'a> FieldValue<'a> {
    pub fn text(value: Option<&'a str>) -> Self {
        value.map(FieldValue::Text).unwrap_or(FieldValue::Null)
    }

    pub fn number(value: Option<f64>) -> Self {
        value.map(FieldValue::Number).unwrap_or(FieldValue::Null)
    }

    pub fn date(value: Option<NaiveDate>) -> Self {
        value.map(FieldValue::Date).unwrap_or(FieldValue::Null)
    }

    pub fn timestamp(value: Option<DateTime<Utc>>) -> Self {
        value.map(FieldValue::Timestamp).unwrap_or(FieldValue::Null)
    }

    /// Null, blank after trimming, or an empty collection
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Date values as an instant (midnight UTC) for threshold comparisons
    pub fn as_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Date(date) => Some(start_of_day(*date)),
            FieldValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Members to test for multi-value operators; a scalar is a singleton
    pub fn members(&self) -> Vec<FieldValue<'a>> {
        match self {
            FieldValue::Null => Vec::new(),
            FieldValue::List(items) => {
                let items: &'a [String] = *items;
                items.iter().map(|item| FieldValue::Text(item.as_str())).collect()
            }
            scalar => vec![scalar.clone()],
        }
    }
}

/// Rule literal parsed against the shape of the field it is compared to
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Lower-cased for case-insensitive comparison
    Text(String),
    Number(f64),
    Boolean(bool),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl Literal {
    /// Parse a rule value for a field of the given shape
    ///
    /// Returns `None` when the value cannot be read as that shape; the caller
    /// degrades the rule instead of failing.
    pub fn parse(value: &RuleValue, shape: ValueShape) -> Option<Self> {
        match shape {
            ValueShape::Text | ValueShape::Token | ValueShape::List => {
                value.as_text().map(|text| Literal::Text(text.to_lowercase()))
            }
            ValueShape::Number => value.as_number().map(Literal::Number),
            ValueShape::Boolean => value.as_bool().map(Literal::Boolean),
            ValueShape::Date | ValueShape::Timestamp => match value {
                RuleValue::Text(text) => parse_date_literal(text),
                _ => None,
            },
        }
    }

    /// Ordering of a field value relative to this literal
    ///
    /// Text compares case-insensitively. A date literal compared with a
    /// timestamp compares calendar days. Mismatched shapes and nulls are
    /// incomparable.
    pub fn compare(&self, value: &FieldValue<'_>) -> Option<Ordering> {
        match (value, self) {
            (FieldValue::Text(actual), Literal::Text(expected)) => {
                Some(actual.to_lowercase().as_str().cmp(expected.as_str()))
            }
            (FieldValue::Number(actual), Literal::Number(expected)) => actual.partial_cmp(expected),
            (FieldValue::Boolean(actual), Literal::Boolean(expected)) => Some(actual.cmp(expected)),
            (FieldValue::Date(actual), Literal::Date(expected)) => Some(actual.cmp(expected)),
            (FieldValue::Date(actual), Literal::Timestamp(expected)) => {
                Some(actual.cmp(&expected.date_naive()))
            }
            (FieldValue::Timestamp(actual), Literal::Date(expected)) => {
                Some(actual.date_naive().cmp(expected))
            }
            (FieldValue::Timestamp(actual), Literal::Timestamp(expected)) => Some(actual.cmp(expected)),
            _ => None,
        }
    }

    pub fn matches(&self, value: &FieldValue<'_>) -> bool {
        self.compare(value) == Some(Ordering::Equal)
    }
}

/// Parse an ISO date or date-time
///
/// `YYYY-MM-DD` yields a calendar date; RFC 3339 and naive
/// `YYYY-MM-DD[T ]HH:MM:SS` yield an instant (naive values are taken as UTC).
pub fn parse_date_literal(raw: &str) -> Option<Literal> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(Literal::Timestamp(ts.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Literal::Timestamp(Utc.from_utc_datetime(&naive)));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().map(Literal::Date)
}

pub(crate) fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_compare_is_case_insensitive() {
        let literal = Literal::parse(&RuleValue::from("Tor Books"), ValueShape::Text).unwrap();
        assert!(literal.matches(&FieldValue::Text("TOR BOOKS")));
        assert!(!literal.matches(&FieldValue::Text("Tor")));
        assert!(!literal.matches(&FieldValue::Null));
    }

    #[test]
    fn test_number_literal_from_string() {
        let literal = Literal::parse(&RuleValue::from("250"), ValueShape::Number).unwrap();
        assert_eq!(literal.compare(&FieldValue::Number(300.0)), Some(Ordering::Greater));
        assert!(Literal::parse(&RuleValue::from("lots"), ValueShape::Number).is_none());
    }

    #[test]
    fn test_boolean_literal_from_string() {
        let literal = Literal::parse(&RuleValue::from("false"), ValueShape::Boolean).unwrap();
        assert!(literal.matches(&FieldValue::Boolean(false)));
        assert!(!literal.matches(&FieldValue::Boolean(true)));
    }

    #[test]
    fn test_date_literals() {
        assert_eq!(
            parse_date_literal("2021-03-04"),
            Some(Literal::Date(NaiveDate::from_ymd_opt(2021, 3, 4).unwrap()))
        );
        assert!(matches!(
            parse_date_literal("2021-03-04T10:00:00Z"),
            Some(Literal::Timestamp(_))
        ));
        assert!(matches!(
            parse_date_literal("2021-03-04 10:00:00"),
            Some(Literal::Timestamp(_))
        ));
        assert_eq!(parse_date_literal("March 4th"), None);
    }

    #[test]
    fn test_timestamp_against_date_literal_compares_days() {
        let literal = parse_date_literal("2021-03-04").unwrap();
        let evening = Utc.with_ymd_and_hms(2021, 3, 4, 22, 15, 0).unwrap();
        assert!(literal.matches(&FieldValue::Timestamp(evening)));
    }

    #[test]
    fn test_empty_values() {
        assert!(FieldValue::Null.is_empty());
        assert!(FieldValue::Text("   ").is_empty());
        assert!(FieldValue::List(&[]).is_empty());
        assert!(!FieldValue::Number(0.0).is_empty());
        assert!(!FieldValue::Boolean(false).is_empty());
    }

    #[test]
    fn test_members() {
        let names = vec!["A".to_string(), "B".to_string()];
        assert_eq!(FieldValue::List(&names).members().len(), 2);
        assert_eq!(FieldValue::Number(1.0).members().len(), 1);
        assert!(FieldValue::Null.members().is_empty());
    }
}
