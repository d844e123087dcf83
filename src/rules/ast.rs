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


//! Rule tree
//!
//! Immutable tree of rules and groups as authored by the user. A tree is built
//! once per request (usually from the shelf's stored JSON) and never mutated,
//! so there is no way to construct a cycle.
//!
//! # JSON Format
//! ```json
//! {
//!   "type": "group",
//!   "join": "and",
//!   "rules": [
//!     { "type": "rule", "field": "PAGE_COUNT", "operator": "greater_than", "value": 100 },
//!     {
//!       "type": "group",
//!       "join": "or",
//!       "rules": [
//!         { "type": "rule", "field": "LANGUAGE", "operator": "equals", "value": "en" },
//!         { "type": "rule", "field": "PUBLISHED_DATE", "operator": "in_between",
//!           "valueStart": "2001-01-01", "valueEnd": "2010-12-31" }
//!       ]
//!     }
//!   ]
//! }
//! ```

use crate::error::{Result, ShelfError};
use crate::rules::field::RuleField;
use crate::rules::operator::RuleOperator;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a group combines its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Join {
    And,
    Or,
}

impl Join {
    /// Parse a join token (case-insensitive)
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "and" => Ok(Join::And),
            "or" => Ok(Join::Or),
            _ => Err(ShelfError::InvalidJoin {
                join: raw.to_string(),
            }),
        }
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Join::And => f.write_str("AND"),
            Join::Or => f.write_str("OR"),
        }
    }
}

/// Literal carried by a rule
///
/// Values are scalars, ISO date strings or lists (for multi-value operators).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<RuleValue>),
}

impl RuleValue {
    /// Value as text; numbers are rendered without a trailing `.0`
    pub fn as_text(&self) -> Option<String> {
        match self {
            RuleValue::Text(text) => Some(text.clone()),
            RuleValue::Number(n) => Some(format_number(*n)),
            RuleValue::Bool(b) => Some(b.to_string()),
            RuleValue::List(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            RuleValue::Number(n) => Some(*n),
            RuleValue::Text(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RuleValue::Bool(b) => Some(*b),
            RuleValue::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Flatten into individual candidate values (a scalar is a one-element list)
    pub fn items(&self) -> Vec<&RuleValue> {
        match self {
            RuleValue::List(items) => items.iter().flat_map(|item| item.items()).collect(),
            scalar => vec![scalar],
        }
    }
}

impl From<&str> for RuleValue {
    fn from(value: &str) -> Self {
        RuleValue::Text(value.to_string())
    }
}

impl From<String> for RuleValue {
    fn from(value: String) -> Self {
        RuleValue::Text(value)
    }
}

impl From<f64> for RuleValue {
    fn from(value: f64) -> Self {
        RuleValue::Number(value)
    }
}

impl From<i64> for RuleValue {
    fn from(value: i64) -> Self {
        RuleValue::Number(value as f64)
    }
}

impl From<i32> for RuleValue {
    fn from(value: i32) -> Self {
        RuleValue::Number(value as f64)
    }
}

impl From<bool> for RuleValue {
    fn from(value: bool) -> Self {
        RuleValue::Bool(value)
    }
}

impl From<Vec<&str>> for RuleValue {
    fn from(values: Vec<&str>) -> Self {
        RuleValue::List(values.into_iter().map(RuleValue::from).collect())
    }
}

/// Render a number the way a user would type it (`3` not `3.0`)
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Single condition on one field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub field: RuleField,
    pub operator: RuleOperator,
    pub value: Option<RuleValue>,
    pub value_start: Option<RuleValue>,
    pub value_end: Option<RuleValue>,
}

impl Rule {
    pub fn new(field: RuleField, operator: RuleOperator) -> Self {
        Self {
            field,
            operator,
            value: None,
            value_start: None,
            value_end: None,
        }
    }

    /// Set the primary value
    pub fn value(mut self, value: impl Into<RuleValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set both range bounds (IN_BETWEEN)
    pub fn range(mut self, start: impl Into<RuleValue>, end: impl Into<RuleValue>) -> Self {
        self.value_start = Some(start.into());
        self.value_end = Some(end.into());
        self
    }

    /// Set the unit token carried in `valueEnd` (WITHIN_LAST / OLDER_THAN)
    pub fn unit(mut self, unit: &str) -> Self {
        self.value_end = Some(RuleValue::from(unit));
        self
    }
}

/// Child of a group
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RuleNode {
    Rule(Rule),
    Group(RuleGroup),
}

impl From<Rule> for RuleNode {
    fn from(rule: Rule) -> Self {
        RuleNode::Rule(rule)
    }
}

impl From<RuleGroup> for RuleNode {
    fn from(group: RuleGroup) -> Self {
        RuleNode::Group(group)
    }
}

/// Group of rules combined with AND or OR
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleGroup {
    pub join: Join,
    pub rules: Vec<RuleNode>,
}

impl RuleGroup {
    pub fn new(join: Join, rules: Vec<RuleNode>) -> Self {
        Self { join, rules }
    }

    pub fn and<N: Into<RuleNode>>(rules: impl IntoIterator<Item = N>) -> Self {
        Self::new(Join::And, rules.into_iter().map(Into::into).collect())
    }

    pub fn or<N: Into<RuleNode>>(rules: impl IntoIterator<Item = N>) -> Self {
        Self::new(Join::Or, rules.into_iter().map(Into::into).collect())
    }

    /// Parse a rule tree from its stored JSON form
    ///
    /// The root must be a group. Fails only on structural problems: malformed
    /// JSON, an unknown node type, a join other than AND/OR, or a rule without
    /// a field identifier. Unknown fields and operators are accepted here and
    /// degrade at compile time.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawGroup = serde_json::from_str(json)
            .map_err(|e| ShelfError::invalid_rule_tree(e.to_string()))?;

        if let Some(kind) = raw.kind.as_deref() {
            if !kind.eq_ignore_ascii_case("group") {
                return Err(ShelfError::invalid_rule_tree(format!(
                    "root node must be a group, found '{}'",
                    kind
                )));
            }
        }

        raw.into_group("rules")
    }

    /// Serialize to the stored JSON form
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Check the tree for structural problems
    ///
    /// Trees produced by `from_json` are already valid; this is for trees
    /// assembled in code.
    pub fn validate(&self) -> Result<()> {
        self.validate_at("rules")
    }

    fn validate_at(&self, path: &str) -> Result<()> {
        for (index, node) in self.rules.iter().enumerate() {
            let child_path = format!("{}[{}]", path, index);
            match node {
                RuleNode::Rule(rule) if rule.field.is_blank() => {
                    return Err(ShelfError::MissingRuleField { path: child_path });
                }
                RuleNode::Rule(_) => {}
                RuleNode::Group(group) => group.validate_at(&format!("{}.rules", child_path))?,
            }
        }
        Ok(())
    }

    /// Number of rules in the tree, at any depth
    pub fn rule_count(&self) -> usize {
        self.rules
            .iter()
            .map(|node| match node {
                RuleNode::Rule(_) => 1,
                RuleNode::Group(group) => group.rule_count(),
            })
            .sum()
    }

    /// Nesting depth (a flat group has depth 1)
    pub fn depth(&self) -> usize {
        1 + self
            .rules
            .iter()
            .map(|node| match node {
                RuleNode::Rule(_) => 0,
                RuleNode::Group(group) => group.depth(),
            })
            .max()
            .unwrap_or(0)
    }
}

// ============================================================================
// WIRE FORMAT
// ============================================================================

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawNode {
    Rule(RawRule),
    Group(RawGroup),
}

#[derive(Deserialize)]
struct RawGroup {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    join: Option<String>,
    #[serde(default)]
    rules: Vec<RawNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRule {
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    operator: Option<String>,
    #[serde(default)]
    value: Option<RuleValue>,
    #[serde(default)]
    value_start: Option<RuleValue>,
    #[serde(default)]
    value_end: Option<RuleValue>,
}

impl RawGroup {
    fn into_group(self, path: &str) -> Result<RuleGroup> {
        let join = match self.join {
            Some(join) => Join::parse(&join)?,
            None => {
                return Err(ShelfError::InvalidJoin {
                    join: "<missing>".to_string(),
                })
            }
        };

        let mut rules = Vec::with_capacity(self.rules.len());
        for (index, node) in self.rules.into_iter().enumerate() {
            let child_path = format!("{}[{}]", path, index);
            let node = match node {
                RawNode::Rule(rule) => RuleNode::Rule(rule.into_rule(child_path)?),
                RawNode::Group(group) => {
                    RuleNode::Group(group.into_group(&format!("{}.rules", child_path))?)
                }
            };
            rules.push(node);
        }

        Ok(RuleGroup { join, rules })
    }
}

impl RawRule {
    fn into_rule(self, path: String) -> Result<Rule> {
        let field = match self.field.as_deref().map(str::trim) {
            Some(field) if !field.is_empty() => RuleField::parse(field),
            _ => return Err(ShelfError::MissingRuleField { path }),
        };
        let operator = RuleOperator::parse(self.operator.as_deref().unwrap_or_default());

        Ok(Rule {
            field,
            operator,
            value: self.value,
            value_start: self.value_start,
            value_end: self.value_end,
        })
    }
}
