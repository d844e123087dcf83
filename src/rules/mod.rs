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


//! Smart shelf rules
//!
//! A shelf is a nested boolean rule tree over book metadata, the acting user's
//! reading progress and facts derived from series siblings. This module parses
//! such trees, compiles them into a `BookFilter` and evaluates the filter
//! against a `CatalogSnapshot`.
//!
//! # Layout
//! - `ast`: rule tree and its JSON form
//! - `field`: field identifiers and their resolution strategy
//! - `operator`: operator families and literal handling
//! - `progress`, `series`, `presence`: derived facts
//! - `predicate`: compiled form and evaluation
//! - `compiler`: rule tree to `BookFilter`

pub mod ast;
pub mod compiler;
pub mod dates;
pub mod field;
pub mod operator;
pub mod predicate;
pub mod presence;
pub mod progress;
pub mod series;
pub mod value;

pub use ast::{Join, Rule, RuleGroup, RuleNode, RuleValue};
pub use compiler::{BookFilter, RuleCompiler};
pub use field::RuleField;
pub use operator::RuleOperator;
pub use predicate::Predicate;
