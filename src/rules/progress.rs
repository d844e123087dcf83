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


//! Reading progress resolver
//!
//! A (user, book) pair has at most one progress row, but that row carries one
//! percentage per reader integration. Rules see a single number: the largest
//! recorded percentage, or `0` when there is no row.

use crate::rules::field::ProgressField;
use crate::rules::value::FieldValue;
use crate::storage::models::{ReadStatus, UserBookProgress};

/// Resolved progress percentage (never decreases when a source is added)
pub fn resolve_progress(progress: Option<&UserBookProgress>) -> f64 {
    progress
        .map(|row| {
            row.source_percentages()
                .into_iter()
                .flatten()
                .fold(0.0, f64::max)
        })
        .unwrap_or(0.0)
}

/// READ_STATUS token; `UNSET` when no row (or no status) is recorded
pub fn read_status_token(progress: Option<&UserBookProgress>) -> &'static str {
    progress
        .and_then(UserBookProgress::get_read_status)
        .map_or(ReadStatus::UNSET, |status| status.as_str())
}

/// Status used for series classification; absence counts as UNREAD
pub fn series_read_status(progress: Option<&UserBookProgress>) -> ReadStatus {
    progress
        .and_then(UserBookProgress::get_read_status)
        .unwrap_or(ReadStatus::Unread)
}

/// Resolve a progress-derived field for the acting user's row
pub fn progress_value(field: ProgressField, progress: Option<&UserBookProgress>) -> FieldValue<'static> {
    match field {
        ProgressField::ReadStatus => FieldValue::Text(read_status_token(progress)),
        ProgressField::ReadingProgress => FieldValue::Number(resolve_progress(progress)),
        ProgressField::PersonalRating => {
            FieldValue::number(progress.and_then(|row| row.personal_rating))
        }
        ProgressField::DateFinished => {
            FieldValue::timestamp(progress.and_then(|row| row.date_finished))
        }
        ProgressField::LastReadTime => {
            FieldValue::timestamp(progress.and_then(|row| row.last_read_time))
        }
    }
}
