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


//! Metadata presence resolver
//!
//! `METADATA_PRESENCE` rules name an abstract metadata key (`description`,
//! `authors`, `comicPencillers`, ...). A key is present when its scalar is set
//! (and non-blank for text), its collection is non-empty, or, for comic
//! creator roles, at least one creator with that role exists.

use crate::catalog::BookRecord;
use crate::rules::field::{CollectionField, ScalarField};
use crate::storage::models::{CreatorRole, UserBookProgress};

/// Metadata key tested by a presence rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresenceKey {
    Scalar(ScalarField),
    Collection(CollectionField),
    Creator(CreatorRole),
    PersonalRating,
}

impl PresenceKey {
    /// Parse a key name; matching ignores case (`isbn13`, `ISBN13`, `Isbn13`)
    pub fn parse(raw: &str) -> Option<Self> {
        let key = match raw.trim().to_ascii_lowercase().as_str() {
            "title" => PresenceKey::Scalar(ScalarField::Title),
            "subtitle" => PresenceKey::Scalar(ScalarField::Subtitle),
            "description" => PresenceKey::Scalar(ScalarField::Description),
            "publisher" => PresenceKey::Scalar(ScalarField::Publisher),
            "publisheddate" => PresenceKey::Scalar(ScalarField::PublishedDate),
            "language" => PresenceKey::Scalar(ScalarField::Language),
            "isbn13" => PresenceKey::Scalar(ScalarField::Isbn13),
            "isbn10" => PresenceKey::Scalar(ScalarField::Isbn10),
            "pagecount" => PresenceKey::Scalar(ScalarField::PageCount),
            "seriesname" => PresenceKey::Scalar(ScalarField::SeriesName),
            "seriesnumber" => PresenceKey::Scalar(ScalarField::SeriesNumber),
            "seriestotal" => PresenceKey::Scalar(ScalarField::SeriesTotal),
            "audiobookduration" => PresenceKey::Scalar(ScalarField::AudiobookDuration),
            "authors" => PresenceKey::Collection(CollectionField::Authors),
            "categories" => PresenceKey::Collection(CollectionField::Categories),
            "moods" => PresenceKey::Collection(CollectionField::Moods),
            "tags" => PresenceKey::Collection(CollectionField::Tags),
            "comiccharacters" => PresenceKey::Collection(CollectionField::ComicCharacters),
            "comicteams" => PresenceKey::Collection(CollectionField::ComicTeams),
            "comiclocations" => PresenceKey::Collection(CollectionField::ComicLocations),
            "comicpencillers" => PresenceKey::Creator(CreatorRole::Penciller),
            "comicinkers" => PresenceKey::Creator(CreatorRole::Inker),
            "comiccolorists" => PresenceKey::Creator(CreatorRole::Colorist),
            "comicletterers" => PresenceKey::Creator(CreatorRole::Letterer),
            "comiccoverartists" => PresenceKey::Creator(CreatorRole::CoverArtist),
            "comiceditors" => PresenceKey::Creator(CreatorRole::Editor),
            "comicwriters" => PresenceKey::Creator(CreatorRole::Writer),
            "personalrating" => PresenceKey::PersonalRating,
            _ => return None,
        };
        Some(key)
    }

    /// Whether the book (and the acting user's progress row) carries the key
    pub fn is_present(self, record: &BookRecord, progress: Option<&UserBookProgress>) -> bool {
        match self {
            PresenceKey::Scalar(field) => !record.scalar(field).is_empty(),
            PresenceKey::Collection(field) => !record.collection(field).is_empty(),
            PresenceKey::Creator(role) => record
                .comic
                .as_ref()
                .map_or(false, |comic| comic.has_creator(role)),
            PresenceKey::PersonalRating => progress.map_or(false, |row| row.personal_rating.is_some()),
        }
    }
}
