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


//! Field catalog
//!
//! Maps every field identifier a rule can name onto exactly one resolution
//! strategy. The set of fields is closed: adding a field means adding a
//! `RuleField` variant and one arm in `RuleField::kind`, and the compiler
//! refuses to build until every match over `FieldKind` handles it.
//!
//! # Resolution strategies
//! - `Scalar` - a single value stored on the book, its metadata or its primary file
//! - `Collection` - an owned list of names (authors, categories, moods, tags, comic entities)
//! - `Progress` - a value derived from the acting user's progress row
//! - `Presence` - a "does this book have X" test keyed by an abstract field name
//! - `Series` - a classification derived from the book's sibling set
//! - `Unrecognized` - anything else; compiles to a vacuous predicate

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Field identifier a rule filters on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleField {
    Library,
    Title,
    Subtitle,
    Description,
    Publisher,
    Language,
    Isbn13,
    Isbn10,
    PublishedDate,
    PageCount,
    IsPhysical,
    MetadataScore,
    AddedOn,
    SeriesName,
    SeriesNumber,
    SeriesTotal,
    FileType,
    FileSize,
    AudiobookDuration,
    Authors,
    Categories,
    Moods,
    Tags,
    ComicCharacters,
    ComicTeams,
    ComicLocations,
    ReadStatus,
    ReadingProgress,
    PersonalRating,
    DateFinished,
    LastReadTime,
    MetadataPresence,
    SeriesStatus,
    SeriesGaps,
    SeriesPosition,
    /// Identifier not known to this version of the catalog (kept verbatim)
    Unrecognized(String),
}

/// How a field's value is obtained for a book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar(ScalarField),
    Collection(CollectionField),
    Progress(ProgressField),
    Presence,
    Series(SeriesFacet),
    Unrecognized,
}

/// Shape of a resolved value, used to pick operator semantics and parse literals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    Text,
    /// Closed vocabulary compared by equality only (read status)
    Token,
    Number,
    Boolean,
    Date,
    Timestamp,
    List,
}

/// Scalars stored directly on the book or its primary file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarField {
    Library,
    Title,
    Subtitle,
    Description,
    Publisher,
    Language,
    Isbn13,
    Isbn10,
    PublishedDate,
    PageCount,
    IsPhysical,
    MetadataScore,
    AddedOn,
    SeriesName,
    SeriesNumber,
    SeriesTotal,
    FileType,
    FileSize,
    AudiobookDuration,
}

impl ScalarField {
    pub fn shape(self) -> ValueShape {
        match self {
            ScalarField::Title
            | ScalarField::Subtitle
            | ScalarField::Description
            | ScalarField::Publisher
            | ScalarField::Language
            | ScalarField::Isbn13
            | ScalarField::Isbn10
            | ScalarField::SeriesName
            | ScalarField::FileType => ValueShape::Text,
            ScalarField::Library
            | ScalarField::PageCount
            | ScalarField::MetadataScore
            | ScalarField::SeriesNumber
            | ScalarField::SeriesTotal
            | ScalarField::FileSize
            | ScalarField::AudiobookDuration => ValueShape::Number,
            ScalarField::IsPhysical => ValueShape::Boolean,
            ScalarField::PublishedDate => ValueShape::Date,
            ScalarField::AddedOn => ValueShape::Timestamp,
        }
    }
}

/// Owned collections, each member represented by its name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionField {
    Authors,
    Categories,
    Moods,
    Tags,
    ComicCharacters,
    ComicTeams,
    ComicLocations,
}

/// Values resolved from the acting user's progress row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressField {
    ReadStatus,
    ReadingProgress,
    PersonalRating,
    DateFinished,
    LastReadTime,
}

impl ProgressField {
    pub fn shape(self) -> ValueShape {
        match self {
            ProgressField::ReadStatus => ValueShape::Token,
            ProgressField::ReadingProgress | ProgressField::PersonalRating => ValueShape::Number,
            ProgressField::DateFinished | ProgressField::LastReadTime => ValueShape::Timestamp,
        }
    }
}

/// Series-derived classifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesFacet {
    Status,
    Gaps,
    Position,
}

impl RuleField {
    /// Parse a field identifier
    ///
    /// Accepts `SCREAMING_SNAKE_CASE` as well as `camelCase` spellings
    /// (`PAGE_COUNT`, `pageCount`). Unknown identifiers are preserved as
    /// `Unrecognized` rather than rejected.
    pub fn parse(identifier: &str) -> Self {
        let normalized: String = identifier
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_uppercase();

        match normalized.as_str() {
            "LIBRARY" => RuleField::Library,
            "TITLE" => RuleField::Title,
            "SUBTITLE" => RuleField::Subtitle,
            "DESCRIPTION" => RuleField::Description,
            "PUBLISHER" => RuleField::Publisher,
            "LANGUAGE" => RuleField::Language,
            "ISBN13" => RuleField::Isbn13,
            "ISBN10" => RuleField::Isbn10,
            "PUBLISHEDDATE" => RuleField::PublishedDate,
            "PAGECOUNT" => RuleField::PageCount,
            "ISPHYSICAL" => RuleField::IsPhysical,
            "METADATASCORE" => RuleField::MetadataScore,
            "ADDEDON" => RuleField::AddedOn,
            "SERIESNAME" => RuleField::SeriesName,
            "SERIESNUMBER" => RuleField::SeriesNumber,
            "SERIESTOTAL" => RuleField::SeriesTotal,
            "FILETYPE" => RuleField::FileType,
            "FILESIZE" => RuleField::FileSize,
            "AUDIOBOOKDURATION" => RuleField::AudiobookDuration,
            "AUTHORS" => RuleField::Authors,
            "CATEGORIES" => RuleField::Categories,
            "MOODS" => RuleField::Moods,
            "TAGS" => RuleField::Tags,
            "COMICCHARACTERS" => RuleField::ComicCharacters,
            "COMICTEAMS" => RuleField::ComicTeams,
            "COMICLOCATIONS" => RuleField::ComicLocations,
            "READSTATUS" => RuleField::ReadStatus,
            "READINGPROGRESS" => RuleField::ReadingProgress,
            "PERSONALRATING" => RuleField::PersonalRating,
            "DATEFINISHED" => RuleField::DateFinished,
            "LASTREADTIME" => RuleField::LastReadTime,
            "METADATAPRESENCE" => RuleField::MetadataPresence,
            "SERIESSTATUS" => RuleField::SeriesStatus,
            "SERIESGAPS" => RuleField::SeriesGaps,
            "SERIESPOSITION" => RuleField::SeriesPosition,
            _ => RuleField::Unrecognized(identifier.trim().to_string()),
        }
    }

    /// Wire identifier
    pub fn as_str(&self) -> &str {
        match self {
            RuleField::Library => "LIBRARY",
            RuleField::Title => "TITLE",
            RuleField::Subtitle => "SUBTITLE",
            RuleField::Description => "DESCRIPTION",
            RuleField::Publisher => "PUBLISHER",
            RuleField::Language => "LANGUAGE",
            RuleField::Isbn13 => "ISBN13",
            RuleField::Isbn10 => "ISBN10",
            RuleField::PublishedDate => "PUBLISHED_DATE",
            RuleField::PageCount => "PAGE_COUNT",
            RuleField::IsPhysical => "IS_PHYSICAL",
            RuleField::MetadataScore => "METADATA_SCORE",
            RuleField::AddedOn => "ADDED_ON",
            RuleField::SeriesName => "SERIES_NAME",
            RuleField::SeriesNumber => "SERIES_NUMBER",
            RuleField::SeriesTotal => "SERIES_TOTAL",
            RuleField::FileType => "FILE_TYPE",
            RuleField::FileSize => "FILE_SIZE",
            RuleField::AudiobookDuration => "AUDIOBOOK_DURATION",
            RuleField::Authors => "AUTHORS",
            RuleField::Categories => "CATEGORIES",
            RuleField::Moods => "MOODS",
            RuleField::Tags => "TAGS",
            RuleField::ComicCharacters => "COMIC_CHARACTERS",
            RuleField::ComicTeams => "COMIC_TEAMS",
            RuleField::ComicLocations => "COMIC_LOCATIONS",
            RuleField::ReadStatus => "READ_STATUS",
            RuleField::ReadingProgress => "READING_PROGRESS",
            RuleField::PersonalRating => "PERSONAL_RATING",
            RuleField::DateFinished => "DATE_FINISHED",
            RuleField::LastReadTime => "LAST_READ_TIME",
            RuleField::MetadataPresence => "METADATA_PRESENCE",
            RuleField::SeriesStatus => "SERIES_STATUS",
            RuleField::SeriesGaps => "SERIES_GAPS",
            RuleField::SeriesPosition => "SERIES_POSITION",
            RuleField::Unrecognized(raw) => raw,
        }
    }

    /// Resolve the field to its strategy
    pub fn kind(&self) -> FieldKind {
        match self {
            RuleField::Library => FieldKind::Scalar(ScalarField::Library),
            RuleField::Title => FieldKind::Scalar(ScalarField::Title),
            RuleField::Subtitle => FieldKind::Scalar(ScalarField::Subtitle),
            RuleField::Description => FieldKind::Scalar(ScalarField::Description),
            RuleField::Publisher => FieldKind::Scalar(ScalarField::Publisher),
            RuleField::Language => FieldKind::Scalar(ScalarField::Language),
            RuleField::Isbn13 => FieldKind::Scalar(ScalarField::Isbn13),
            RuleField::Isbn10 => FieldKind::Scalar(ScalarField::Isbn10),
            RuleField::PublishedDate => FieldKind::Scalar(ScalarField::PublishedDate),
            RuleField::PageCount => FieldKind::Scalar(ScalarField::PageCount),
            RuleField::IsPhysical => FieldKind::Scalar(ScalarField::IsPhysical),
            RuleField::MetadataScore => FieldKind::Scalar(ScalarField::MetadataScore),
            RuleField::AddedOn => FieldKind::Scalar(ScalarField::AddedOn),
            RuleField::SeriesName => FieldKind::Scalar(ScalarField::SeriesName),
            RuleField::SeriesNumber => FieldKind::Scalar(ScalarField::SeriesNumber),
            RuleField::SeriesTotal => FieldKind::Scalar(ScalarField::SeriesTotal),
            RuleField::FileType => FieldKind::Scalar(ScalarField::FileType),
            RuleField::FileSize => FieldKind::Scalar(ScalarField::FileSize),
            RuleField::AudiobookDuration => FieldKind::Scalar(ScalarField::AudiobookDuration),
            RuleField::Authors => FieldKind::Collection(CollectionField::Authors),
            RuleField::Categories => FieldKind::Collection(CollectionField::Categories),
            RuleField::Moods => FieldKind::Collection(CollectionField::Moods),
            RuleField::Tags => FieldKind::Collection(CollectionField::Tags),
            RuleField::ComicCharacters => FieldKind::Collection(CollectionField::ComicCharacters),
            RuleField::ComicTeams => FieldKind::Collection(CollectionField::ComicTeams),
            RuleField::ComicLocations => FieldKind::Collection(CollectionField::ComicLocations),
            RuleField::ReadStatus => FieldKind::Progress(ProgressField::ReadStatus),
            RuleField::ReadingProgress => FieldKind::Progress(ProgressField::ReadingProgress),
            RuleField::PersonalRating => FieldKind::Progress(ProgressField::PersonalRating),
            RuleField::DateFinished => FieldKind::Progress(ProgressField::DateFinished),
            RuleField::LastReadTime => FieldKind::Progress(ProgressField::LastReadTime),
            RuleField::MetadataPresence => FieldKind::Presence,
            RuleField::SeriesStatus => FieldKind::Series(SeriesFacet::Status),
            RuleField::SeriesGaps => FieldKind::Series(SeriesFacet::Gaps),
            RuleField::SeriesPosition => FieldKind::Series(SeriesFacet::Position),
            RuleField::Unrecognized(_) => FieldKind::Unrecognized,
        }
    }

    /// True when the identifier is missing altogether (blank)
    pub fn is_blank(&self) -> bool {
        matches!(self, RuleField::Unrecognized(raw) if raw.trim().is_empty())
    }
}

impl fmt::Display for RuleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RuleField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RuleField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(RuleField::parse(&raw))
    }
}
