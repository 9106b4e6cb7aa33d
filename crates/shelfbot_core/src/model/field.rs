//! Single-field edit contract.
//!
//! # Responsibility
//! - Enumerate the editable book fields as a closed set.
//! - Own each field's input validator and produce typed updates.
//!
//! # Invariants
//! - A [`FieldUpdate`] always carries a value that passed its field's
//!   validator, so storage never sees unchecked string-keyed mutation.

use crate::model::book::validate_year;
use crate::model::genre::Genre;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Input that clears the optional subgenre during an edit.
pub const CLEAR_SUBGENRE_INPUT: &str = "-";

/// Book field that can be changed through the edit flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditableField {
    Title,
    Author,
    Year,
    Description,
    Genre,
    Subgenre,
}

/// Validated single-field change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Title(String),
    Author(String),
    Year(i32),
    Description(String),
    Genre(Genre),
    Subgenre(Option<String>),
}

/// Rejected edit input; the dialogue re-prompts on any of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValueError {
    Blank(EditableField),
    NotAnInteger(String),
    YearOutOfRange(i32),
    UnknownGenre(String),
}

impl Display for FieldValueError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank(field) => write!(f, "{} must not be blank", field.as_str()),
            Self::NotAnInteger(value) => write!(f, "`{value}` is not an integer year"),
            Self::YearOutOfRange(year) => write!(f, "year {year} is out of range"),
            Self::UnknownGenre(value) => write!(f, "unknown genre `{value}`"),
        }
    }
}

impl Error for FieldValueError {}

impl EditableField {
    /// All editable fields in menu order.
    pub const ALL: [EditableField; 6] = [
        EditableField::Title,
        EditableField::Author,
        EditableField::Year,
        EditableField::Description,
        EditableField::Genre,
        EditableField::Subgenre,
    ];

    /// Stable field name, equal to the storage column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Year => "year",
            Self::Description => "description",
            Self::Genre => "genre",
            Self::Subgenre => "subgenre",
        }
    }

    /// Validates raw user input for this field.
    pub fn parse_value(self, raw: &str) -> Result<FieldUpdate, FieldValueError> {
        let value = raw.trim();
        match self {
            Self::Year => parse_year(value).map(FieldUpdate::Year),
            Self::Genre => Genre::from_name(value)
                .map(FieldUpdate::Genre)
                .ok_or_else(|| FieldValueError::UnknownGenre(value.to_string())),
            Self::Subgenre if value == CLEAR_SUBGENRE_INPUT => Ok(FieldUpdate::Subgenre(None)),
            _ if value.is_empty() => Err(FieldValueError::Blank(self)),
            Self::Title => Ok(FieldUpdate::Title(value.to_string())),
            Self::Author => Ok(FieldUpdate::Author(value.to_string())),
            Self::Description => Ok(FieldUpdate::Description(value.to_string())),
            Self::Subgenre => Ok(FieldUpdate::Subgenre(Some(value.to_string()))),
        }
    }
}

impl FieldUpdate {
    /// Field this update targets.
    pub fn field(&self) -> EditableField {
        match self {
            Self::Title(_) => EditableField::Title,
            Self::Author(_) => EditableField::Author,
            Self::Year(_) => EditableField::Year,
            Self::Description(_) => EditableField::Description,
            Self::Genre(_) => EditableField::Genre,
            Self::Subgenre(_) => EditableField::Subgenre,
        }
    }
}

/// Parses a year as typed by a user: integer first, range second.
pub fn parse_year(raw: &str) -> Result<i32, FieldValueError> {
    let trimmed = raw.trim();
    let year = trimmed
        .parse::<i32>()
        .map_err(|_| FieldValueError::NotAnInteger(trimmed.to_string()))?;
    validate_year(year).map_err(|_| FieldValueError::YearOutOfRange(year))
}
