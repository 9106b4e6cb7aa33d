//! Book domain model.
//!
//! # Responsibility
//! - Define the persisted catalog record and its creation request.
//! - Validate required fields before any write reaches storage.
//!
//! # Invariants
//! - `title`, `author` are non-blank; `year` lies in [`MIN_YEAR`, `MAX_YEAR`].
//! - `subgenre` and `file` are optional and independent of each other.

use crate::model::genre::Genre;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned book identifier.
pub type BookId = i64;

/// Earliest accepted publication year.
pub const MIN_YEAR: i32 = 1000;
/// Latest accepted publication year.
pub const MAX_YEAR: i32 = 2030;

/// Attached digital copy descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookFile {
    /// Opaque file reference issued by the transport.
    pub file_id: String,
    /// Display file name.
    pub file_name: String,
    /// Size in bytes.
    pub file_size: i64,
    /// MIME type string.
    pub file_type: String,
}

/// Persisted catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub year: i32,
    pub description: String,
    pub genre: Genre,
    pub subgenre: Option<String>,
    pub file: Option<BookFile>,
}

/// Creation request for a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub year: i32,
    pub description: String,
    pub genre: Genre,
    pub subgenre: Option<String>,
    pub file: Option<BookFile>,
}

/// Validation failures for book fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookValidationError {
    EmptyTitle,
    EmptyAuthor,
    YearOutOfRange(i32),
    EmptySubgenre,
    NegativeFileSize(i64),
}

impl Display for BookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "book title must not be blank"),
            Self::EmptyAuthor => write!(f, "book author must not be blank"),
            Self::YearOutOfRange(year) => write!(
                f,
                "publication year {year} is outside {MIN_YEAR}..={MAX_YEAR}"
            ),
            Self::EmptySubgenre => write!(f, "subgenre must be absent or non-blank"),
            Self::NegativeFileSize(size) => write!(f, "file size must not be negative: {size}"),
        }
    }
}

impl Error for BookValidationError {}

impl NewBook {
    /// Checks required fields and ranges.
    pub fn validate(&self) -> Result<(), BookValidationError> {
        if self.title.trim().is_empty() {
            return Err(BookValidationError::EmptyTitle);
        }
        if self.author.trim().is_empty() {
            return Err(BookValidationError::EmptyAuthor);
        }
        validate_year(self.year)?;
        if matches!(self.subgenre.as_deref(), Some(value) if value.trim().is_empty()) {
            return Err(BookValidationError::EmptySubgenre);
        }
        if let Some(file) = &self.file {
            if file.file_size < 0 {
                return Err(BookValidationError::NegativeFileSize(file.file_size));
            }
        }
        Ok(())
    }
}

/// Checks that `year` is a plausible publication year.
pub fn validate_year(year: i32) -> Result<i32, BookValidationError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(year)
    } else {
        Err(BookValidationError::YearOutOfRange(year))
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_year, BookFile, BookValidationError, NewBook};
    use crate::model::genre::Genre;

    fn sample() -> NewBook {
        NewBook {
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            year: 1965,
            description: "Desert planet".to_string(),
            genre: Genre::Literature,
            subgenre: Some("Фантастика".to_string()),
            file: None,
        }
    }

    #[test]
    fn validate_accepts_complete_book() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_required_fields() {
        let mut book = sample();
        book.title = "   ".to_string();
        assert_eq!(book.validate(), Err(BookValidationError::EmptyTitle));

        let mut book = sample();
        book.author = String::new();
        assert_eq!(book.validate(), Err(BookValidationError::EmptyAuthor));

        let mut book = sample();
        book.subgenre = Some(" ".to_string());
        assert_eq!(book.validate(), Err(BookValidationError::EmptySubgenre));
    }

    #[test]
    fn validate_rejects_negative_file_size() {
        let mut book = sample();
        book.file = Some(BookFile {
            file_id: "f1".to_string(),
            file_name: "dune.epub".to_string(),
            file_size: -1,
            file_type: "application/epub+zip".to_string(),
        });
        assert_eq!(book.validate(), Err(BookValidationError::NegativeFileSize(-1)));
    }

    #[test]
    fn year_bounds_are_inclusive() {
        assert_eq!(validate_year(1000), Ok(1000));
        assert_eq!(validate_year(2030), Ok(2030));
        assert_eq!(
            validate_year(999),
            Err(BookValidationError::YearOutOfRange(999))
        );
        assert_eq!(
            validate_year(2031),
            Err(BookValidationError::YearOutOfRange(2031))
        );
    }
}
