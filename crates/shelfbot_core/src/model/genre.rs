//! Closed genre vocabulary.
//!
//! Every top-level genre owns a fixed subgenre vocabulary that the add-book
//! dialogue offers after the genre is chosen. Canonical names are the ones
//! persisted in `books.genre` / `books.subgenre`.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const LITERATURE_SUBGENRES: &[&str] = &[
    "Художественная",
    "Классическая",
    "Детектив",
    "Роман",
    "Фантастика",
    "Драма",
];

const TECHNICAL_SUBGENRES: &[&str] = &[
    "Программирование",
    "Инженерия",
    "Наука",
    "Архитектура",
    "Экономика",
    "Медицина",
];

/// Top-level catalog category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    /// Fiction and general literature.
    Literature,
    /// Technical and professional literature.
    Technical,
}

impl Genre {
    /// All genres in menu order.
    pub const ALL: [Genre; 2] = [Genre::Literature, Genre::Technical];

    /// Canonical stored name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Literature => "Литература",
            Self::Technical => "Тех литература",
        }
    }

    /// Subgenres offered for this genre, in menu order.
    pub fn subgenres(self) -> &'static [&'static str] {
        match self {
            Self::Literature => LITERATURE_SUBGENRES,
            Self::Technical => TECHNICAL_SUBGENRES,
        }
    }

    /// Returns whether `subgenre` belongs to this genre's vocabulary.
    pub fn has_subgenre(self, subgenre: &str) -> bool {
        self.subgenres().iter().any(|known| *known == subgenre)
    }

    /// Resolves user or storage input to a genre.
    ///
    /// Matches the canonical name case-insensitively, or the serde key.
    pub fn from_name(value: &str) -> Option<Self> {
        let normalized = value.trim().to_lowercase();
        Self::ALL.into_iter().find(|genre| {
            genre.as_str().to_lowercase() == normalized || genre.key() == normalized
        })
    }

    fn key(self) -> &'static str {
        match self {
            Self::Literature => "literature",
            Self::Technical => "technical",
        }
    }
}

impl Display for Genre {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Genre;

    #[test]
    fn from_name_is_case_insensitive_and_trims() {
        assert_eq!(Genre::from_name("  литература "), Some(Genre::Literature));
        assert_eq!(Genre::from_name("ТЕХ ЛИТЕРАТУРА"), Some(Genre::Technical));
        assert_eq!(Genre::from_name("technical"), Some(Genre::Technical));
        assert_eq!(Genre::from_name("Поэзия"), None);
    }

    #[test]
    fn subgenre_vocabularies_are_disjoint() {
        for subgenre in Genre::Literature.subgenres() {
            assert!(!Genre::Technical.has_subgenre(subgenre));
        }
        assert!(Genre::Literature.has_subgenre("Фантастика"));
        assert!(Genre::Technical.has_subgenre("Наука"));
    }
}
