//! Dialogue state types.

use crate::model::book::{BookId, NewBook};
use crate::model::field::EditableField;
use crate::model::genre::Genre;

/// Unit of dialogue isolation, one per interacting chat.
pub type ConversationId = i64;

/// Step of the add-book flow, in collection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddBookStep {
    Title,
    Year,
    Author,
    Description,
    Genre,
    Subgenre,
}

/// Flat state label, stable for logging and transport-side routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateTag {
    WaitingTitle,
    WaitingYear,
    WaitingAuthor,
    WaitingDescription,
    WaitingGenre,
    WaitingSubgenre,
    WaitingValue,
    WaitingSearchQuery,
}

impl StateTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WaitingTitle => "waiting_title",
            Self::WaitingYear => "waiting_year",
            Self::WaitingAuthor => "waiting_author",
            Self::WaitingDescription => "waiting_description",
            Self::WaitingGenre => "waiting_genre",
            Self::WaitingSubgenre => "waiting_subgenre",
            Self::WaitingValue => "waiting_value",
            Self::WaitingSearchQuery => "waiting_search_query",
        }
    }
}

/// Fields collected so far by the add-book flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDraft {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub genre: Option<Genre>,
}

impl BookDraft {
    /// Builds the creation request once every required field is collected.
    ///
    /// Returns the name of the first missing field otherwise.
    pub fn finish(&self, subgenre: Option<String>) -> Result<NewBook, &'static str> {
        Ok(NewBook {
            title: self.title.clone().ok_or("title")?,
            author: self.author.clone().ok_or("author")?,
            year: self.year.ok_or("year")?,
            description: self.description.clone().ok_or("description")?,
            genre: self.genre.ok_or("genre")?,
            subgenre,
            file: None,
        })
    }
}

/// Live flow of one conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueState {
    AddBook { step: AddBookStep, draft: BookDraft },
    EditField { book_id: BookId, field: EditableField },
    Search,
}

impl DialogueState {
    /// Entry state of the add-book flow.
    pub fn add_book() -> Self {
        Self::AddBook {
            step: AddBookStep::Title,
            draft: BookDraft::default(),
        }
    }

    pub fn tag(&self) -> StateTag {
        match self {
            Self::AddBook { step, .. } => match step {
                AddBookStep::Title => StateTag::WaitingTitle,
                AddBookStep::Year => StateTag::WaitingYear,
                AddBookStep::Author => StateTag::WaitingAuthor,
                AddBookStep::Description => StateTag::WaitingDescription,
                AddBookStep::Genre => StateTag::WaitingGenre,
                AddBookStep::Subgenre => StateTag::WaitingSubgenre,
            },
            Self::EditField { .. } => StateTag::WaitingValue,
            Self::Search => StateTag::WaitingSearchQuery,
        }
    }
}
