//! Inbound actions and outbound responses exchanged with a chat transport.
//!
//! Discrete choices are a serde tagged union so a transport can encode them
//! into whatever callback payload it supports and decode them unchanged.

use crate::dialogue::ConversationId;
use crate::model::book::BookId;
use crate::model::field::EditableField;
use crate::model::genre::Genre;
use crate::model::user::ExternalUserId;
use serde::{Deserialize, Serialize};

/// Identity of the person behind an inbound action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: ExternalUserId,
    pub handle: Option<String>,
}

/// One inbound action from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub conversation: ConversationId,
    pub actor: Actor,
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Choice(Choice),
    Command(Command),
}

/// Discrete selection attached to a response button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Choice {
    /// Genre listing page, zero-based.
    ShowGenre { genre: Genre, page: u32 },
    BackToGenres,
    OpenBook { book_id: BookId },
    ToggleFavorite { book_id: BookId },
    ProfileAddPicker,
    ProfileRemovePicker,
    AddFavorite { book_id: BookId },
    RemoveFavorite { book_id: BookId },
    BackToProfile,
    /// Genre step of the add-book flow.
    PickGenre { genre: Genre },
    /// Subgenre step of the add-book flow; `None` skips.
    PickSubgenre { subgenre: Option<String> },
    EditBook { book_id: BookId },
    EditField { book_id: BookId, field: EditableField },
    DeleteBook { book_id: BookId },
    ConfirmDelete { book_id: BookId },
    BackToEditList,
}

/// Menu command, typed as a slash command or picked from a menu keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Start,
    Profile,
    Genres,
    Search,
    AdminPanel,
    AddBook,
    EditBooks,
    Statistics,
    MainMenu,
    Cancel,
}

impl Command {
    pub const ALL: [Command; 10] = [
        Command::Start,
        Command::Profile,
        Command::Genres,
        Command::Search,
        Command::AdminPanel,
        Command::AddBook,
        Command::EditBooks,
        Command::Statistics,
        Command::MainMenu,
        Command::Cancel,
    ];

    /// Slash-command name without the leading `/`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Profile => "profile",
            Self::Genres => "genres",
            Self::Search => "search",
            Self::AdminPanel => "admin",
            Self::AddBook => "add",
            Self::EditBooks => "edit",
            Self::Statistics => "stats",
            Self::MainMenu => "menu",
            Self::Cancel => "cancel",
        }
    }

    /// Menu keyboard label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Start => "🏠 Старт",
            Self::Profile => "👤 Мой профиль",
            Self::Genres => "📖 Жанры",
            Self::Search => "🔍 Поиск книг",
            Self::AdminPanel => "⚙️ Админ панель",
            Self::AddBook => "➕ Добавить книгу",
            Self::EditBooks => "✏️ Редактировать книги",
            Self::Statistics => "📊 Статистика",
            Self::MainMenu => "🔙 Главное меню",
            Self::Cancel => "❌ Отмена",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().trim_start_matches('/');
        Self::ALL.into_iter().find(|command| command.name() == name)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|command| command.label() == label)
    }
}

/// Persistent keyboard shown under a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    Main { admin: bool },
    Admin,
}

impl Menu {
    /// Keyboard rows of menu commands.
    pub fn rows(self) -> Vec<Vec<Command>> {
        match self {
            Self::Main { admin } => {
                let mut rows = vec![
                    vec![Command::Profile],
                    vec![Command::Genres, Command::Search],
                ];
                if admin {
                    rows.push(vec![Command::AdminPanel]);
                }
                rows
            }
            Self::Admin => vec![
                vec![Command::AddBook],
                vec![Command::EditBooks],
                vec![Command::Statistics],
                vec![Command::MainMenu],
            ],
        }
    }
}

/// Labeled button carrying a [`Choice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceButton {
    pub label: String,
    pub choice: Choice,
}

impl ChoiceButton {
    pub fn new(label: impl Into<String>, choice: Choice) -> Self {
        Self {
            label: label.into(),
            choice,
        }
    }
}

/// Outbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub text: String,
    pub choices: Vec<Vec<ChoiceButton>>,
    pub menu: Option<Menu>,
}

impl Response {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_row(mut self, row: Vec<ChoiceButton>) -> Self {
        if !row.is_empty() {
            self.choices.push(row);
        }
        self
    }

    pub fn with_button(self, button: ChoiceButton) -> Self {
        self.with_row(vec![button])
    }

    pub fn with_menu(mut self, menu: Menu) -> Self {
        self.menu = Some(menu);
        self
    }

    /// Buttons in reading order.
    pub fn buttons(&self) -> impl Iterator<Item = &ChoiceButton> {
        self.choices.iter().flatten()
    }
}
