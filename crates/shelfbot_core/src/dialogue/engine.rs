//! Dialogue state machine.
//!
//! Add-book flow:
//! `waiting_title -> waiting_year -> waiting_author -> waiting_description
//!  -> waiting_genre -> waiting_subgenre -> commit`.
//!
//! Edit flow: `waiting_value -> commit`, parametrized by book and field.
//!
//! Search flow: `waiting_search_query -> done` (no write).
//!
//! # Invariants
//! - Invalid input leaves the state untouched and yields a re-prompt.
//! - State is cleared only after the commit write succeeded, so a storage
//!   failure leaves the flow resumable and the catalog unchanged.

use crate::access::{AccessPolicy, AdminAction, PermissionDenied};
use crate::dialogue::input::{normalize_block, normalize_line};
use crate::dialogue::state::{AddBookStep, ConversationId, DialogueState, StateTag};
use crate::dialogue::store::DialogueStore;
use crate::model::book::{BookId, NewBook};
use crate::model::field::{parse_year, EditableField, FieldUpdate, FieldValueError};
use crate::model::genre::Genre;
use crate::model::user::ExternalUserId;
use crate::repo::book_repo::BookRepository;
use crate::repo::RepoError;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Discrete selection consumed by a running flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowChoice {
    Genre(Genre),
    /// `None` is the "skip" option.
    Subgenre(Option<String>),
}

/// What the presentation layer should ask for next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Title,
    Year,
    Author,
    Description,
    /// Closed genre choice.
    Genre,
    /// Subgenre choice for `genre`, always with a skip option.
    Subgenre { genre: Genre },
    FieldValue {
        book_id: BookId,
        field: EditableField,
    },
    SearchQuery,
}

/// Why input was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    BlankText,
    InvalidValue(FieldValueError),
    /// A discrete choice is expected in this state, not text.
    ExpectedChoice,
    /// The choice does not belong to the current state.
    UnexpectedChoice,
}

/// Result of feeding one inbound action to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced(Prompt),
    Reprompt { prompt: Prompt, reason: Rejection },
    BookCreated { book_id: BookId, book: NewBook },
    FieldUpdated { book_id: BookId, update: FieldUpdate },
    BookNotFound { book_id: BookId },
    /// Search flow finished with a normalized query.
    SearchSubmitted(String),
    NoActiveFlow,
}

/// Dialogue failures that are not recovered by re-prompting.
#[derive(Debug)]
pub enum DialogueError {
    PermissionDenied(PermissionDenied),
    /// Storage failure at a commit transition.
    Repo(RepoError),
    /// Stored state is inconsistent with its own step.
    InconsistentState(&'static str),
}

impl Display for DialogueError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent dialogue state: {details}"),
        }
    }
}

impl Error for DialogueError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::PermissionDenied(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<PermissionDenied> for DialogueError {
    fn from(value: PermissionDenied) -> Self {
        Self::PermissionDenied(value)
    }
}

impl From<RepoError> for DialogueError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub type DialogueResult<T> = Result<T, DialogueError>;

/// Drives guided flows over a [`DialogueStore`].
#[derive(Debug, Default)]
pub struct DialogueEngine {
    store: DialogueStore,
    policy: AccessPolicy,
}

impl DialogueEngine {
    pub fn new(policy: AccessPolicy) -> Self {
        Self {
            store: DialogueStore::new(),
            policy,
        }
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    pub fn store(&self) -> &DialogueStore {
        &self.store
    }

    /// Current state label of `conversation`, if a flow is live.
    pub fn current(&self, conversation: ConversationId) -> Option<StateTag> {
        self.store.get(conversation).map(|state| state.tag())
    }

    /// Starts the add-book flow, discarding any live flow.
    pub fn start_add_book(
        &self,
        conversation: ConversationId,
        user: ExternalUserId,
    ) -> DialogueResult<Prompt> {
        self.policy.ensure_admin(user, AdminAction::AddBook)?;
        self.begin(conversation, DialogueState::add_book());
        Ok(Prompt::Title)
    }

    /// Starts a single-field edit of an existing book.
    pub fn start_edit_field(
        &self,
        conversation: ConversationId,
        user: ExternalUserId,
        book_id: BookId,
        field: EditableField,
        books: &impl BookRepository,
    ) -> DialogueResult<StepOutcome> {
        self.policy.ensure_admin(user, AdminAction::EditField)?;
        if books.get_book(book_id)?.is_none() {
            return Ok(StepOutcome::BookNotFound { book_id });
        }
        self.begin(conversation, DialogueState::EditField { book_id, field });
        Ok(StepOutcome::Advanced(Prompt::FieldValue { book_id, field }))
    }

    /// Starts the one-step search flow.
    pub fn start_search(&self, conversation: ConversationId) -> Prompt {
        self.begin(conversation, DialogueState::Search);
        Prompt::SearchQuery
    }

    /// Abandons the live flow; returns whether one existed.
    pub fn cancel(&self, conversation: ConversationId) -> bool {
        match self.store.clear(conversation) {
            Some(state) => {
                info!(
                    "event=dialogue_cancel module=dialogue status=ok conversation={} state={}",
                    conversation,
                    state.tag().as_str()
                );
                true
            }
            None => false,
        }
    }

    /// Feeds free text to the live flow.
    pub fn handle_text(
        &self,
        conversation: ConversationId,
        text: &str,
        books: &impl BookRepository,
    ) -> DialogueResult<StepOutcome> {
        let Some(state) = self.store.get(conversation) else {
            return Ok(StepOutcome::NoActiveFlow);
        };

        match state {
            DialogueState::AddBook { step, mut draft } => {
                let next_step = match step {
                    AddBookStep::Title => {
                        let Some(title) = normalize_line(text) else {
                            return Ok(reprompt(Prompt::Title, Rejection::BlankText));
                        };
                        draft.title = Some(title);
                        AddBookStep::Year
                    }
                    AddBookStep::Year => match parse_year(text) {
                        Ok(year) => {
                            draft.year = Some(year);
                            AddBookStep::Author
                        }
                        Err(err) => {
                            return Ok(reprompt(Prompt::Year, Rejection::InvalidValue(err)));
                        }
                    },
                    AddBookStep::Author => {
                        let Some(author) = normalize_line(text) else {
                            return Ok(reprompt(Prompt::Author, Rejection::BlankText));
                        };
                        draft.author = Some(author);
                        AddBookStep::Description
                    }
                    AddBookStep::Description => {
                        draft.description = Some(normalize_block(text));
                        AddBookStep::Genre
                    }
                    AddBookStep::Genre => {
                        return Ok(reprompt(Prompt::Genre, Rejection::ExpectedChoice));
                    }
                    AddBookStep::Subgenre => {
                        let genre = draft
                            .genre
                            .ok_or(DialogueError::InconsistentState("subgenre step without genre"))?;
                        return Ok(reprompt(
                            Prompt::Subgenre { genre },
                            Rejection::ExpectedChoice,
                        ));
                    }
                };

                let prompt = prompt_for(next_step, draft.genre);
                self.store.set(
                    conversation,
                    DialogueState::AddBook {
                        step: next_step,
                        draft,
                    },
                );
                Ok(StepOutcome::Advanced(prompt))
            }
            DialogueState::EditField { book_id, field } => {
                self.commit_edit(conversation, book_id, field, text, books)
            }
            DialogueState::Search => {
                let Some(query) = normalize_line(text) else {
                    return Ok(reprompt(Prompt::SearchQuery, Rejection::BlankText));
                };
                self.store.clear(conversation);
                Ok(StepOutcome::SearchSubmitted(query))
            }
        }
    }

    /// Feeds a discrete selection to the live flow.
    pub fn handle_choice(
        &self,
        conversation: ConversationId,
        choice: FlowChoice,
        books: &impl BookRepository,
    ) -> DialogueResult<StepOutcome> {
        let Some(state) = self.store.get(conversation) else {
            return Ok(StepOutcome::NoActiveFlow);
        };

        let prompt = current_prompt(&state);
        let DialogueState::AddBook { step, mut draft } = state else {
            return Ok(reprompt(prompt, Rejection::UnexpectedChoice));
        };

        match (step, choice) {
            (AddBookStep::Genre, FlowChoice::Genre(genre)) => {
                draft.genre = Some(genre);
                self.store.set(
                    conversation,
                    DialogueState::AddBook {
                        step: AddBookStep::Subgenre,
                        draft,
                    },
                );
                Ok(StepOutcome::Advanced(Prompt::Subgenre { genre }))
            }
            (AddBookStep::Subgenre, FlowChoice::Subgenre(subgenre)) => {
                let genre = draft
                    .genre
                    .ok_or(DialogueError::InconsistentState("subgenre step without genre"))?;
                if matches!(subgenre.as_deref(), Some(value) if !genre.has_subgenre(value)) {
                    return Ok(reprompt(
                        Prompt::Subgenre { genre },
                        Rejection::UnexpectedChoice,
                    ));
                }

                let book = draft
                    .finish(subgenre)
                    .map_err(|_| DialogueError::InconsistentState("add-book draft incomplete"))?;
                let book_id = match books.create_book(&book) {
                    Ok(book_id) => book_id,
                    Err(err) => {
                        error!(
                            "event=dialogue_commit module=dialogue status=error conversation={} flow=add_book error={}",
                            conversation, err
                        );
                        return Err(err.into());
                    }
                };
                self.store.clear(conversation);
                info!(
                    "event=dialogue_commit module=dialogue status=ok conversation={conversation} flow=add_book book_id={book_id}"
                );
                Ok(StepOutcome::BookCreated { book_id, book })
            }
            _ => Ok(reprompt(prompt, Rejection::UnexpectedChoice)),
        }
    }

    fn commit_edit(
        &self,
        conversation: ConversationId,
        book_id: BookId,
        field: EditableField,
        text: &str,
        books: &impl BookRepository,
    ) -> DialogueResult<StepOutcome> {
        let update = match field.parse_value(text) {
            Ok(update) => update,
            Err(err) => {
                return Ok(reprompt(
                    Prompt::FieldValue { book_id, field },
                    Rejection::InvalidValue(err),
                ));
            }
        };

        let updated = match books.update_field(book_id, &update) {
            Ok(updated) => updated,
            Err(err) => {
                error!(
                    "event=dialogue_commit module=dialogue status=error conversation={} flow=edit_field book_id={} error={}",
                    conversation, book_id, err
                );
                return Err(err.into());
            }
        };
        self.store.clear(conversation);

        if !updated {
            return Ok(StepOutcome::BookNotFound { book_id });
        }
        info!(
            "event=dialogue_commit module=dialogue status=ok conversation={} flow=edit_field book_id={} field={}",
            conversation,
            book_id,
            field.as_str()
        );
        Ok(StepOutcome::FieldUpdated { book_id, update })
    }

    fn begin(&self, conversation: ConversationId, state: DialogueState) {
        let tag = state.tag();
        if let Some(previous) = self.store.set(conversation, state) {
            info!(
                "event=dialogue_discard module=dialogue status=ok conversation={} state={}",
                conversation,
                previous.tag().as_str()
            );
        }
        info!(
            "event=dialogue_start module=dialogue status=ok conversation={} state={}",
            conversation,
            tag.as_str()
        );
    }
}

fn reprompt(prompt: Prompt, reason: Rejection) -> StepOutcome {
    StepOutcome::Reprompt { prompt, reason }
}

fn prompt_for(step: AddBookStep, genre: Option<Genre>) -> Prompt {
    match step {
        AddBookStep::Title => Prompt::Title,
        AddBookStep::Year => Prompt::Year,
        AddBookStep::Author => Prompt::Author,
        AddBookStep::Description => Prompt::Description,
        AddBookStep::Genre => Prompt::Genre,
        AddBookStep::Subgenre => match genre {
            Some(genre) => Prompt::Subgenre { genre },
            None => Prompt::Genre,
        },
    }
}

fn current_prompt(state: &DialogueState) -> Prompt {
    match state {
        DialogueState::AddBook { step, draft } => prompt_for(*step, draft.genre),
        DialogueState::EditField { book_id, field } => Prompt::FieldValue {
            book_id: *book_id,
            field: *field,
        },
        DialogueState::Search => Prompt::SearchQuery,
    }
}
