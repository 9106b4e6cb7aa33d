//! Inbound action routing.
//!
//! Free text goes to the live dialogue flow when one exists; everything
//! else is a stateless query or an admin action behind the access policy.

use crate::access::{AccessPolicy, AdminAction};
use crate::bot::action::{Actor, Choice, ChoiceButton, Command, Inbound, Menu, Payload, Response};
use crate::bot::render;
use crate::bot::BotResult;
use crate::dialogue::{
    ConversationId, DialogueEngine, DialogueError, FlowChoice, Prompt, StepOutcome,
};
use crate::model::book::BookId;
use crate::model::field::EditableField;
use crate::model::genre::Genre;
use crate::model::user::ExternalUserId;
use crate::repo::book_repo::SqliteBookRepository;
use crate::repo::favorite_repo::SqliteFavoriteRepository;
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::service::catalog_service::{CatalogService, PICKER_LIST_LIMIT};
use crate::service::favorite_service::{FavoriteService, ToggleOutcome};
use crate::service::recommendation_service::RecommendationService;
use crate::service::stats_service::collect_stats;
use log::{debug, info};
use rusqlite::Connection;
use std::time::Duration;

/// Recommendations shown on the profile view.
pub const PROFILE_RECOMMENDATIONS: usize = 3;
/// Search hits offered as buttons.
pub const SEARCH_RESULT_BUTTONS: usize = 10;

/// Per-action context.
struct Turn<'a> {
    conn: &'a Connection,
    conversation: ConversationId,
    actor: &'a Actor,
}

impl<'a> Turn<'a> {
    fn user(&self) -> ExternalUserId {
        self.actor.id
    }

    fn books(&self) -> SqliteBookRepository<'a> {
        SqliteBookRepository::new(self.conn)
    }

    fn catalog(&self) -> CatalogService<SqliteBookRepository<'a>> {
        CatalogService::new(self.books())
    }

    fn favorites(&self) -> FavoriteService<SqliteFavoriteRepository<'a>> {
        FavoriteService::new(SqliteFavoriteRepository::new(self.conn))
    }
}

/// Chat-transport-neutral bot. One instance serves every conversation.
#[derive(Debug, Default)]
pub struct Bot {
    engine: DialogueEngine,
}

impl Bot {
    pub fn new(policy: AccessPolicy) -> Self {
        Self {
            engine: DialogueEngine::new(policy),
        }
    }

    pub fn engine(&self) -> &DialogueEngine {
        &self.engine
    }

    /// Drops dialogue states idle for longer than `max_idle`.
    pub fn expire_idle(&self, max_idle: Duration) -> usize {
        let expired = self.engine.store().expire_idle(max_idle);
        if expired > 0 {
            info!("event=dialogue_expire module=bot status=ok expired={expired}");
        }
        expired
    }

    /// Handles one inbound action and returns the message to show.
    ///
    /// # Errors
    /// Storage failures. Denials, validation failures and missing books are
    /// rendered responses, not errors.
    pub fn handle(&self, conn: &Connection, inbound: &Inbound) -> BotResult<Response> {
        SqliteUserRepository::new(conn)
            .upsert_user(inbound.actor.id, inbound.actor.handle.as_deref())?;

        let turn = Turn {
            conn,
            conversation: inbound.conversation,
            actor: &inbound.actor,
        };
        match &inbound.payload {
            Payload::Command(command) => self.on_command(&turn, *command),
            Payload::Text(text) => self.on_text(&turn, text),
            Payload::Choice(choice) => self.on_choice(&turn, choice),
        }
    }

    fn on_command(&self, turn: &Turn<'_>, command: Command) -> BotResult<Response> {
        debug!(
            "event=bot_route module=bot status=start conversation={} kind=command command={}",
            turn.conversation,
            command.name()
        );
        match command {
            Command::Start => Ok(self.welcome(turn)),
            Command::MainMenu => {
                self.engine.cancel(turn.conversation);
                Ok(self.welcome(turn))
            }
            Command::Cancel => {
                let text = if self.engine.cancel(turn.conversation) {
                    render::CANCELLED
                } else {
                    render::NOTHING_TO_CANCEL
                };
                Ok(Response::text(text).with_menu(self.main_menu(turn.user())))
            }
            Command::Profile => self.profile(turn),
            Command::Genres => Ok(genre_menu()),
            Command::Search => Ok(prompt_response(&self.engine.start_search(turn.conversation))),
            Command::AdminPanel => Ok(self
                .deny(turn, AdminAction::OpenPanel)
                .unwrap_or_else(|| Response::text(render::ADMIN_PANEL).with_menu(Menu::Admin))),
            Command::AddBook => match self.engine.start_add_book(turn.conversation, turn.user()) {
                Ok(prompt) => Ok(prompt_response(&prompt)),
                Err(err) => dialogue_failure(err),
            },
            Command::EditBooks => match self.deny(turn, AdminAction::ListForEdit) {
                Some(denied) => Ok(denied),
                None => self.edit_list(turn),
            },
            Command::Statistics => match self.deny(turn, AdminAction::ViewStatistics) {
                Some(denied) => Ok(denied),
                None => {
                    let stats = collect_stats(&turn.books(), &SqliteUserRepository::new(turn.conn))?;
                    Ok(Response::text(render::statistics(&stats)).with_menu(Menu::Admin))
                }
            },
        }
    }

    fn on_text(&self, turn: &Turn<'_>, text: &str) -> BotResult<Response> {
        // Menu keyboard labels win over a live flow; they are never stored
        // as field values.
        if let Some(command) = Command::from_label(text) {
            return self.on_command(turn, command);
        }

        if self.engine.current(turn.conversation).is_none() {
            return Ok(Response::text(render::UNKNOWN_INPUT).with_menu(self.main_menu(turn.user())));
        }

        debug!(
            "event=bot_route module=bot status=start conversation={} kind=dialogue_text",
            turn.conversation
        );
        match self.engine.handle_text(turn.conversation, text, &turn.books()) {
            Ok(outcome) => self.outcome_response(turn, outcome),
            Err(err) => dialogue_failure(err),
        }
    }

    fn on_choice(&self, turn: &Turn<'_>, choice: &Choice) -> BotResult<Response> {
        debug!(
            "event=bot_route module=bot status=start conversation={} kind=choice",
            turn.conversation
        );
        let user = turn.user();
        match choice {
            Choice::PickGenre { genre } => self.flow_choice(turn, FlowChoice::Genre(*genre)),
            Choice::PickSubgenre { subgenre } => {
                self.flow_choice(turn, FlowChoice::Subgenre(subgenre.clone()))
            }
            Choice::ShowGenre { genre, page } => self.genre_page(turn, *genre, *page),
            Choice::BackToGenres => Ok(genre_menu()),
            Choice::OpenBook { book_id } => self.book_card(turn, *book_id, None),
            Choice::ToggleFavorite { book_id } => {
                let notice = match turn.favorites().toggle(user, *book_id)? {
                    ToggleOutcome::Added => render::favorite_added(true),
                    ToggleOutcome::Removed => render::favorite_removed(true),
                    ToggleOutcome::Unchanged => render::NOT_FOUND,
                };
                self.book_card(turn, *book_id, Some(notice))
            }
            Choice::ProfileAddPicker => self.add_favorite_picker(turn),
            Choice::ProfileRemovePicker => self.remove_favorite_picker(turn),
            Choice::AddFavorite { book_id } => {
                let added = turn.favorites().add(user, *book_id)?;
                Ok(Response::text(render::favorite_added(added)).with_button(back_to_profile()))
            }
            Choice::RemoveFavorite { book_id } => {
                let removed = turn.favorites().remove(user, *book_id)?;
                Ok(Response::text(render::favorite_removed(removed)).with_button(back_to_profile()))
            }
            Choice::BackToProfile => self.profile(turn),
            Choice::EditBook { book_id } => match self.deny(turn, AdminAction::ListForEdit) {
                Some(denied) => Ok(denied),
                None => self.edit_menu(turn, *book_id),
            },
            Choice::EditField { book_id, field } => match self.engine.start_edit_field(
                turn.conversation,
                user,
                *book_id,
                *field,
                &turn.books(),
            ) {
                Ok(outcome) => self.outcome_response(turn, outcome),
                Err(err) => dialogue_failure(err),
            },
            Choice::DeleteBook { book_id } => match self.deny(turn, AdminAction::DeleteBook) {
                Some(denied) => Ok(denied),
                None => self.confirm_delete(turn, *book_id),
            },
            Choice::ConfirmDelete { book_id } => match self.deny(turn, AdminAction::DeleteBook) {
                Some(denied) => Ok(denied),
                None => {
                    let deleted = turn.catalog().delete_book(*book_id)?;
                    info!(
                        "event=admin_delete module=bot status={} user={} book_id={}",
                        if deleted { "ok" } else { "not_found" },
                        user,
                        book_id
                    );
                    let text = if deleted {
                        render::BOOK_DELETED
                    } else {
                        render::NOT_FOUND
                    };
                    Ok(Response::text(text).with_button(back_to_edit_list()))
                }
            },
            Choice::BackToEditList => match self.deny(turn, AdminAction::ListForEdit) {
                Some(denied) => Ok(denied),
                None => self.edit_list(turn),
            },
        }
    }

    fn flow_choice(&self, turn: &Turn<'_>, choice: FlowChoice) -> BotResult<Response> {
        match self
            .engine
            .handle_choice(turn.conversation, choice, &turn.books())
        {
            Ok(outcome) => self.outcome_response(turn, outcome),
            Err(err) => dialogue_failure(err),
        }
    }

    fn outcome_response(&self, turn: &Turn<'_>, outcome: StepOutcome) -> BotResult<Response> {
        match outcome {
            StepOutcome::Advanced(prompt) => Ok(prompt_response(&prompt)),
            StepOutcome::Reprompt { prompt, reason } => {
                let mut response = prompt_response(&prompt);
                response.text = format!("{}\n{}", render::rejection(&reason), response.text);
                Ok(response)
            }
            StepOutcome::BookCreated { book_id, book } => {
                Ok(Response::text(render::book_created(book_id, &book.title))
                    .with_button(ChoiceButton::new(
                        "✏️ Редактировать",
                        Choice::EditBook { book_id },
                    ))
                    .with_menu(Menu::Admin))
            }
            StepOutcome::FieldUpdated { book_id, update } => {
                Ok(Response::text(render::field_updated(update.field()))
                    .with_button(ChoiceButton::new("🔙 К книге", Choice::EditBook { book_id })))
            }
            StepOutcome::BookNotFound { .. } => {
                Ok(Response::text(render::NOT_FOUND).with_button(back_to_edit_list()))
            }
            StepOutcome::SearchSubmitted(query) => self.search_results(turn, &query),
            StepOutcome::NoActiveFlow => {
                Ok(Response::text(render::NO_ACTIVE_FLOW).with_menu(self.main_menu(turn.user())))
            }
        }
    }

    fn welcome(&self, turn: &Turn<'_>) -> Response {
        Response::text(render::welcome(turn.actor.handle.as_deref()))
            .with_menu(self.main_menu(turn.user()))
    }

    fn main_menu(&self, user: ExternalUserId) -> Menu {
        Menu::Main {
            admin: self.engine.policy().is_admin(user),
        }
    }

    /// Denial response when `action` is not allowed for the acting user.
    fn deny(&self, turn: &Turn<'_>, action: AdminAction) -> Option<Response> {
        self.engine
            .policy()
            .ensure_admin(turn.user(), action)
            .err()
            .map(|denied| Response::text(render::denied(denied.action)))
    }

    fn genre_page(&self, turn: &Turn<'_>, genre: Genre, page: u32) -> BotResult<Response> {
        let page = turn.catalog().genre_page(genre, page)?;
        if page.total_count == 0 {
            return Ok(Response::text(render::NO_BOOKS_IN_GENRE).with_button(back_to_genres()));
        }

        let mut response = Response::text(render::genre_page(genre, page.page, &page.items));
        for book in &page.items {
            response = response.with_button(ChoiceButton::new(
                format!("📖 {}", book.title),
                Choice::OpenBook { book_id: book.id },
            ));
        }

        let mut navigation = Vec::new();
        if page.has_previous() {
            navigation.push(ChoiceButton::new(
                "⬅️ Назад",
                Choice::ShowGenre {
                    genre,
                    page: page.page - 1,
                },
            ));
        }
        if page.has_next() {
            navigation.push(ChoiceButton::new(
                "➡️ Далее",
                Choice::ShowGenre {
                    genre,
                    page: page.page.saturating_add(1),
                },
            ));
        }
        Ok(response.with_row(navigation).with_button(back_to_genres()))
    }

    fn book_card(
        &self,
        turn: &Turn<'_>,
        book_id: BookId,
        notice: Option<&str>,
    ) -> BotResult<Response> {
        let Some(book) = turn.catalog().get_book(book_id)? else {
            return Ok(Response::text(render::NOT_FOUND).with_button(back_to_genres()));
        };
        let is_favorite = turn.favorites().is_favorite(turn.user(), book_id)?;

        let card = render::book_card(&book);
        let text = match notice {
            Some(notice) => format!("{notice}\n\n{card}"),
            None => card,
        };
        Ok(Response::text(text)
            .with_button(ChoiceButton::new(
                render::toggle_label(is_favorite),
                Choice::ToggleFavorite { book_id },
            ))
            .with_button(ChoiceButton::new(
                "🔙 Назад",
                Choice::ShowGenre {
                    genre: book.genre,
                    page: 0,
                },
            )))
    }

    fn profile(&self, turn: &Turn<'_>) -> BotResult<Response> {
        let user = turn.user();
        let favorites = turn.favorites().list(user)?;
        let mut recommendations = if favorites.is_empty() {
            Vec::new()
        } else {
            RecommendationService::new(turn.books(), SqliteFavoriteRepository::new(turn.conn))
                .recommend(user)?
        };
        recommendations.truncate(PROFILE_RECOMMENDATIONS);

        Ok(Response::text(render::profile(&favorites, &recommendations))
            .with_button(ChoiceButton::new(
                "➕ Добавить в избранное",
                Choice::ProfileAddPicker,
            ))
            .with_button(ChoiceButton::new(
                "➖ Удалить из избранного",
                Choice::ProfileRemovePicker,
            )))
    }

    fn add_favorite_picker(&self, turn: &Turn<'_>) -> BotResult<Response> {
        let books = turn.catalog().list_books(Some(PICKER_LIST_LIMIT), 0)?;
        if books.is_empty() {
            return Ok(Response::text(render::NO_BOOKS_IN_CATALOG).with_button(back_to_profile()));
        }
        let response = books.iter().fold(
            Response::text("Выберите книгу для добавления в избранное:"),
            |response, book| {
                response.with_button(ChoiceButton::new(
                    format!("➕ {}", book.title),
                    Choice::AddFavorite { book_id: book.id },
                ))
            },
        );
        Ok(response.with_button(back_to_profile()))
    }

    fn remove_favorite_picker(&self, turn: &Turn<'_>) -> BotResult<Response> {
        let favorites = turn.favorites().list(turn.user())?;
        if favorites.is_empty() {
            return Ok(Response::text(render::NO_FAVORITES).with_button(back_to_profile()));
        }
        let response = favorites
            .iter()
            .take(PICKER_LIST_LIMIT as usize)
            .fold(
                Response::text("Выберите книгу для удаления из избранного:"),
                |response, book| {
                    response.with_button(ChoiceButton::new(
                        format!("➖ {}", book.title),
                        Choice::RemoveFavorite { book_id: book.id },
                    ))
                },
            );
        Ok(response.with_button(back_to_profile()))
    }

    fn search_results(&self, turn: &Turn<'_>, query: &str) -> BotResult<Response> {
        let books = turn.catalog().search(query)?;
        info!(
            "event=search module=bot status=ok conversation={} hits={}",
            turn.conversation,
            books.len()
        );
        if books.is_empty() {
            return Ok(Response::text(render::NOTHING_FOUND));
        }
        Ok(books.iter().take(SEARCH_RESULT_BUTTONS).fold(
            Response::text(render::search_results(&books)),
            |response, book| {
                response.with_button(ChoiceButton::new(
                    format!("📖 {}", book.title),
                    Choice::OpenBook { book_id: book.id },
                ))
            },
        ))
    }

    fn edit_list(&self, turn: &Turn<'_>) -> BotResult<Response> {
        let books = turn.catalog().list_books(Some(PICKER_LIST_LIMIT), 0)?;
        if books.is_empty() {
            return Ok(Response::text(render::NO_BOOKS_IN_CATALOG).with_menu(Menu::Admin));
        }
        Ok(books.iter().fold(
            Response::text("Выберите книгу для редактирования:"),
            |response, book| {
                response.with_button(ChoiceButton::new(
                    format!("✏️ {} ({})", book.title, book.year),
                    Choice::EditBook { book_id: book.id },
                ))
            },
        ))
    }

    fn edit_menu(&self, turn: &Turn<'_>, book_id: BookId) -> BotResult<Response> {
        let Some(book) = turn.catalog().get_book(book_id)? else {
            return Ok(Response::text(render::NOT_FOUND).with_button(back_to_edit_list()));
        };
        let response = EditableField::ALL.into_iter().fold(
            Response::text(format!(
                "✏️ Редактирование книги:\n\n{}",
                render::book_card(&book)
            )),
            |response, field| {
                response.with_button(ChoiceButton::new(
                    render::field_label(field),
                    Choice::EditField { book_id, field },
                ))
            },
        );
        Ok(response
            .with_button(ChoiceButton::new(
                "🗑️ Удалить книгу",
                Choice::DeleteBook { book_id },
            ))
            .with_button(back_to_edit_list()))
    }

    fn confirm_delete(&self, turn: &Turn<'_>, book_id: BookId) -> BotResult<Response> {
        let Some(book) = turn.catalog().get_book(book_id)? else {
            return Ok(Response::text(render::NOT_FOUND).with_button(back_to_edit_list()));
        };
        Ok(Response::text(render::confirm_delete(&book))
            .with_button(ChoiceButton::new(
                "✅ Да, удалить",
                Choice::ConfirmDelete { book_id },
            ))
            .with_button(ChoiceButton::new("❌ Отмена", Choice::EditBook { book_id })))
    }
}

fn dialogue_failure(err: DialogueError) -> BotResult<Response> {
    match err {
        DialogueError::PermissionDenied(denied) => Ok(Response::text(render::denied(denied.action))),
        other => Err(other.into()),
    }
}

fn prompt_response(prompt: &Prompt) -> Response {
    let response = Response::text(render::prompt(prompt));
    match prompt {
        Prompt::Genre => Genre::ALL.into_iter().fold(response, |response, genre| {
            response.with_button(ChoiceButton::new(
                render::genre_label(genre),
                Choice::PickGenre { genre },
            ))
        }),
        Prompt::Subgenre { genre } => genre
            .subgenres()
            .iter()
            .fold(response, |response, subgenre| {
                response.with_button(ChoiceButton::new(
                    render::subgenre_label(subgenre),
                    Choice::PickSubgenre {
                        subgenre: Some((*subgenre).to_string()),
                    },
                ))
            })
            .with_button(ChoiceButton::new(
                render::SKIP_SUBGENRE_LABEL,
                Choice::PickSubgenre { subgenre: None },
            )),
        _ => response,
    }
}

fn genre_menu() -> Response {
    Genre::ALL
        .into_iter()
        .fold(Response::text(render::CHOOSE_GENRE), |response, genre| {
            response.with_button(ChoiceButton::new(
                render::genre_label(genre),
                Choice::ShowGenre { genre, page: 0 },
            ))
        })
}

fn back_to_genres() -> ChoiceButton {
    ChoiceButton::new("🔙 К жанрам", Choice::BackToGenres)
}

fn back_to_profile() -> ChoiceButton {
    ChoiceButton::new("🔙 К профилю", Choice::BackToProfile)
}

fn back_to_edit_list() -> ChoiceButton {
    ChoiceButton::new("🔙 К списку книг", Choice::BackToEditList)
}
