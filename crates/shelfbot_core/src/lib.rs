//! Core domain logic for shelfbot, a conversational book catalog.
//! This crate is the single source of truth for catalog invariants; chat
//! transports only translate [`bot::Inbound`] and [`bot::Response`].

pub mod access;
pub mod bot;
pub mod config;
pub mod db;
pub mod dialogue;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use access::{AccessPolicy, AdminAction, PermissionDenied};
pub use bot::{Bot, BotError};
pub use config::{BotConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, open_from_url, DbError};
pub use dialogue::{DialogueEngine, DialogueError, Prompt, StepOutcome};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::book::{Book, BookFile, BookId, BookValidationError, NewBook};
pub use model::field::{EditableField, FieldUpdate, FieldValueError};
pub use model::genre::Genre;
pub use repo::book_repo::{BookListQuery, BookRepository, SqliteBookRepository};
pub use repo::favorite_repo::{FavoriteRepository, GenreTaste, SqliteFavoriteRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::catalog_service::CatalogService;
pub use service::favorite_service::FavoriteService;
pub use service::recommendation_service::RecommendationService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
