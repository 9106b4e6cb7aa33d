//! Favorites use-case service.
//!
//! Toggling is a check-then-write pair of single statements; each statement
//! is atomic on its own and the unique pair constraint keeps a racing
//! duplicate add harmless.

use crate::model::book::{Book, BookId};
use crate::model::user::ExternalUserId;
use crate::repo::favorite_repo::FavoriteRepository;
use crate::repo::RepoResult;

/// Result of a favorite toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// Nothing changed: unknown user/book or a concurrent change won.
    Unchanged,
}

/// Favorites service facade over repository implementations.
pub struct FavoriteService<R: FavoriteRepository> {
    repo: R,
}

impl<R: FavoriteRepository> FavoriteService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn add(&self, user: ExternalUserId, book_id: BookId) -> RepoResult<bool> {
        self.repo.add_favorite(user, book_id)
    }

    pub fn remove(&self, user: ExternalUserId, book_id: BookId) -> RepoResult<bool> {
        self.repo.remove_favorite(user, book_id)
    }

    pub fn is_favorite(&self, user: ExternalUserId, book_id: BookId) -> RepoResult<bool> {
        self.repo.is_favorite(user, book_id)
    }

    pub fn list(&self, user: ExternalUserId) -> RepoResult<Vec<Book>> {
        self.repo.list_favorites(user)
    }

    pub fn count(&self, user: ExternalUserId) -> RepoResult<u64> {
        self.repo.count_favorites(user)
    }

    /// Adds the book when absent from favorites, removes it otherwise.
    pub fn toggle(&self, user: ExternalUserId, book_id: BookId) -> RepoResult<ToggleOutcome> {
        let changed = if self.repo.is_favorite(user, book_id)? {
            self.repo
                .remove_favorite(user, book_id)?
                .then_some(ToggleOutcome::Removed)
        } else {
            self.repo
                .add_favorite(user, book_id)?
                .then_some(ToggleOutcome::Added)
        };
        Ok(changed.unwrap_or(ToggleOutcome::Unchanged))
    }
}
