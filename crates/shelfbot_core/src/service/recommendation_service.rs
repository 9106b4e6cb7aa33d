//! Content-based recommendations.
//!
//! # Responsibility
//! - Suggest catalog books sharing a genre/subgenre with the user's
//!   favorites.
//!
//! # Invariants
//! - Never returns a book the user already favorited.
//! - Returns nothing when the user has no favorites.
//! - At most [`RECOMMENDATION_LIMIT`] books, newest publication year first.

use crate::model::book::Book;
use crate::model::user::ExternalUserId;
use crate::repo::book_repo::BookRepository;
use crate::repo::favorite_repo::FavoriteRepository;
use crate::repo::RepoResult;
use log::{debug, warn};

/// Maximum number of recommended books.
pub const RECOMMENDATION_LIMIT: u32 = 5;

/// Recommendation use-case over book and favorite repositories.
pub struct RecommendationService<B: BookRepository, F: FavoriteRepository> {
    books: B,
    favorites: F,
}

impl<B: BookRepository, F: FavoriteRepository> RecommendationService<B, F> {
    pub fn new(books: B, favorites: F) -> Self {
        Self { books, favorites }
    }

    /// Recommends books for `user`.
    ///
    /// A favorite with a subgenre matches on (genre, subgenre); one without
    /// matches on genre alone. Matches are OR-combined.
    pub fn recommend(&self, user: ExternalUserId) -> RepoResult<Vec<Book>> {
        let tastes = self.favorites.favorite_tastes(user)?;
        if tastes.is_empty() {
            return Ok(Vec::new());
        }

        let exclude = self.favorites.favorite_book_ids(user)?;
        if exclude.is_empty() {
            // Tastes come from favorited books, so this only happens when a
            // favorite disappeared between the two reads.
            warn!("event=recommend module=service status=degraded user={user} reason=empty_exclusion");
        }

        let books = self
            .books
            .find_by_tastes(&tastes, &exclude, RECOMMENDATION_LIMIT)?;
        debug!(
            "event=recommend module=service status=ok user={} tastes={} results={}",
            user,
            tastes.len(),
            books.len()
        );
        Ok(books)
    }
}
