//! Admin statistics.

use crate::model::genre::Genre;
use crate::repo::book_repo::BookRepository;
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoResult;

/// Catalog-wide counters shown on the admin statistics view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogStats {
    pub total_books: u64,
    pub total_users: u64,
    /// Book count per genre, in [`Genre::ALL`] order.
    pub books_by_genre: Vec<(Genre, u64)>,
}

/// Collects counters with one `COUNT(*)` per figure.
pub fn collect_stats(
    books: &impl BookRepository,
    users: &impl UserRepository,
) -> RepoResult<CatalogStats> {
    let books_by_genre = Genre::ALL
        .into_iter()
        .map(|genre| books.count_books(Some(genre)).map(|count| (genre, count)))
        .collect::<RepoResult<Vec<_>>>()?;

    Ok(CatalogStats {
        total_books: books.count_books(None)?,
        total_users: users.count_users()?,
        books_by_genre,
    })
}
