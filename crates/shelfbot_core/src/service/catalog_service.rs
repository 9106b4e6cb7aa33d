//! Catalog use-case service.
//!
//! # Responsibility
//! - Provide book CRUD entry points for dialogue and browsing callers.
//! - Compute genre pagination windows.
//!
//! # Invariants
//! - Genre pages hold at most [`GENRE_PAGE_SIZE`] books.
//! - A next page exists exactly when `(page + 1) * GENRE_PAGE_SIZE < total`.
//! - Requested pages past the last one resolve to the last page.

use crate::model::book::{Book, BookId, NewBook};
use crate::model::field::FieldUpdate;
use crate::model::genre::Genre;
use crate::repo::book_repo::{BookListQuery, BookRepository};
use crate::repo::RepoResult;

/// Books per genre page.
pub const GENRE_PAGE_SIZE: u32 = 5;
/// Books offered by edit and favorite pickers.
pub const PICKER_LIST_LIMIT: u32 = 10;

/// One page of a genre listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenrePage {
    pub genre: Genre,
    /// Zero-based page index.
    pub page: u32,
    /// Books on this page, `year DESC`.
    pub items: Vec<Book>,
    /// Books in the genre across all pages.
    pub total_count: u64,
}

impl GenrePage {
    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self) -> bool {
        (u64::from(self.page) + 1) * u64::from(GENRE_PAGE_SIZE) < self.total_count
    }
}

/// Use-case service wrapper for catalog operations.
pub struct CatalogService<R: BookRepository> {
    repo: R,
}

impl<R: BookRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Persists a new book; validation errors come back unchanged.
    pub fn create_book(&self, book: &NewBook) -> RepoResult<BookId> {
        self.repo.create_book(book)
    }

    pub fn get_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        self.repo.get_book(id)
    }

    /// Lists books, most recent first.
    pub fn list_books(&self, limit: Option<u32>, offset: u32) -> RepoResult<Vec<Book>> {
        self.repo.list_books(&BookListQuery {
            genre: None,
            limit,
            offset,
        })
    }

    /// Lists one genre, newest publication year first.
    pub fn list_books_by_genre(
        &self,
        genre: Genre,
        limit: u32,
        offset: u32,
    ) -> RepoResult<Vec<Book>> {
        self.repo.list_books(&BookListQuery {
            genre: Some(genre),
            limit: Some(limit),
            offset,
        })
    }

    pub fn count_by_genre(&self, genre: Genre) -> RepoResult<u64> {
        self.repo.count_books(Some(genre))
    }

    /// Loads page `page` of a genre listing, clamped to the last page.
    pub fn genre_page(&self, genre: Genre, page: u32) -> RepoResult<GenrePage> {
        let total_count = self.count_by_genre(genre)?;
        let page = page.min(last_page(total_count));
        let offset = page.saturating_mul(GENRE_PAGE_SIZE);
        let items = self.list_books_by_genre(genre, GENRE_PAGE_SIZE, offset)?;
        Ok(GenrePage {
            genre,
            page,
            items,
            total_count,
        })
    }

    /// Title/author search; blank queries return nothing.
    pub fn search(&self, query: &str) -> RepoResult<Vec<Book>> {
        self.repo.search_by_title_or_author(query)
    }

    pub fn update_field(&self, id: BookId, update: &FieldUpdate) -> RepoResult<bool> {
        self.repo.update_field(id, update)
    }

    pub fn delete_book(&self, id: BookId) -> RepoResult<bool> {
        self.repo.delete_book(id)
    }
}

fn last_page(total_count: u64) -> u32 {
    let last = total_count.saturating_sub(1) / u64::from(GENRE_PAGE_SIZE);
    u32::try_from(last).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{last_page, GenrePage};
    use crate::model::genre::Genre;

    fn page(page: u32, total_count: u64) -> GenrePage {
        GenrePage {
            genre: Genre::Literature,
            page,
            items: Vec::new(),
            total_count,
        }
    }

    #[test]
    fn next_is_absent_exactly_at_the_last_page() {
        assert!(page(0, 12).has_next());
        assert!(page(1, 12).has_next());
        assert!(!page(2, 12).has_next());
        assert!(!page(0, 5).has_next());
        assert!(page(0, 6).has_next());
        assert!(!page(0, 0).has_next());
    }

    #[test]
    fn previous_exists_after_first_page() {
        assert!(!page(0, 12).has_previous());
        assert!(page(2, 12).has_previous());
    }

    #[test]
    fn last_page_index_follows_total() {
        assert_eq!(last_page(0), 0);
        assert_eq!(last_page(5), 0);
        assert_eq!(last_page(6), 1);
        assert_eq!(last_page(12), 2);
    }
}
