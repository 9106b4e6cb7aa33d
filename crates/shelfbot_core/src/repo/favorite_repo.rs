//! Favorites repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own the user/book many-to-many relation in `favorites`.
//! - Expose the favorite-derived genre taste used for recommendations.
//!
//! # Invariants
//! - Writes only touch the `favorites` table.
//! - `(user_id, book_id)` is unique; a repeated add is a no-op.
//! - Users are addressed by external id; unknown users own no favorites.

use crate::model::book::{Book, BookId};
use crate::model::genre::Genre;
use crate::model::user::ExternalUserId;
use crate::repo::book_repo::{collect_books, count_from_db, BOOK_COLUMNS};
use crate::repo::{RepoError, RepoResult};
use log::info;
use rusqlite::{params, Connection};

/// One distinct (genre, subgenre) pair among a user's favorites.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GenreTaste {
    pub genre: Genre,
    pub subgenre: Option<String>,
}

/// Repository interface for favorite links.
pub trait FavoriteRepository {
    /// Returns `false` when already present, or when user/book is unknown.
    fn add_favorite(&self, user: ExternalUserId, book_id: BookId) -> RepoResult<bool>;
    /// Returns `false` when the pair (or the user) does not exist.
    fn remove_favorite(&self, user: ExternalUserId, book_id: BookId) -> RepoResult<bool>;
    fn is_favorite(&self, user: ExternalUserId, book_id: BookId) -> RepoResult<bool>;
    /// Favorited books ordered by title.
    fn list_favorites(&self, user: ExternalUserId) -> RepoResult<Vec<Book>>;
    fn count_favorites(&self, user: ExternalUserId) -> RepoResult<u64>;
    fn favorite_book_ids(&self, user: ExternalUserId) -> RepoResult<Vec<BookId>>;
    /// Distinct (genre, subgenre) pairs across the user's favorites.
    fn favorite_tastes(&self, user: ExternalUserId) -> RepoResult<Vec<GenreTaste>>;
}

/// SQLite-backed favorites repository.
pub struct SqliteFavoriteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFavoriteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl FavoriteRepository for SqliteFavoriteRepository<'_> {
    fn add_favorite(&self, user: ExternalUserId, book_id: BookId) -> RepoResult<bool> {
        // The SELECT yields no row for an unknown user or book, and the
        // unique constraint turns a repeated pair into an ignored insert.
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO favorites (user_id, book_id)
             SELECT users.id, books.id
             FROM users
             INNER JOIN books ON books.id = ?2
             WHERE users.external_id = ?1;",
            params![user, book_id],
        )?;

        let added = changed == 1;
        if added {
            info!("event=favorite_add module=repo status=ok user={user} book_id={book_id}");
        }
        Ok(added)
    }

    fn remove_favorite(&self, user: ExternalUserId, book_id: BookId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM favorites
             WHERE book_id = ?2
               AND user_id = (SELECT id FROM users WHERE external_id = ?1);",
            params![user, book_id],
        )?;

        let removed = changed > 0;
        if removed {
            info!("event=favorite_remove module=repo status=ok user={user} book_id={book_id}");
        }
        Ok(removed)
    }

    fn is_favorite(&self, user: ExternalUserId, book_id: BookId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM favorites
                INNER JOIN users ON users.id = favorites.user_id
                WHERE users.external_id = ?1
                  AND favorites.book_id = ?2
            );",
            params![user, book_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn list_favorites(&self, user: ExternalUserId) -> RepoResult<Vec<Book>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BOOK_COLUMNS}
             FROM books
             INNER JOIN favorites ON favorites.book_id = books.id
             INNER JOIN users ON users.id = favorites.user_id
             WHERE users.external_id = ?1
             ORDER BY casefold(books.title) ASC, books.id ASC;"
        ))?;
        let rows = stmt.query([user])?;
        collect_books(rows)
    }

    fn count_favorites(&self, user: ExternalUserId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM favorites
             INNER JOIN users ON users.id = favorites.user_id
             WHERE users.external_id = ?1;",
            [user],
            |row| row.get(0),
        )?;
        count_from_db(count)
    }

    fn favorite_book_ids(&self, user: ExternalUserId) -> RepoResult<Vec<BookId>> {
        let mut stmt = self.conn.prepare(
            "SELECT favorites.book_id
             FROM favorites
             INNER JOIN users ON users.id = favorites.user_id
             WHERE users.external_id = ?1
             ORDER BY favorites.book_id ASC;",
        )?;
        let mut rows = stmt.query([user])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row.get(0)?);
        }
        Ok(ids)
    }

    fn favorite_tastes(&self, user: ExternalUserId) -> RepoResult<Vec<GenreTaste>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT books.genre, books.subgenre
             FROM books
             INNER JOIN favorites ON favorites.book_id = books.id
             INNER JOIN users ON users.id = favorites.user_id
             WHERE users.external_id = ?1
             ORDER BY books.genre ASC, books.subgenre ASC;",
        )?;
        let mut rows = stmt.query([user])?;
        let mut tastes = Vec::new();
        while let Some(row) = rows.next()? {
            let genre_text: String = row.get(0)?;
            let genre = Genre::from_name(&genre_text).ok_or_else(|| {
                RepoError::InvalidData(format!("invalid genre `{genre_text}` in books.genre"))
            })?;
            tastes.push(GenreTaste {
                genre,
                subgenre: row.get(1)?,
            });
        }
        Ok(tastes)
    }
}
