//! Book repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/update/delete over the `books` table.
//! - Provide genre listing, genre counts and title/author search.
//!
//! # Invariants
//! - Unfiltered listings are ordered by `id DESC` (most recent first).
//! - Genre listings and search results are ordered by `year DESC, id DESC`.
//! - Deleting a book removes its favorites through `ON DELETE CASCADE`.
//! - Changing a genre keeps the subgenre only when the new genre lists it.

use crate::model::book::{Book, BookFile, BookId, NewBook};
use crate::model::field::FieldUpdate;
use crate::model::genre::Genre;
use crate::repo::favorite_repo::GenreTaste;
use crate::repo::{RepoError, RepoResult};
use log::info;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

/// Maximum number of rows returned by title/author search.
pub const SEARCH_RESULT_LIMIT: u32 = 20;

pub(crate) const BOOK_COLUMNS: &str = "books.id AS id,
    books.title AS title,
    books.author AS author,
    books.year AS year,
    books.description AS description,
    books.genre AS genre,
    books.subgenre AS subgenre,
    books.file_id AS file_id,
    books.file_name AS file_name,
    books.file_size AS file_size,
    books.file_type AS file_type";

/// Query options for listing books.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookListQuery {
    /// Restricts to one genre and switches ordering to `year DESC`.
    pub genre: Option<Genre>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for catalog operations.
pub trait BookRepository {
    fn create_book(&self, book: &NewBook) -> RepoResult<BookId>;
    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>>;
    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<Book>>;
    /// Counts all books, or the books of one genre.
    fn count_books(&self, genre: Option<Genre>) -> RepoResult<u64>;
    /// Case-insensitive substring match on title or author.
    fn search_by_title_or_author(&self, query: &str) -> RepoResult<Vec<Book>>;
    /// Returns `false` when the book does not exist.
    fn update_field(&self, id: BookId, update: &FieldUpdate) -> RepoResult<bool>;
    /// Returns `false` when the book does not exist.
    fn delete_book(&self, id: BookId) -> RepoResult<bool>;
    /// Books matching any taste, minus `exclude`, ordered by `year DESC`.
    fn find_by_tastes(
        &self,
        tastes: &[GenreTaste],
        exclude: &[BookId],
        limit: u32,
    ) -> RepoResult<Vec<Book>>;
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn create_book(&self, book: &NewBook) -> RepoResult<BookId> {
        book.validate()?;

        let file = book.file.as_ref();
        self.conn.execute(
            "INSERT INTO books (
                title,
                author,
                year,
                description,
                genre,
                subgenre,
                file_id,
                file_name,
                file_size,
                file_type
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                book.title.trim(),
                book.author.trim(),
                book.year,
                book.description.as_str(),
                book.genre.as_str(),
                book.subgenre.as_deref().map(str::trim),
                file.map(|value| value.file_id.as_str()),
                file.map(|value| value.file_name.as_str()),
                file.map(|value| value.file_size),
                file.map(|value| value.file_type.as_str()),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!(
            "event=book_create module=repo status=ok book_id={} genre={} has_file={}",
            id,
            book.genre.as_str(),
            book.file.is_some()
        );
        Ok(id)
    }

    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE books.id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_book_row(row)?));
        }
        Ok(None)
    }

    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<Book>> {
        let mut sql = format!("SELECT {BOOK_COLUMNS} FROM books");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(genre) = query.genre {
            sql.push_str(" WHERE books.genre = ? ORDER BY books.year DESC, books.id DESC");
            bind_values.push(Value::Text(genre.as_str().to_string()));
        } else {
            sql.push_str(" ORDER BY books.id DESC");
        }

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query(params_from_iter(bind_values))?;
        collect_books(rows)
    }

    fn count_books(&self, genre: Option<Genre>) -> RepoResult<u64> {
        let count: i64 = match genre {
            Some(genre) => self.conn.query_row(
                "SELECT COUNT(*) FROM books WHERE genre = ?1;",
                [genre.as_str()],
                |row| row.get(0),
            )?,
            None => self
                .conn
                .query_row("SELECT COUNT(*) FROM books;", [], |row| row.get(0))?,
        };
        count_from_db(count)
    }

    fn search_by_title_or_author(&self, query: &str) -> RepoResult<Vec<Book>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BOOK_COLUMNS}
             FROM books
             WHERE instr(casefold(books.title), ?1) > 0
                OR instr(casefold(books.author), ?1) > 0
             ORDER BY books.year DESC, books.id DESC
             LIMIT ?2;"
        ))?;
        let rows = stmt.query(params![needle, SEARCH_RESULT_LIMIT])?;
        collect_books(rows)
    }

    fn update_field(&self, id: BookId, update: &FieldUpdate) -> RepoResult<bool> {
        let value = match update {
            FieldUpdate::Title(value)
            | FieldUpdate::Author(value)
            | FieldUpdate::Description(value) => Value::Text(value.clone()),
            FieldUpdate::Year(year) => Value::Integer(i64::from(*year)),
            FieldUpdate::Genre(genre) => Value::Text(genre.as_str().to_string()),
            FieldUpdate::Subgenre(Some(value)) => Value::Text(value.clone()),
            FieldUpdate::Subgenre(None) => Value::Null,
        };
        // Column name comes from the closed `EditableField` set.
        let column = update.field().as_str();

        let changed = match update {
            // A subgenre outside the new genre's vocabulary is cleared.
            FieldUpdate::Genre(genre) => {
                let vocabulary = genre.subgenres();
                let placeholders = (3..vocabulary.len() + 3)
                    .map(|index| format!("?{index}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut bind_values = vec![value, Value::Integer(id)];
                bind_values.extend(vocabulary.iter().map(|name| Value::Text((*name).to_string())));
                self.conn.execute(
                    &format!(
                        "UPDATE books
                         SET genre = ?1,
                             subgenre = CASE WHEN subgenre IN ({placeholders}) THEN subgenre END
                         WHERE id = ?2;"
                    ),
                    params_from_iter(bind_values),
                )?
            }
            _ => self.conn.execute(
                &format!("UPDATE books SET {column} = ?1 WHERE id = ?2;"),
                params![value, id],
            )?,
        };

        if changed == 0 {
            return Ok(false);
        }
        info!("event=book_update module=repo status=ok book_id={id} field={column}");
        Ok(true)
    }

    fn delete_book(&self, id: BookId) -> RepoResult<bool> {
        let changed = self.conn.execute("DELETE FROM books WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Ok(false);
        }
        info!("event=book_delete module=repo status=ok book_id={id}");
        Ok(true)
    }

    fn find_by_tastes(
        &self,
        tastes: &[GenreTaste],
        exclude: &[BookId],
        limit: u32,
    ) -> RepoResult<Vec<Book>> {
        if tastes.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut conditions = Vec::with_capacity(tastes.len());
        let mut bind_values: Vec<Value> = Vec::new();
        for taste in tastes {
            bind_values.push(Value::Text(taste.genre.as_str().to_string()));
            match taste.subgenre.as_ref() {
                Some(subgenre) => {
                    conditions.push("(books.genre = ? AND books.subgenre = ?)");
                    bind_values.push(Value::Text(subgenre.clone()));
                }
                None => conditions.push("(books.genre = ?)"),
            }
        }

        let mut sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE ({})",
            conditions.join(" OR ")
        );
        // `NOT IN ()` is not valid SQL, so the exclusion is only emitted
        // for a non-empty id list.
        if !exclude.is_empty() {
            let placeholders = vec!["?"; exclude.len()].join(", ");
            sql.push_str(&format!(" AND books.id NOT IN ({placeholders})"));
            bind_values.extend(exclude.iter().map(|id| Value::Integer(*id)));
        }
        sql.push_str(" ORDER BY books.year DESC, books.id DESC LIMIT ?");
        bind_values.push(Value::Integer(i64::from(limit)));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query(params_from_iter(bind_values))?;
        collect_books(rows)
    }
}

pub(crate) fn collect_books(mut rows: rusqlite::Rows<'_>) -> RepoResult<Vec<Book>> {
    let mut books = Vec::new();
    while let Some(row) = rows.next()? {
        books.push(parse_book_row(row)?);
    }
    Ok(books)
}

pub(crate) fn parse_book_row(row: &Row<'_>) -> RepoResult<Book> {
    let genre_text: String = row.get("genre")?;
    let genre = Genre::from_name(&genre_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid genre `{genre_text}` in books.genre"))
    })?;

    let file = match row.get::<_, Option<String>>("file_id")? {
        Some(file_id) => Some(BookFile {
            file_id,
            file_name: row.get::<_, Option<String>>("file_name")?.unwrap_or_default(),
            file_size: row.get::<_, Option<i64>>("file_size")?.unwrap_or_default(),
            file_type: row.get::<_, Option<String>>("file_type")?.unwrap_or_default(),
        }),
        None => None,
    };

    Ok(Book {
        id: row.get("id")?,
        title: row.get("title")?,
        author: row.get("author")?,
        year: row.get("year")?,
        description: row.get("description")?,
        genre,
        subgenre: row.get("subgenre")?,
        file,
    })
}

pub(crate) fn count_from_db(value: i64) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative row count `{value}`")))
}
