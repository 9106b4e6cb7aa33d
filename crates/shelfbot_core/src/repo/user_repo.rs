//! User registry contracts and SQLite implementation.
//!
//! # Invariants
//! - `external_id` is unique; upsert never creates a second row for it.
//! - Users are never deleted by the core.

use crate::model::user::{ExternalUserId, User};
use crate::repo::book_repo::count_from_db;
use crate::repo::{RepoError, RepoResult};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for user identities.
pub trait UserRepository {
    /// Creates the user when absent, refreshes the handle when changed.
    fn upsert_user(&self, external_id: ExternalUserId, handle: Option<&str>) -> RepoResult<User>;
    fn get_user(&self, external_id: ExternalUserId) -> RepoResult<Option<User>>;
    fn count_users(&self) -> RepoResult<u64>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn upsert_user(&self, external_id: ExternalUserId, handle: Option<&str>) -> RepoResult<User> {
        let changed = self.conn.execute(
            "INSERT INTO users (external_id, handle)
             VALUES (?1, ?2)
             ON CONFLICT (external_id) DO UPDATE
             SET handle = excluded.handle
             WHERE users.handle IS NOT excluded.handle;",
            params![external_id, handle],
        )?;
        if changed > 0 {
            debug!("event=user_upsert module=repo status=ok user={external_id}");
        }

        self.get_user(external_id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("user {external_id} missing after upsert"))
        })
    }

    fn get_user(&self, external_id: ExternalUserId) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, external_id, handle FROM users WHERE external_id = ?1;",
                [external_id],
                |row| {
                    Ok(User {
                        id: row.get("id")?,
                        external_id: row.get("external_id")?,
                        handle: row.get("handle")?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    fn count_users(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))?;
        count_from_db(count)
    }
}
