//! Catalog storage: connection setup and schema upgrades.
//!
//! Callers obtain connections only through [`open_db`], [`open_db_in_memory`]
//! or [`open_from_url`]; each of them returns a connection whose schema is
//! at [`migrations::latest_version`] and whose `casefold(text)` SQL function
//! is registered.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, open_from_url, DatabaseLocation};
pub use rusqlite::Connection;

pub type DbResult<T> = Result<T, DbError>;

/// Failure to bring a catalog database into a usable state.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer shelfbot build.
    SchemaTooNew { found: u32, supported: u32 },
    /// Connection string is not a SQLite location.
    UnsupportedUrl(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "catalog schema v{found} is newer than this build (up to v{supported})"
            ),
            Self::UnsupportedUrl(url) => write!(f, "unsupported database url `{url}`"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
