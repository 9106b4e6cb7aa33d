use rusqlite::Connection;
use shelfbot_core::db::migrations::latest_version;
use shelfbot_core::db::{open_db, open_db_in_memory, open_from_url, DbError};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "users");
    assert_table_exists(&conn, "books");
    assert_table_exists(&conn, "favorites");
    for column in ["file_id", "file_name", "file_size", "file_type"] {
        assert_column_exists(&conn, "books", column);
    }
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shelfbot.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "books");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn open_from_url_accepts_async_driver_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bot_database.db");
    let url = format!("sqlite+aiosqlite:///{}", path.display());

    let conn = open_from_url(&url).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert!(path.exists());

    assert!(matches!(
        open_from_url("postgres://localhost/books"),
        Err(DbError::UnsupportedUrl(_))
    ));
}

#[test]
fn foreign_keys_and_casefold_are_enabled() {
    let conn = open_db_in_memory().unwrap();

    let foreign_keys: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 1);

    let folded: String = conn
        .query_row("SELECT casefold('ДЮНА Dune');", [], |row| row.get(0))
        .unwrap();
    assert_eq!(folded, "дюна dune");
}

#[test]
fn blank_title_is_rejected_by_schema() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO books (title, author, year, description, genre)
         VALUES ('  ', 'Author', 2000, '', 'Литература');",
        [],
    );
    assert!(result.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table `{table_name}` should exist");
}

fn assert_column_exists(conn: &Connection, table_name: &str, column_name: &str) {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table_name});"))
        .unwrap();
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert!(
        columns.iter().any(|column| column == column_name),
        "column `{table_name}.{column_name}` should exist"
    );
}
