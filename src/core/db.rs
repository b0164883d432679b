//! SQLite storage for OAuth refresh tokens.

use std::fs;
use std::path::Path;

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

const DB_FILE_NAME: &str = "scheduling.sqlite";

pub fn initialize_db(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS auth (
            id TEXT PRIMARY KEY,
            service TEXT NOT NULL,
            refresh_token TEXT NOT NULL
        );",
    )
}

/// Open the database in `db_path`, creating the directory if needed.
pub async fn async_db(db_path: &str) -> Result<tokio_rusqlite::Connection> {
    fs::create_dir_all(db_path)?;
    let path = Path::new(db_path).join(DB_FILE_NAME);
    let db = tokio_rusqlite::Connection::open(path).await?;
    Ok(db)
}

pub async fn upsert_refresh_token(
    db: &tokio_rusqlite::Connection,
    account: &str,
    service: &str,
    refresh_token: &str,
) -> Result<()> {
    let account = account.to_string();
    let service = service.to_string();
    let refresh_token = refresh_token.to_string();
    db.call(move |conn| {
        conn.execute(
            "INSERT INTO auth (id, service, refresh_token) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET service = excluded.service, refresh_token = excluded.refresh_token",
            (&account, &service, &refresh_token),
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}

pub async fn find_refresh_token(
    db: &tokio_rusqlite::Connection,
    account: &str,
) -> Result<Option<String>> {
    let account = account.to_string();
    let token = db
        .call(move |conn| {
            let token = conn
                .query_row(
                    "SELECT refresh_token FROM auth WHERE id = ?1",
                    [&account],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            Ok(token)
        })
        .await?;
    Ok(token)
}

pub async fn list_accounts(db: &tokio_rusqlite::Connection) -> Result<Vec<String>> {
    let accounts = db
        .call(|conn| {
            let mut stmt = conn.prepare("SELECT id FROM auth ORDER BY id")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            let mut accounts = Vec::new();
            for account in rows {
                accounts.push(account?);
            }
            Ok(accounts)
        })
        .await?;
    Ok(accounts)
}
