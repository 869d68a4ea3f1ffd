use crate::config::Config;
use crate::error::StoreError;
use crate::model::{Book, BookInput};
use libsql::{Builder, Connection, Database as LibsqlDatabase};
use std::path::Path;
use std::time::Duration;

const SCHEMA: &str = include_str!("migrations/001_books.sql");

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub type Result<T> = std::result::Result<T, StoreError>;

/// Handle to the book store. Connections are acquired per operation and dropped
/// when the operation returns, on success and failure alike.
pub struct Database {
    db: LibsqlDatabase,
    local: bool,
}

impl Database {
    /// Opens the configured store and makes sure the `books` table exists before
    /// returning, so callers can start serving only once the schema is ready.
    pub async fn new(cfg: &Config, data_dir: &Path) -> Result<Self> {
        let database = match (&cfg.app.remote_url, &cfg.app.auth_token) {
            (Some(url), Some(token)) => {
                tracing::info!(url = %url, "[db] connecting to remote store");
                let db = Builder::new_remote(url.clone(), token.clone()).build().await?;
                Database { db, local: false }
            }
            _ => {
                let path = cfg.database_path(data_dir);
                tracing::info!(path = ?path, "[db] opening local store");
                let db = Builder::new_local(&path).build().await?;
                Database { db, local: true }
            }
        };

        database.ensure_schema().await?;
        Ok(database)
    }

    pub async fn open_local(path: &Path) -> Result<Self> {
        let db = Builder::new_local(path).build().await?;
        let database = Database { db, local: true };
        database.ensure_schema().await?;
        Ok(database)
    }

    pub fn connect(&self) -> Result<Connection> {
        let conn = self.db.connect()?;
        if self.local {
            conn.busy_timeout(BUSY_TIMEOUT)?;
        }
        Ok(conn)
    }

    async fn ensure_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.query("SELECT 1", ()).await?;
        conn.execute_batch(SCHEMA).await?;
        tracing::info!("[db] books table created/verified");
        Ok(())
    }

    fn row_to_book(row: &libsql::Row) -> Result<Book> {
        Ok(Book {
            id: row.get(0)?,
            title: row.get(1)?,
            author: row.get(2)?,
            year: row.get::<Option<i64>>(3)?,
        })
    }

    pub async fn list_books(&self) -> Result<Vec<Book>> {
        let conn = self.connect()?;
        let mut rows = conn
            .query("SELECT id, title, author, year FROM books ORDER BY id DESC", ())
            .await?;

        let mut books = Vec::new();
        while let Some(row) = rows.next().await? {
            books.push(Self::row_to_book(&row)?);
        }
        Ok(books)
    }

    pub async fn create_book(&self, input: BookInput) -> Result<Book> {
        let query = r#"
            INSERT INTO books (title, author, year)
            VALUES (?, ?, ?)
            RETURNING id, title, author, year
        "#;

        let conn = self.connect()?;
        let mut rows = conn
            .query(query, libsql::params![input.title, input.author, input.year])
            .await?;

        match rows.next().await? {
            Some(row) => Self::row_to_book(&row),
            None => Err(StoreError::MissingRow("insert")),
        }
    }

    /// Overwrites all three fields. Returns `None` when no row has `id`.
    pub async fn update_book(&self, id: i64, input: BookInput) -> Result<Option<Book>> {
        let query = r#"
            UPDATE books SET title = ?, author = ?, year = ?
            WHERE id = ?
            RETURNING id, title, author, year
        "#;

        let conn = self.connect()?;
        let mut rows = conn
            .query(query, libsql::params![input.title, input.author, input.year, id])
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::row_to_book(&row)?)),
            None => Ok(None),
        }
    }

    /// Returns the number of rows removed; zero is not an error.
    pub async fn delete_book(&self, id: i64) -> Result<u64> {
        let conn = self.connect()?;
        let removed = conn
            .execute("DELETE FROM books WHERE id = ?", libsql::params![id])
            .await?;
        Ok(removed)
    }
}
