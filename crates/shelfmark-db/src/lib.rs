//! # shelfmark-db
//!
//! SQLite database layer for shelfmark.
//!
//! This crate provides:
//! - Connection pool management
//! - The book repository implementation
//! - Embedded schema migrations
//!
//! ## Example
//!
//! ```rust,ignore
//! use shelfmark_db::{BookRepository, CreateBookRequest, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite://shelfmark.db").await?;
//!     db.migrate().await?;
//!
//!     let book = db.books.insert(CreateBookRequest {
//!         title: "The Left Hand of Darkness".to_string(),
//!         author: "Ursula K. Le Guin".to_string(),
//!         ..Default::default()
//!     }).await?;
//!
//!     println!("Created book: {}", book.id);
//!     Ok(())
//! }
//! ```

pub mod books;
pub mod pool;

// Shared fixtures, always compiled so integration tests (in tests/) can use them.
pub mod test_fixtures;

// Re-export core types
pub use shelfmark_core::*;

// Re-export repository implementations
pub use books::SqliteBookRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};

/// Escape LIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Combined database context.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Sqlite>,
    /// Book repository for CRUD operations.
    pub books: SqliteBookRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Sqlite>) -> Self {
        Self {
            books: SqliteBookRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Sqlite> {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            books: SqliteBookRepository::new(self.pool.clone()),
        }
    }
}
