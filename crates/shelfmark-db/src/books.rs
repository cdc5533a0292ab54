//! Book repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

use shelfmark_core::{
    genres, Book, BookRepository, BookStatus, CreateBookRequest, Error, ListBooksRequest,
    ListBooksResponse, Result, UpdateBookRequest,
};

use crate::escape_like;

/// Column list shared by every SELECT so row mapping stays positional-free.
const BOOK_COLUMNS: &str = "id, title, author, status, rating, notes, image_url, pages, \
     current_page, description, published_date, isbn, genres, started_date, completed_date, \
     created_at, updated_at, created_by, updated_by";

/// SQLite implementation of BookRepository.
pub struct SqliteBookRepository {
    pool: Pool<Sqlite>,
}

impl SqliteBookRepository {
    /// Create a new SqliteBookRepository with the given connection pool.
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

// =============================================================================
// HELPER FUNCTIONS FOR LIST QUERY BUILDING
// =============================================================================

/// WHERE clauses and their bind values for a listing request, in order.
struct ListFilters {
    clauses: Vec<&'static str>,
    binds: Vec<String>,
}

impl ListFilters {
    /// Render the WHERE clause, empty when no filter is active.
    fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }
}

/// Translate the optional listing filters into SQL fragments.
///
/// Filters compose conjunctively. The search term is wrapped in `%` after
/// escaping LIKE wildcards so user input never acts as a pattern. The genre
/// filter matches one exact label inside the JSON array column; rows whose
/// genres column is missing or malformed never match.
fn build_list_filters(req: &ListBooksRequest) -> ListFilters {
    let mut clauses = Vec::new();
    let mut binds = Vec::new();

    if let Some(search) = &req.search {
        clauses.push("title LIKE ? ESCAPE '\\'");
        binds.push(format!("%{}%", escape_like(search)));
    }
    if let Some(status) = req.status {
        clauses.push("status = ?");
        binds.push(status.to_string());
    }
    if let Some(genre) = &req.genre {
        clauses.push(
            "(genres IS NOT NULL AND json_valid(genres) AND EXISTS \
             (SELECT 1 FROM json_each(books.genres) WHERE json_each.value = ?))",
        );
        binds.push(genre.clone());
    }

    ListFilters { clauses, binds }
}

/// Map a database row to a Book.
///
/// An unrecognized status value is a data error and is reported as such;
/// a malformed genres payload degrades to an empty list.
fn map_row_to_book(row: SqliteRow) -> Result<Book> {
    let status_raw: String = row.get("status");
    let status = status_raw
        .parse::<BookStatus>()
        .map_err(Error::Serialization)?;

    let genres_raw: Option<String> = row.get("genres");

    Ok(Book {
        id: row.get("id"),
        title: row.get("title"),
        author: row.get("author"),
        status,
        rating: row.get("rating"),
        notes: row.get("notes"),
        image_url: row.get("image_url"),
        pages: row.get("pages"),
        current_page: row.get("current_page"),
        description: row.get("description"),
        published_date: row.get("published_date"),
        isbn: row.get("isbn"),
        genres: genres::decode(genres_raw.as_deref()),
        started_date: row.get("started_date"),
        completed_date: row.get("completed_date"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        created_by: row.get("created_by"),
        updated_by: row.get("updated_by"),
    })
}

#[async_trait]
impl BookRepository for SqliteBookRepository {
    async fn insert(&self, req: CreateBookRequest) -> Result<Book> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO books (title, author, status, rating, notes, image_url, pages, \
             current_page, description, published_date, isbn, genres, started_date, \
             completed_date, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&req.title)
        .bind(&req.author)
        .bind(req.status.to_string())
        .bind(req.rating.unwrap_or(0))
        .bind(&req.notes)
        .bind(&req.image_url)
        .bind(req.pages)
        .bind(req.current_page)
        .bind(&req.description)
        .bind(&req.published_date)
        .bind(&req.isbn)
        .bind(genres::encode(&req.genres))
        .bind(&req.started_date)
        .bind(&req.completed_date)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        let id = result.last_insert_rowid();
        tracing::debug!(
            subsystem = "database",
            component = "books",
            op = "insert",
            book_id = id,
            "Book inserted"
        );
        self.fetch(id).await
    }

    async fn fetch(&self, id: i64) -> Result<Book> {
        let query = format!("SELECT {} FROM books WHERE id = ?", BOOK_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        match row {
            Some(row) => map_row_to_book(row),
            None => Err(Error::BookNotFound(id)),
        }
    }

    async fn list(&self, req: ListBooksRequest) -> Result<ListBooksResponse> {
        let filters = build_list_filters(&req);
        let where_sql = filters.where_sql();

        let count_query = format!("SELECT COUNT(*) FROM books{}", where_sql);
        let mut count = sqlx::query_scalar::<_, i64>(&count_query);
        for bind in &filters.binds {
            count = count.bind(bind);
        }
        let total_books = count.fetch_one(&self.pool).await.map_err(Error::Database)?;

        let page_query = format!(
            "SELECT {} FROM books{} ORDER BY id LIMIT ? OFFSET ?",
            BOOK_COLUMNS, where_sql
        );
        let mut page = sqlx::query(&page_query);
        for bind in &filters.binds {
            page = page.bind(bind);
        }
        let rows = page
            .bind(req.limit)
            .bind(req.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let books = rows
            .into_iter()
            .map(map_row_to_book)
            .collect::<Result<Vec<_>>>()?;

        // Ceiling division; the count covers the filtered set, not the page.
        let total_pages = if req.limit > 0 {
            (total_books + req.limit - 1) / req.limit
        } else {
            0
        };

        tracing::debug!(
            subsystem = "database",
            component = "books",
            op = "list",
            page = req.page,
            limit = req.limit,
            result_count = books.len(),
            total_books,
            "Books listed"
        );

        Ok(ListBooksResponse {
            books,
            total_books,
            total_pages,
            current_page: req.page,
        })
    }

    async fn update(&self, id: i64, req: UpdateBookRequest) -> Result<Book> {
        if !self.exists(id).await? {
            return Err(Error::BookNotFound(id));
        }

        // Placeholders are positional, so the SET list and the bind chain
        // below must stay in the same order.
        let mut updates: Vec<&'static str> = vec!["updated_at = ?"];
        if req.title.is_some() {
            updates.push("title = ?");
        }
        if req.author.is_some() {
            updates.push("author = ?");
        }
        if req.status.is_some() {
            updates.push("status = ?");
        }
        if req.rating.is_some() {
            updates.push("rating = ?");
        }
        if req.notes.is_some() {
            updates.push("notes = ?");
        }
        if req.image_url.is_some() {
            updates.push("image_url = ?");
        }
        if req.pages.is_some() {
            updates.push("pages = ?");
        }
        if req.current_page.is_some() {
            updates.push("current_page = ?");
        }
        if req.description.is_some() {
            updates.push("description = ?");
        }
        if req.published_date.is_some() {
            updates.push("published_date = ?");
        }
        if req.isbn.is_some() {
            updates.push("isbn = ?");
        }
        if req.genres.is_some() {
            updates.push("genres = ?");
        }
        if req.started_date.is_some() {
            updates.push("started_date = ?");
        }
        if req.completed_date.is_some() {
            updates.push("completed_date = ?");
        }

        let query = format!("UPDATE books SET {} WHERE id = ?", updates.join(", "));

        let mut q = sqlx::query(&query).bind(Utc::now());
        if let Some(title) = &req.title {
            q = q.bind(title);
        }
        if let Some(author) = &req.author {
            q = q.bind(author);
        }
        if let Some(status) = req.status {
            q = q.bind(status.to_string());
        }
        if let Some(rating) = req.rating {
            q = q.bind(rating);
        }
        if let Some(notes) = &req.notes {
            q = q.bind(notes);
        }
        if let Some(image_url) = &req.image_url {
            q = q.bind(image_url);
        }
        if let Some(pages) = req.pages {
            q = q.bind(pages);
        }
        if let Some(current_page) = req.current_page {
            q = q.bind(current_page);
        }
        if let Some(description) = &req.description {
            q = q.bind(description);
        }
        if let Some(published_date) = &req.published_date {
            q = q.bind(published_date);
        }
        if let Some(isbn) = &req.isbn {
            q = q.bind(isbn);
        }
        if let Some(genres) = &req.genres {
            q = q.bind(genres::encode(genres));
        }
        if let Some(started_date) = &req.started_date {
            q = q.bind(started_date);
        }
        if let Some(completed_date) = &req.completed_date {
            q = q.bind(completed_date);
        }

        q.bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        tracing::debug!(
            subsystem = "database",
            component = "books",
            op = "update",
            book_id = id,
            "Book updated"
        );
        self.fetch(id).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::BookNotFound(id));
        }

        tracing::debug!(
            subsystem = "database",
            component = "books",
            op = "delete",
            book_id = id,
            "Book deleted"
        );
        Ok(())
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(exists)
    }

    async fn all(&self) -> Result<Vec<Book>> {
        let query = format!("SELECT {} FROM books ORDER BY id", BOOK_COLUMNS);
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        rows.into_iter().map(map_row_to_book).collect()
    }
}
