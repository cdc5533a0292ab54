//! shelfmark-api - HTTP API server for shelfmark
//!
//! Serves the book collection over REST: CRUD plus listing with
//! search/filter/pagination, an aggregated statistics endpoint, a health
//! check, and the OpenAPI document.

mod query_types;

use std::net::SocketAddr;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use uuid::Uuid;

use query_types::ListBooksQuery;
use shelfmark_core::{
    compute_statistics, Book, BookRepository, BookStatus, BooksByStatus, CreateBookBody,
    GenreCount, GenresInput, ListBooksResponse, MonthlyTrendPoint, ReadingStatistics,
    UpdateBookBody, ValidationIssue,
};
use shelfmark_db::Database;

// =============================================================================
// REQUEST ID GENERATION
// =============================================================================

/// Generates UUIDv7 request IDs. Time-ordered, so IDs sort chronologically
/// when correlating logs across requests.
#[derive(Clone, Copy)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// Shared state handed to every handler.
#[derive(Clone)]
struct AppState {
    db: Database,
}

/// OpenAPI document metadata, served as JSON at `/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shelfmark API",
        version = "2026.8.1",
        description = "Personal book tracker with reading statistics"
    ),
    tags(
        (name = "Books", description = "Book CRUD and listing operations"),
        (name = "Statistics", description = "Aggregated reading statistics"),
        (name = "System", description = "Health checks and system info")
    ),
    components(schemas(
        Book,
        BookStatus,
        CreateBookBody,
        UpdateBookBody,
        GenresInput,
        ValidationIssue,
        ListBooksResponse,
        ReadingStatistics,
        BooksByStatus,
        GenreCount,
        MonthlyTrendPoint
    ))
)]
struct ApiDoc;

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// =============================================================================
// HEALTH CHECK
// =============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// =============================================================================
// BOOK HANDLERS
// =============================================================================

/// GET /api/books - list books with pagination, search, and filters.
async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<ListBooksQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let request = query.into_request();
    let response = state.db.books.list(request).await?;
    Ok(Json(response))
}

/// POST /api/books - add a book to the collection.
async fn create_book(
    State(state): State<AppState>,
    Json(body): Json<CreateBookBody>,
) -> Result<impl IntoResponse, ApiError> {
    let request = body.validate().map_err(ApiError::Validation)?;
    let book = state.db.books.insert(request).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// GET /api/books/:id - fetch a single book.
async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let book = state.db.books.fetch(id).await?;
    Ok(Json(book))
}

/// PUT /api/books/:id - partially update a book.
///
/// Absent fields keep their stored values; only supplied fields change.
async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateBookBody>,
) -> Result<impl IntoResponse, ApiError> {
    let request = body.validate().map_err(ApiError::Validation)?;
    let book = state.db.books.update(id, request).await?;
    Ok(Json(book))
}

/// DELETE /api/books/:id - remove a book.
async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.books.delete(id).await?;
    Ok(Json(serde_json::json!({ "message": "Book deleted" })))
}

// =============================================================================
// STATISTICS HANDLER
// =============================================================================

/// GET /api/statistics - aggregate the whole collection.
async fn get_statistics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let books = state.db.books.all().await?;
    let stats = compute_statistics(&books, Utc::now());
    Ok(Json(stats))
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

/// API-level error, mapped onto HTTP status codes and JSON bodies.
#[derive(Debug)]
enum ApiError {
    Database(shelfmark_core::Error),
    NotFound(String),
    BadRequest(String),
    Validation(Vec<ValidationIssue>),
}

impl From<shelfmark_core::Error> for ApiError {
    fn from(err: shelfmark_core::Error) -> Self {
        match err {
            shelfmark_core::Error::BookNotFound(id) => {
                ApiError::NotFound(format!("Book {} not found", id))
            }
            shelfmark_core::Error::NotFound(msg) => ApiError::NotFound(msg),
            shelfmark_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            shelfmark_core::Error::Validation(issues) => ApiError::Validation(issues),
            other => ApiError::Database(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ApiError::Database(err) => {
                // Internal detail goes to the log, never to the client.
                tracing::error!(error = %err, "Request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": "Internal Server Error" }),
                )
            }
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "error": message }),
            ),
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": message }),
            ),
            ApiError::Validation(issues) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": "Validation failed", "details": issues }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Parse allowed CORS origins from the ALLOWED_ORIGINS environment variable.
///
/// Accepts a comma-separated list; entries that fail to parse as header
/// values are skipped with a warning. Defaults to the local frontend dev
/// servers.
fn parse_allowed_origins() -> Vec<HeaderValue> {
    let origins = std::env::var("ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:4200,http://localhost:3000".to_string());

    origins
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

// =============================================================================
// ROUTER
// =============================================================================

fn app_router(state: AppState) -> Router {
    Router::new()
        // System
        .route("/health", get(health_check))
        .route("/openapi.json", get(openapi_json))
        // Books
        .route("/api/books", get(list_books).post(create_book))
        .route(
            "/api/books/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
        // Statistics
        .route("/api/statistics", get(get_statistics))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(CatchPanicLayer::new())
        .layer({
            let allowed_origins = parse_allowed_origins();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600))
        })
        // Cover images arrive as data URLs inside the JSON body
        .layer(RequestBodyLimitLayer::new(10 * 1024 * 1024)) // 10 MB
        .with_state(state)
}

// =============================================================================
// STARTUP
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "shelfmark_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shelfmark_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("shelfmark-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(non_blocking);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            } else {
                layer = layer.with_ansi(false); // no ANSI in files
            }
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    // Get configuration from environment
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://shelfmark.db".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .unwrap_or(3000);

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;
    info!("Database connected");

    // Run migrations
    info!("Running migrations...");
    db.migrate().await?;
    info!("Migrations complete");

    let state = AppState { db };
    let app = app_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
