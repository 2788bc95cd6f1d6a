//! Repository layer for database operations

pub mod books;
pub mod categories;
pub mod genres;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookChanges, Category, Genre, NewBook},
    schema::{FieldErrors, SCHEMA_KEY},
};

/// Store operations needed by the catalog service.
///
/// Implemented by [`Repository`] over PostgreSQL; handlers only ever see
/// this trait through [`crate::services::Services`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_books(&self) -> AppResult<Vec<Book>>;

    async fn get_book(&self, id: i32) -> AppResult<Option<Book>>;

    async fn create_book(&self, book: &NewBook) -> AppResult<Book>;

    /// `Ok(None)` when no book has that id.
    async fn update_book(&self, id: i32, changes: &BookChanges) -> AppResult<Option<Book>>;

    async fn list_categories(&self) -> AppResult<Vec<Category>>;

    async fn list_genres(&self) -> AppResult<Vec<Genre>>;

    /// Round-trip to the store (readiness check)
    async fn ping(&self) -> AppResult<()>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub categories: categories::CategoriesRepository,
    pub genres: genres::GenresRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            categories: categories::CategoriesRepository::new(pool.clone()),
            genres: genres::GenresRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl CatalogStore for Repository {
    async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.books.list().await
    }

    async fn get_book(&self, id: i32) -> AppResult<Option<Book>> {
        self.books.get_by_id(id).await
    }

    async fn create_book(&self, book: &NewBook) -> AppResult<Book> {
        self.books.create(book).await
    }

    async fn update_book(&self, id: i32, changes: &BookChanges) -> AppResult<Option<Book>> {
        self.books.update(id, changes).await
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.categories.list().await
    }

    async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.genres.list().await
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// SQLSTATE raised by `nextval` once a sequence reached its maximum
const SEQUENCE_EXHAUSTED: &str = "2200H";

/// Translate constraint violations into client errors.
///
/// Foreign keys follow PostgreSQL's default naming (`libros_id_genero_fkey`),
/// so the offending column is recovered from the constraint name.
pub(crate) fn map_constraint_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some(SEQUENCE_EXHAUSTED) {
            return AppError::Conflict(
                "No book ids left to assign; supply id_libro explicitly".to_string(),
            );
        }
        if db_err.is_unique_violation() {
            return AppError::Conflict("A book with this id already exists".to_string());
        }
        if db_err.is_foreign_key_violation() {
            let field = db_err
                .constraint()
                .and_then(constraint_column)
                .unwrap_or(SCHEMA_KEY);
            return AppError::Validation(FieldErrors::single(
                field,
                "Related record does not exist.",
            ));
        }
    }
    AppError::Database(err)
}

fn constraint_column(constraint: &str) -> Option<&'static str> {
    if constraint.contains("id_genero") {
        Some("id_genero")
    } else if constraint.contains("id_categoria") {
        Some("id_categoria")
    } else {
        None
    }
}
