//! Shared test helpers: in-memory catalog store and router harness

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use libros_server::{
    api,
    error::{AppError, AppResult},
    models::{Book, BookChanges, Category, Genre, NewBook},
    repository::CatalogStore,
    schema::FieldErrors,
    services::Services,
    AppConfig, AppState,
};

/// In-memory store with the same key and reference checks as the database schema.
#[derive(Default)]
pub struct MemoryCatalog {
    books: Mutex<BTreeMap<i32, Book>>,
    genres: Vec<Genre>,
    categories: Vec<Category>,
}

impl MemoryCatalog {
    /// Genres and categories 1 and 2 exist, no books.
    pub fn seeded() -> Self {
        Self {
            books: Mutex::new(BTreeMap::new()),
            genres: vec![
                Genre { id_genero: 1, nombre: "Novela".to_string() },
                Genre { id_genero: 2, nombre: "Poesía".to_string() },
            ],
            categories: vec![
                Category { id_categoria: 1, nombre: "Ficción".to_string() },
                Category { id_categoria: 2, nombre: "No ficción".to_string() },
            ],
        }
    }

    pub fn book_count(&self) -> usize {
        self.books.lock().unwrap().len()
    }

    fn check_references(&self, id_genero: i32, id_categoria: i32) -> AppResult<()> {
        if !self.genres.iter().any(|g| g.id_genero == id_genero) {
            return Err(AppError::Validation(FieldErrors::single(
                "id_genero",
                "Related record does not exist.",
            )));
        }
        if !self.categories.iter().any(|c| c.id_categoria == id_categoria) {
            return Err(AppError::Validation(FieldErrors::single(
                "id_categoria",
                "Related record does not exist.",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn list_books(&self) -> AppResult<Vec<Book>> {
        Ok(self.books.lock().unwrap().values().cloned().collect())
    }

    async fn get_book(&self, id: i32) -> AppResult<Option<Book>> {
        Ok(self.books.lock().unwrap().get(&id).cloned())
    }

    async fn create_book(&self, book: &NewBook) -> AppResult<Book> {
        self.check_references(book.id_genero, book.id_categoria)?;
        let mut books = self.books.lock().unwrap();
        let id = match book.id_libro {
            Some(id) if books.contains_key(&id) => {
                return Err(AppError::Conflict(
                    "A book with this id already exists".to_string(),
                ))
            }
            Some(id) => id,
            None => books.keys().next_back().map_or(1, |last| last + 1),
        };
        let stored = book.clone().into_book(id);
        books.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_book(&self, id: i32, changes: &BookChanges) -> AppResult<Option<Book>> {
        let Some(mut book) = self.get_book(id).await? else {
            return Ok(None);
        };
        changes.apply_to(&mut book);
        self.check_references(book.id_genero, book.id_categoria)?;
        self.books.lock().unwrap().insert(id, book.clone());
        Ok(Some(book))
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        Ok(self.categories.clone())
    }

    async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        Ok(self.genres.clone())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryCatalog>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryCatalog::seeded());
        let state = AppState {
            config: Arc::new(AppConfig::default()),
            services: Arc::new(Services::new(store.clone())),
        };
        Self {
            router: api::create_router(state),
            store,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::ORIGIN, "http://example.com");

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let allow_origin = response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            allow_origin,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, Some(body)).await
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub allow_origin: Option<String>,
    pub body: Value,
}
