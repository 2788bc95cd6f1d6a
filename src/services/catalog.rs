//! Catalog service: books, categories and genres

use std::sync::Arc;

use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::{Book, Category, CreateBook, Genre, UpdateBook},
    repository::CatalogStore,
    schema::{self, FieldErrors},
};

pub const BOOK_NOT_FOUND: &str = "Libro no encontrado";

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

fn rejected(operation: &str, errors: FieldErrors) -> AppError {
    tracing::warn!("Rejected {} payload: {}", operation, errors);
    AppError::Validation(errors)
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.store.list_books().await
    }

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.store.list_categories().await
    }

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.store.list_genres().await
    }

    /// Validate a create payload against the book schema and insert it
    pub async fn create_book(&self, payload: Value) -> AppResult<Book> {
        let new_book = schema::load::<CreateBook>(payload)
            .and_then(CreateBook::into_new_book)
            .map_err(|e| rejected("create book", e))?;

        let book = self.store.create_book(&new_book).await?;
        tracing::info!("Created book id_libro={}", book.id_libro);
        Ok(book)
    }

    /// Apply the keys present in `payload` to book `id`.
    ///
    /// Existence is checked first so that an unknown id is always a 404,
    /// whatever the payload.
    pub async fn update_book(&self, id: i32, payload: Value) -> AppResult<Book> {
        let existing = self
            .store
            .get_book(id)
            .await?
            .ok_or_else(|| AppError::NotFound(BOOK_NOT_FOUND.to_string()))?;

        let changes = schema::load::<UpdateBook>(payload)
            .and_then(UpdateBook::into_changes)
            .map_err(|e| rejected("update book", e))?;

        if changes.is_empty() {
            return Ok(existing);
        }

        let book = self
            .store
            .update_book(id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound(BOOK_NOT_FOUND.to_string()))?;
        tracing::info!("Updated book id_libro={}", book.id_libro);
        Ok(book)
    }

    /// Check that the store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewBook;
    use crate::repository::MockCatalogStore;
    use mockall::predicate::eq;
    use serde_json::json;

    fn stored_book() -> Book {
        Book {
            id_libro: 1,
            id_autor: None,
            id_genero: 1,
            id_categoria: 1,
            titulo: "T".to_string(),
            sinopsis: "S".to_string(),
            portada: "http://x/c.jpg".to_string(),
        }
    }

    fn service(store: MockCatalogStore) -> CatalogService {
        CatalogService::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_create_passes_validated_book_to_store() {
        let mut store = MockCatalogStore::new();
        store
            .expect_create_book()
            .withf(|book: &NewBook| book.id_libro == Some(1) && book.titulo == "T")
            .times(1)
            .returning(|book| Ok(book.clone().into_book(1)));

        let book = service(store)
            .create_book(json!({
                "id_libro": 1,
                "id_genero": 1,
                "id_categoria": 1,
                "titulo": "T",
                "sinopsis": "S",
                "portada": "http://x/c.jpg"
            }))
            .await
            .unwrap();

        assert_eq!(book, stored_book());
    }

    #[tokio::test]
    async fn test_create_invalid_payload_never_reaches_store() {
        let mut store = MockCatalogStore::new();
        store.expect_create_book().never();

        let err = service(store)
            .create_book(json!({ "titulo": "T" }))
            .await
            .unwrap_err();

        match err {
            AppError::Validation(errors) => {
                assert!(errors.get("portada").is_some());
                assert!(errors.get("id_genero").is_some());
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found_without_write() {
        let mut store = MockCatalogStore::new();
        store
            .expect_get_book()
            .with(eq(999))
            .times(1)
            .returning(|_| Ok(None));
        store.expect_update_book().never();

        let err = service(store)
            .update_book(999, json!({ "titulo": null, "foo": 1 }))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(ref msg) if msg == BOOK_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_update_sends_only_present_fields() {
        let mut store = MockCatalogStore::new();
        store
            .expect_get_book()
            .returning(|_| Ok(Some(stored_book())));
        store
            .expect_update_book()
            .withf(|id, changes| {
                *id == 1
                    && changes.titulo.as_deref() == Some("New Title")
                    && changes.sinopsis.is_none()
                    && changes.id_autor.is_none()
            })
            .times(1)
            .returning(|_, changes| {
                let mut book = stored_book();
                changes.apply_to(&mut book);
                Ok(Some(book))
            });

        let book = service(store)
            .update_book(1, json!({ "titulo": "New Title" }))
            .await
            .unwrap();

        assert_eq!(book.titulo, "New Title");
        assert_eq!(book.sinopsis, "S");
    }

    #[tokio::test]
    async fn test_update_with_empty_payload_returns_existing() {
        let mut store = MockCatalogStore::new();
        store
            .expect_get_book()
            .returning(|_| Ok(Some(stored_book())));
        store.expect_update_book().never();

        let book = service(store).update_book(1, json!({})).await.unwrap();
        assert_eq!(book, stored_book());
    }

    #[tokio::test]
    async fn test_update_invalid_payload_is_rejected() {
        let mut store = MockCatalogStore::new();
        store
            .expect_get_book()
            .returning(|_| Ok(Some(stored_book())));
        store.expect_update_book().never();

        let err = service(store)
            .update_book(1, json!({ "titulo": null }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
