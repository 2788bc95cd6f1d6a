//! OpenAPI documentation

use axum::Json;
use utoipa::OpenApi;

use crate::api::{books, categories, genres, health, root};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libros API",
        version = "0.1.0",
        description = "Book catalog REST API"
    ),
    paths(
        root::welcome,
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::create_book,
        books::update_book,
        // Categories & genres
        categories::list_categories,
        genres::list_genres,
    ),
    components(
        schemas(
            crate::models::Book,
            crate::models::CreateBook,
            crate::models::UpdateBook,
            crate::models::Category,
            crate::models::Genre,
            root::WelcomeResponse,
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
            crate::error::ValidationErrorResponse,
        )
    ),
    tags(
        (name = "root", description = "Welcome endpoint"),
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog"),
        (name = "categories", description = "Book categories"),
        (name = "genres", description = "Literary genres")
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document as JSON
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
