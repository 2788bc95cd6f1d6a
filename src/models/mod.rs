//! Data models for Libros

pub mod book;
pub mod category;
pub mod genre;

// Re-export commonly used types
pub use book::{Book, BookChanges, CreateBook, NewBook, UpdateBook};
pub use category::Category;
pub use genre::Genre;
