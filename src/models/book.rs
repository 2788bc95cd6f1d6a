//! Book model and request types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::schema::{Field, FieldErrors, Schema, MISSING_FIELD, SCHEMA_KEY};

/// Book record (`libros` table)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id_libro: i32,
    /// Author reference, if known
    pub id_autor: Option<i32>,
    pub id_genero: i32,
    pub id_categoria: i32,
    pub titulo: String,
    pub sinopsis: String,
    /// Cover image URL
    pub portada: String,
}

/// Create book request.
///
/// Every field is optional at the wire level so that missing fields are
/// reported as validation errors instead of deserialization failures.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    /// Primary key; generated by the store when omitted
    #[validate(range(min = 1, message = "Must be greater than or equal to 1."))]
    pub id_libro: Option<i32>,
    pub id_autor: Option<i32>,
    #[validate(required(message = "Missing data for required field."))]
    pub id_genero: Option<i32>,
    #[validate(required(message = "Missing data for required field."))]
    pub id_categoria: Option<i32>,
    #[validate(
        required(message = "Missing data for required field."),
        length(max = 100, message = "Longer than maximum length 100.")
    )]
    pub titulo: Option<String>,
    #[validate(
        required(message = "Missing data for required field."),
        length(max = 255, message = "Longer than maximum length 255.")
    )]
    pub sinopsis: Option<String>,
    #[validate(
        required(message = "Missing data for required field."),
        length(max = 255, message = "Longer than maximum length 255.")
    )]
    pub portada: Option<String>,
}

impl Schema for CreateBook {
    const FIELDS: &'static [Field] = &[
        Field::integer("id_libro"),
        Field::integer("id_autor").nullable(),
        Field::integer("id_genero"),
        Field::integer("id_categoria"),
        Field::string("titulo"),
        Field::string("sinopsis"),
        Field::string("portada"),
    ];
}

/// A validated book ready to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub id_libro: Option<i32>,
    pub id_autor: Option<i32>,
    pub id_genero: i32,
    pub id_categoria: i32,
    pub titulo: String,
    pub sinopsis: String,
    pub portada: String,
}

impl CreateBook {
    /// Validate required fields and lengths.
    pub fn into_new_book(self) -> Result<NewBook, FieldErrors> {
        self.validate()?;

        match (
            self.id_genero,
            self.id_categoria,
            self.titulo,
            self.sinopsis,
            self.portada,
        ) {
            (Some(id_genero), Some(id_categoria), Some(titulo), Some(sinopsis), Some(portada)) => {
                Ok(NewBook {
                    id_libro: self.id_libro,
                    id_autor: self.id_autor,
                    id_genero,
                    id_categoria,
                    titulo,
                    sinopsis,
                    portada,
                })
            }
            _ => Err(FieldErrors::single(SCHEMA_KEY, MISSING_FIELD)),
        }
    }
}

/// Update book request.
///
/// Absent keys stay `None`. Only `id_autor` may be sent as null, which
/// `Some(None)` records; nulls on other keys are rejected by the schema.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateBook {
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub id_autor: Option<Option<i32>>,
    pub id_genero: Option<i32>,
    pub id_categoria: Option<i32>,
    pub titulo: Option<String>,
    pub sinopsis: Option<String>,
    pub portada: Option<String>,
}

impl Schema for UpdateBook {
    const FIELDS: &'static [Field] = &[
        Field::integer("id_autor").nullable(),
        Field::integer("id_genero"),
        Field::integer("id_categoria"),
        Field::string("titulo"),
        Field::string("sinopsis"),
        Field::string("portada"),
    ];
}

/// Validated set of changes to apply to a stored book
#[derive(Debug, Default, Clone, PartialEq, Eq, Validate)]
pub struct BookChanges {
    /// `Some(None)` clears the author
    pub id_autor: Option<Option<i32>>,
    pub id_genero: Option<i32>,
    pub id_categoria: Option<i32>,
    #[validate(length(max = 100, message = "Longer than maximum length 100."))]
    pub titulo: Option<String>,
    #[validate(length(max = 255, message = "Longer than maximum length 255."))]
    pub sinopsis: Option<String>,
    #[validate(length(max = 255, message = "Longer than maximum length 255."))]
    pub portada: Option<String>,
}

impl UpdateBook {
    /// Check lengths of the present fields.
    pub fn into_changes(self) -> Result<BookChanges, FieldErrors> {
        let changes = BookChanges {
            id_autor: self.id_autor,
            id_genero: self.id_genero,
            id_categoria: self.id_categoria,
            titulo: self.titulo,
            sinopsis: self.sinopsis,
            portada: self.portada,
        };
        changes.validate()?;
        Ok(changes)
    }
}

impl BookChanges {
    pub fn is_empty(&self) -> bool {
        self == &BookChanges::default()
    }

    /// Overwrite the fields present in this change set.
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(id_autor) = self.id_autor {
            book.id_autor = id_autor;
        }
        if let Some(id_genero) = self.id_genero {
            book.id_genero = id_genero;
        }
        if let Some(id_categoria) = self.id_categoria {
            book.id_categoria = id_categoria;
        }
        if let Some(ref titulo) = self.titulo {
            book.titulo = titulo.clone();
        }
        if let Some(ref sinopsis) = self.sinopsis {
            book.sinopsis = sinopsis.clone();
        }
        if let Some(ref portada) = self.portada {
            book.portada = portada.clone();
        }
    }
}

impl NewBook {
    /// The stored record, once the store has assigned `id_libro`.
    pub fn into_book(self, id_libro: i32) -> Book {
        Book {
            id_libro,
            id_autor: self.id_autor,
            id_genero: self.id_genero,
            id_categoria: self.id_categoria,
            titulo: self.titulo,
            sinopsis: self.sinopsis,
            portada: self.portada,
        }
    }
}
