//! Books repository

use sqlx::{Pool, Postgres};

use super::map_constraint_error;
use crate::{
    error::AppResult,
    models::{Book, BookChanges, NewBook},
};

const BOOK_COLUMNS: &str =
    "id_libro, id_autor, id_genero, id_categoria, titulo, sinopsis, portada";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all books
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let query = format!("SELECT {} FROM libros ORDER BY id_libro", BOOK_COLUMNS);
        let rows = sqlx::query_as::<_, Book>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get a book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        let query = format!("SELECT {} FROM libros WHERE id_libro = $1", BOOK_COLUMNS);
        let row = sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Insert a book, keeping the client-supplied id when present
    pub async fn create(&self, data: &NewBook) -> AppResult<Book> {
        let Some(id_libro) = data.id_libro else {
            let query = format!(
                r#"
                INSERT INTO libros (id_autor, id_genero, id_categoria, titulo, sinopsis, portada)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {}
                "#,
                BOOK_COLUMNS
            );
            return sqlx::query_as::<_, Book>(&query)
                .bind(data.id_autor)
                .bind(data.id_genero)
                .bind(data.id_categoria)
                .bind(&data.titulo)
                .bind(&data.sinopsis)
                .bind(&data.portada)
                .fetch_one(&self.pool)
                .await
                .map_err(map_constraint_error);
        };

        let mut tx = self.pool.begin().await?;

        // Generated-id inserts wait until the sequence has been moved past `id_libro`.
        sqlx::query("LOCK TABLE libros IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let query = format!(
            r#"
            INSERT INTO libros (id_libro, id_autor, id_genero, id_categoria, titulo, sinopsis, portada)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );
        let row = sqlx::query_as::<_, Book>(&query)
            .bind(id_libro)
            .bind(data.id_autor)
            .bind(data.id_genero)
            .bind(data.id_categoria)
            .bind(&data.titulo)
            .bind(&data.sinopsis)
            .bind(&data.portada)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_constraint_error)?;

        // Explicit ids bypass the identity sequence; move it past them.
        sqlx::query(
            "SELECT setval(pg_get_serial_sequence('libros', 'id_libro'), \
             GREATEST((SELECT MAX(id_libro) FROM libros), 1))",
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Apply a partial update; `Ok(None)` if the book does not exist
    pub async fn update(&self, id: i32, data: &BookChanges) -> AppResult<Option<Book>> {
        if data.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut sets = Vec::new();
        let mut idx = 1;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.id_autor, "id_autor");
        add_field!(data.id_genero, "id_genero");
        add_field!(data.id_categoria, "id_categoria");
        add_field!(data.titulo, "titulo");
        add_field!(data.sinopsis, "sinopsis");
        add_field!(data.portada, "portada");

        let query = format!(
            "UPDATE libros SET {} WHERE id_libro = ${} RETURNING {}",
            sets.join(", "),
            idx,
            BOOK_COLUMNS
        );

        let mut builder = sqlx::query_as::<_, Book>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.id_autor);
        bind_field!(data.id_genero);
        bind_field!(data.id_categoria);
        bind_field!(data.titulo);
        bind_field!(data.sinopsis);
        bind_field!(data.portada);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_constraint_error)
    }
}
