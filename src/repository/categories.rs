//! Categories repository

use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::Category};

#[derive(Clone)]
pub struct CategoriesRepository {
    pool: Pool<Postgres>,
}

impl CategoriesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all categories
    pub async fn list(&self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>(
            "SELECT id_categoria, nombre FROM categorias ORDER BY id_categoria",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
