//! User and category lookups.

use sqlx::PgPool;

use crate::{
    DbError,
    models::{CategoryRow, UserRow},
};

/// Fetch a single user by its primary key.
pub async fn get_user(pool: &PgPool, id: i64) -> Result<UserRow, DbError> {
    sqlx::query_as::<_, UserRow>("SELECT id, role FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("user {id}")))
}

/// Fetch a category by its unique name.
pub async fn get_category_by_name(pool: &PgPool, name: &str) -> Result<CategoryRow, DbError> {
    sqlx::query_as::<_, CategoryRow>("SELECT id, name FROM categories WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("category '{name}'")))
}
