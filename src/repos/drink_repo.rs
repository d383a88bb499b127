/*
 * Responsibility
 * - drinks テーブル向け SQLx 操作
 * - SqlitePool を受け取り CRUD とスキーマ管理を提供
 * - 一意制約違反は RepoError::Conflict として返す
 */
use sqlx::{FromRow, SqlitePool};

use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct DrinkRow {
    pub id: i64,
    pub title: String,
    /// JSON array of ingredients, stored as text.
    pub recipe: String,
}

pub async fn ensure_schema(db: &SqlitePool) -> Result<(), RepoError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS drinks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL UNIQUE,
            recipe TEXT NOT NULL
        )
        "#,
    )
    .execute(db)
    .await?;

    Ok(())
}

/// Drop, recreate and seed. Intended for dev/test startup only.
pub async fn recreate_schema(db: &SqlitePool) -> Result<(), RepoError> {
    sqlx::query("DROP TABLE IF EXISTS drinks").execute(db).await?;
    ensure_schema(db).await?;

    sqlx::query("INSERT INTO drinks (title, recipe) VALUES ($1, $2)")
        .bind("water")
        .bind(r#"[{"name": "water", "color": "blue", "parts": 1}]"#)
        .execute(db)
        .await?;

    Ok(())
}

pub async fn list(db: &SqlitePool) -> Result<Vec<DrinkRow>, RepoError> {
    let rows = sqlx::query_as::<_, DrinkRow>(
        r#"
        SELECT id, title, recipe
        FROM drinks
        ORDER BY id
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn create(db: &SqlitePool, title: &str, recipe: &str) -> Result<DrinkRow, RepoError> {
    let row = sqlx::query_as::<_, DrinkRow>(
        r#"
        INSERT INTO drinks (title, recipe)
        VALUES ($1, $2)
        RETURNING id, title, recipe
        "#,
    )
    .bind(title)
    .bind(recipe)
    .fetch_one(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn update(
    db: &SqlitePool,
    drink_id: i64,
    title: Option<&str>,
    recipe: Option<&str>,
) -> Result<Option<DrinkRow>, RepoError> {
    // None keeps the stored value
    let row = sqlx::query_as::<_, DrinkRow>(
        r#"
        UPDATE drinks
        SET title = COALESCE($1, title), recipe = COALESCE($2, recipe)
        WHERE id = $3
        RETURNING id, title, recipe
        "#,
    )
    .bind(title)
    .bind(recipe)
    .bind(drink_id)
    .fetch_optional(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn delete(db: &SqlitePool, drink_id: i64) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM drinks
        WHERE id = $1
        "#,
    )
    .bind(drink_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}
