use crate::{
    error::{ApiError, QueryError},
    schema::{Ingredient, IngredientPayload, Uuid},
};

use sqlx::{Pool, Postgres};

/// ILIKE pattern matching names starting with `prefix`. The pattern
/// metacharacters are escaped so user input only matches literally;
/// backslash goes first so the escapes themselves survive.
fn prefix_pattern(prefix: &str) -> String {
    let escaped = prefix
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("{escaped}%")
}

/// Ingredient catalog listing, optionally narrowed by a case-insensitive
/// name prefix. Unpaginated.
pub async fn list_ingredients(
    prefix: Option<&str>,
    pool: &Pool<Postgres>,
) -> Result<Vec<Ingredient>, ApiError> {
    let rows: Vec<Ingredient> = match prefix {
        Some(prefix) => {
            sqlx::query_as("SELECT * FROM ingredients WHERE name ILIKE $1 ORDER BY name")
                .bind(prefix_pattern(prefix))
                .fetch_all(pool)
                .await
                .map_err(|e| QueryError::from(e).into())?
        }
        None => sqlx::query_as("SELECT * FROM ingredients ORDER BY name")
            .fetch_all(pool)
            .await
            .map_err(|e| QueryError::from(e).into())?,
    };

    Ok(rows)
}

pub async fn get_ingredient(
    id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Option<Ingredient>, ApiError> {
    let row: Option<Ingredient> = sqlx::query_as("SELECT * FROM ingredients WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    Ok(row)
}

pub async fn create_ingredient(
    payload: &IngredientPayload,
    pool: &Pool<Postgres>,
) -> Result<Ingredient, ApiError> {
    let row: Ingredient = sqlx::query_as(
        "INSERT INTO ingredients (name, measurement_unit) VALUES ($1, $2) RETURNING *",
    )
    .bind(&payload.name)
    .bind(&payload.measurement_unit)
    .fetch_one(pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    Ok(row)
}

pub async fn update_ingredient(
    id: Uuid,
    payload: &IngredientPayload,
    pool: &Pool<Postgres>,
) -> Result<(), ApiError> {
    let result =
        sqlx::query("UPDATE ingredients SET name = $1, measurement_unit = $2 WHERE id = $3")
            .bind(&payload.name)
            .bind(&payload.measurement_unit)
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| QueryError::from(e).into())?;

    if result.rows_affected() <= 0 {
        return Err(ApiError::not_found("No ingredient exists with specified id"));
    }

    Ok(())
}

pub async fn delete_ingredient(id: Uuid, pool: &Pool<Postgres>) -> Result<(), ApiError> {
    let mut tr = pool
        .begin()
        .await
        .map_err(|_| ApiError::internal("Could not start transaction"))?;

    sqlx::query("DELETE FROM recipe_ingredients WHERE ingredient_id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    let result = sqlx::query("DELETE FROM ingredients WHERE id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    if result.rows_affected() <= 0 {
        return Err(ApiError::not_found("No ingredient exists with specified id"));
    }

    tr.commit()
        .await
        .map_err(|_| ApiError::internal("Could not commit transaction"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_pattern_appends_trailing_wildcard() {
        assert_eq!(prefix_pattern("mil"), "mil%");
        assert_eq!(prefix_pattern(""), "%");
    }

    #[test]
    fn prefix_pattern_escapes_metacharacters() {
        assert_eq!(prefix_pattern("50%"), "50\\%%");
        assert_eq!(prefix_pattern("sea_salt"), "sea\\_salt%");
    }

    #[test]
    fn prefix_pattern_escapes_trailing_backslash() {
        assert_eq!(prefix_pattern("100\\"), "100\\\\%");
    }
}
