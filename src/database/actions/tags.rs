use crate::{
    error::{ApiError, QueryError},
    schema::{Tag, TagPayload, Uuid},
};

use sqlx::{Pool, Postgres};

pub async fn list_tags(pool: &Pool<Postgres>) -> Result<Vec<Tag>, ApiError> {
    let list: Vec<Tag> = sqlx::query_as("SELECT * FROM tags ORDER BY name")
        .fetch_all(pool)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    Ok(list)
}

pub async fn get_tag(id: Uuid, pool: &Pool<Postgres>) -> Result<Option<Tag>, ApiError> {
    let tag: Option<Tag> = sqlx::query_as("SELECT * FROM tags WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    Ok(tag)
}

pub async fn create_tag(payload: &TagPayload, pool: &Pool<Postgres>) -> Result<Tag, ApiError> {
    let tag: Tag = sqlx::query_as(
        "INSERT INTO tags (name, color, slug) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(&payload.name)
    .bind(&payload.color)
    .bind(&payload.slug)
    .fetch_one(pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    Ok(tag)
}

pub async fn update_tag(
    id: Uuid,
    payload: &TagPayload,
    pool: &Pool<Postgres>,
) -> Result<(), ApiError> {
    let result = sqlx::query("UPDATE tags SET name = $1, color = $2, slug = $3 WHERE id = $4")
        .bind(&payload.name)
        .bind(&payload.color)
        .bind(&payload.slug)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    if result.rows_affected() <= 0 {
        return Err(ApiError::not_found("No tag exists with specified id"));
    }

    Ok(())
}

pub async fn delete_tag(id: Uuid, pool: &Pool<Postgres>) -> Result<(), ApiError> {
    let mut tr = pool
        .begin()
        .await
        .map_err(|_| ApiError::internal("Could not start transaction"))?;

    sqlx::query("DELETE FROM recipe_tags WHERE tag_id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    let result = sqlx::query("DELETE FROM tags WHERE id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    if result.rows_affected() <= 0 {
        return Err(ApiError::not_found("No tag exists with specified id"));
    }

    tr.commit()
        .await
        .map_err(|_| ApiError::internal("Could not commit transaction"))?;
    Ok(())
}

/// Rejects recipe payloads referencing tags missing from the catalog.
pub async fn ensure_tags_exist(tag_ids: &[Uuid], pool: &Pool<Postgres>) -> Result<(), ApiError> {
    if tag_ids.is_empty() {
        return Ok(());
    }

    let found: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM tags WHERE id = ANY($1)")
        .bind(tag_ids)
        .fetch_all(pool)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    for tag_id in tag_ids.iter() {
        if !found.iter().any(|(id,)| id == tag_id) {
            return Err(ApiError::bad_request("Unknown tag"));
        }
    }

    Ok(())
}

pub async fn list_recipe_tags(
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Vec<Tag>, ApiError> {
    let list: Vec<Tag> = sqlx::query_as(
        "
        SELECT t.*
        FROM recipe_tags rt
        INNER JOIN tags t ON t.id = rt.tag_id
        WHERE rt.recipe_id = $1
        ORDER BY t.name
    ",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    Ok(list)
}
