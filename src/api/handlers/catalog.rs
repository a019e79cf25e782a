use sqlx::{Pool, Postgres};
use warp::{http::StatusCode, reject::Rejection, reply, Reply};

use crate::{
    actions,
    error::ApiError,
    jwt::SessionData,
    permissions::ActionType,
    schema::{IngredientPayload, IngredientQuery, TagPayload, Uuid},
};

use super::reject;

pub async fn list_tags(pool: Pool<Postgres>) -> Result<impl Reply, Rejection> {
    let tags = actions::list_tags(&pool).await.map_err(reject)?;
    Ok(reply::json(&tags))
}

pub async fn get_tag(id: Uuid, pool: Pool<Postgres>) -> Result<impl Reply, Rejection> {
    let tag = actions::get_tag(id, &pool)
        .await
        .map_err(reject)?
        .ok_or_else(|| reject(ApiError::not_found("No tag exists with specified id")))?;

    Ok(reply::json(&tag))
}

pub async fn create_tag(
    session: SessionData,
    payload: TagPayload,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    session
        .authenticate(ActionType::ManageCatalog)
        .map_err(reject)?;

    let tag = actions::create_tag(&payload, &pool).await.map_err(reject)?;
    Ok(reply::with_status(reply::json(&tag), StatusCode::CREATED))
}

pub async fn update_tag(
    id: Uuid,
    session: SessionData,
    payload: TagPayload,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    session
        .authenticate(ActionType::ManageCatalog)
        .map_err(reject)?;

    actions::update_tag(id, &payload, &pool)
        .await
        .map_err(reject)?;
    let tag = actions::get_tag(id, &pool)
        .await
        .map_err(reject)?
        .ok_or_else(|| reject(ApiError::internal("Updated tag is missing")))?;

    Ok(reply::json(&tag))
}

pub async fn delete_tag(
    id: Uuid,
    session: SessionData,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    session
        .authenticate(ActionType::ManageCatalog)
        .map_err(reject)?;

    actions::delete_tag(id, &pool).await.map_err(reject)?;
    Ok(reply::with_status(warp::reply(), StatusCode::NO_CONTENT))
}

pub async fn list_ingredients(
    query: IngredientQuery,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    let ingredients = actions::list_ingredients(query.name.as_deref(), &pool)
        .await
        .map_err(reject)?;

    Ok(reply::json(&ingredients))
}

pub async fn get_ingredient(id: Uuid, pool: Pool<Postgres>) -> Result<impl Reply, Rejection> {
    let ingredient = actions::get_ingredient(id, &pool)
        .await
        .map_err(reject)?
        .ok_or_else(|| reject(ApiError::not_found("No ingredient exists with specified id")))?;

    Ok(reply::json(&ingredient))
}

pub async fn create_ingredient(
    session: SessionData,
    payload: IngredientPayload,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    session
        .authenticate(ActionType::ManageCatalog)
        .map_err(reject)?;

    let ingredient = actions::create_ingredient(&payload, &pool)
        .await
        .map_err(reject)?;

    Ok(reply::with_status(
        reply::json(&ingredient),
        StatusCode::CREATED,
    ))
}

pub async fn update_ingredient(
    id: Uuid,
    session: SessionData,
    payload: IngredientPayload,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    session
        .authenticate(ActionType::ManageCatalog)
        .map_err(reject)?;

    actions::update_ingredient(id, &payload, &pool)
        .await
        .map_err(reject)?;
    let ingredient = actions::get_ingredient(id, &pool)
        .await
        .map_err(reject)?
        .ok_or_else(|| reject(ApiError::internal("Updated ingredient is missing")))?;

    Ok(reply::json(&ingredient))
}

pub async fn delete_ingredient(
    id: Uuid,
    session: SessionData,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    session
        .authenticate(ActionType::ManageCatalog)
        .map_err(reject)?;

    actions::delete_ingredient(id, &pool).await.map_err(reject)?;
    Ok(reply::with_status(warp::reply(), StatusCode::NO_CONTENT))
}
