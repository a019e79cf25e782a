use crate::{
    error::{ApiError, QueryError},
    pagination::PageContext,
    schema::{FolloweeView, RecipeMinified, UserProfile, UserRow, Uuid},
    SUBSCRIPTION_COUNT_PER_PAGE,
};

use sqlx::{Pool, Postgres};

use super::recipes::{count_author_recipes, fetch_author_recipes};

pub async fn is_following(
    follower_id: Uuid,
    followee_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<bool, ApiError> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        "SELECT followee_id FROM follows WHERE follower_id = $1 AND followee_id = $2",
    )
    .bind(follower_id)
    .bind(followee_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    Ok(row.is_some())
}

/// Self-follows are invalid input; duplicate edges are conflicts.
pub async fn subscribe(
    follower_id: Uuid,
    followee_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<(), ApiError> {
    if follower_id == followee_id {
        return Err(ApiError::bad_request("You cannot subscribe to yourself"));
    }

    let result = sqlx::query(
        "INSERT INTO follows (follower_id, followee_id) VALUES ($1, $2) ON CONFLICT DO NOTHING RETURNING *;",
    )
    .bind(follower_id)
    .bind(followee_id)
    .execute(pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    if result.rows_affected() <= 0 {
        return Err(ApiError::conflict("Already subscribed to this user"));
    }

    Ok(())
}

pub async fn unsubscribe(
    follower_id: Uuid,
    followee_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<(), ApiError> {
    let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followee_id = $2")
        .bind(follower_id)
        .bind(followee_id)
        .execute(pool)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    if result.rows_affected() <= 0 {
        return Err(ApiError::not_found("Not subscribed to this user"));
    }

    Ok(())
}

/// Denormalized followee view: profile, most recent recipes (capped at
/// `recipes_limit` when given) and the uncapped recipe total.
pub async fn build_followee_view(
    profile: UserProfile,
    recipes_limit: Option<i64>,
    pool: &Pool<Postgres>,
) -> Result<FolloweeView, ApiError> {
    let recipes = fetch_author_recipes(profile.id, recipes_limit, pool)
        .await?
        .into_iter()
        .map(RecipeMinified::from)
        .collect();
    let recipes_count = count_author_recipes(profile.id, pool).await?;

    Ok(FolloweeView {
        profile,
        recipes,
        recipes_count,
    })
}

pub async fn fetch_subscriptions(
    follower_id: Uuid,
    recipes_limit: Option<i64>,
    offset: i64,
    pool: &Pool<Postgres>,
) -> Result<PageContext<FolloweeView>, ApiError> {
    let rows: Vec<UserRow> = sqlx::query_as(
        "
        SELECT u.id, u.email, u.username, u.first_name, u.last_name, COUNT(*) OVER() AS count
        FROM follows f
        INNER JOIN users u ON u.id = f.followee_id
        WHERE f.follower_id = $1
        ORDER BY u.username
        LIMIT $2 OFFSET $3
    ",
    )
    .bind(follower_id)
    .bind(SUBSCRIPTION_COUNT_PER_PAGE)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    let total_count = rows.get(0).map(|r| r.count).unwrap_or(0);

    let mut views = Vec::with_capacity(rows.len());
    for row in rows.into_iter() {
        let view = build_followee_view(row.profile(true), recipes_limit, pool).await?;
        views.push(view);
    }

    let page = PageContext::from_rows(views, total_count, SUBSCRIPTION_COUNT_PER_PAGE, offset);
    Ok(page)
}
