use sqlx::{Pool, Postgres};
use warp::{http::StatusCode, reject::Rejection, reply, Reply};

use crate::{
    actions,
    cryptography::hash_password,
    error::ApiError,
    jwt::SessionData,
    permissions::ActionType,
    schema::{LoginPayload, PageQuery, RegisterPayload, SubscriptionQuery, UserProfile, Uuid},
    SESSION_COOKIE,
};

use super::reject;

pub async fn register(
    payload: RegisterPayload,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    if payload.password.trim().is_empty() {
        return Err(reject(ApiError::bad_request("Password must not be empty")));
    }

    let hashed = hash_password(&payload.password)
        .map_err(|_| reject(ApiError::internal("Failed to hash password")))?;

    let created = actions::register_user(
        &payload.email,
        &payload.username,
        &payload.first_name,
        &payload.last_name,
        &hashed,
        &pool,
    )
    .await
    .map_err(reject)?;

    if !created {
        return Err(reject(ApiError::conflict(
            "Email or username is already taken",
        )));
    }

    let user = actions::get_user_by_email(&pool, &payload.email)
        .await
        .map_err(reject)?
        .ok_or_else(|| reject(ApiError::internal("Created user is missing")))?;

    Ok(reply::with_status(
        reply::json(&UserProfile::new(&user, false)),
        StatusCode::CREATED,
    ))
}

pub async fn login(payload: LoginPayload, pool: Pool<Postgres>) -> Result<impl Reply, Rejection> {
    let token = actions::login_user(&payload.email, &payload.password, &pool)
        .await
        .map_err(reject)?;

    let cookie = format!("{SESSION_COOKIE}={token}; HttpOnly; Path=/");
    let body = reply::json(&serde_json::json!({ "detail": "Logged in" }));
    Ok(reply::with_header(body, "set-cookie", cookie))
}

pub async fn logout() -> Result<impl Reply, Rejection> {
    let cookie = format!("{SESSION_COOKIE}=; HttpOnly; Path=/; Max-Age=0");
    let body = reply::json(&serde_json::json!({ "detail": "Logged out" }));
    Ok(reply::with_header(body, "set-cookie", cookie))
}

pub async fn list_users(query: PageQuery, pool: Pool<Postgres>) -> Result<impl Reply, Rejection> {
    let page = actions::fetch_users(query.offset.unwrap_or(0).max(0), &pool)
        .await
        .map_err(reject)?;

    Ok(reply::json(&page))
}

pub async fn me(session: SessionData, pool: Pool<Postgres>) -> Result<impl Reply, Rejection> {
    let profile = actions::get_user_profile(session.user_id, Some(session.user_id), &pool)
        .await
        .map_err(reject)?
        .ok_or_else(|| reject(ApiError::not_found("No user exists with specified id")))?;

    Ok(reply::json(&profile))
}

pub async fn get_user(
    id: Uuid,
    session: Option<SessionData>,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    let viewer = session.map(|s| s.user_id);
    let profile = actions::get_user_profile(id, viewer, &pool)
        .await
        .map_err(reject)?
        .ok_or_else(|| reject(ApiError::not_found("No user exists with specified id")))?;

    Ok(reply::json(&profile))
}

pub async fn subscribe(
    id: Uuid,
    session: SessionData,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    session
        .authenticate(ActionType::ManageOwnSubscriptions)
        .map_err(reject)?;

    let mut profile = actions::get_user_profile(id, Some(session.user_id), &pool)
        .await
        .map_err(reject)?
        .ok_or_else(|| reject(ApiError::not_found("No user exists with specified id")))?;

    actions::subscribe(session.user_id, id, &pool)
        .await
        .map_err(reject)?;
    profile.is_subscribed = true;

    let view = actions::build_followee_view(profile, None, &pool)
        .await
        .map_err(reject)?;

    Ok(reply::with_status(reply::json(&view), StatusCode::CREATED))
}

pub async fn unsubscribe(
    id: Uuid,
    session: SessionData,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    session
        .authenticate(ActionType::ManageOwnSubscriptions)
        .map_err(reject)?;

    actions::unsubscribe(session.user_id, id, &pool)
        .await
        .map_err(reject)?;

    Ok(reply::with_status(warp::reply(), StatusCode::NO_CONTENT))
}

pub async fn subscriptions(
    session: SessionData,
    query: SubscriptionQuery,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    session
        .authenticate(ActionType::ManageOwnSubscriptions)
        .map_err(reject)?;

    let page = actions::fetch_subscriptions(
        session.user_id,
        query.recipes_limit,
        query.offset.unwrap_or(0).max(0),
        &pool,
    )
    .await
    .map_err(reject)?;

    Ok(reply::json(&page))
}
