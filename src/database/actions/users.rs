use crate::{
    authentication::{cryptography::verify_password, jwt::generate_jwt_session},
    error::{ApiError, QueryError, TypeError},
    pagination::PageContext,
    schema::{User, UserProfile, UserRow, Uuid},
    USER_COUNT_PER_PAGE,
};

use sqlx::{Pool, Postgres};

pub async fn get_user_by_email(
    pool: &Pool<Postgres>,
    email: &str,
) -> Result<Option<User>, ApiError> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(&*pool)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    Ok(row)
}

pub async fn get_user_by_id(
    pool: &Pool<Postgres>,
    user_id: Uuid,
) -> Result<Option<User>, ApiError> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&*pool)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    Ok(row)
}

/// Creates a user record; `password` must already be hashed.
/// Returns false when the email or username is already taken.
pub async fn register_user(
    email: &str,
    username: &str,
    first_name: &str,
    last_name: &str,
    password: &str,
    pool: &Pool<Postgres>,
) -> Result<bool, ApiError> {
    if email.trim().is_empty() || username.trim().is_empty() {
        return Err(TypeError::new("Email and username must not be empty").into());
    }

    let query = sqlx::query(
        "
        INSERT INTO users (email, username, first_name, last_name, password)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT DO NOTHING RETURNING *;
    ",
    )
    .bind(email)
    .bind(username)
    .bind(first_name)
    .bind(last_name)
    .bind(password)
    .execute(&*pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    Ok(query.rows_affected() > 0)
}

pub async fn login_user(
    email: &str,
    password: &str,
    pool: &Pool<Postgres>,
) -> Result<String, ApiError> {
    let user = match get_user_by_email(pool, email).await? {
        Some(user) => user,
        None => return Err(ApiError::bad_request("Invalid credentials")),
    };

    if !user.is_active {
        return Err(ApiError::bad_request("Invalid credentials"));
    }

    let authenticated = verify_password(password, &user.password)
        .map_err(|_| ApiError::internal("Failed to verify password"))?;
    if !authenticated {
        return Err(ApiError::bad_request("Invalid credentials"));
    }

    let session = generate_jwt_session(&user);

    Ok(session)
}

pub async fn fetch_users(
    offset: i64,
    pool: &Pool<Postgres>,
) -> Result<PageContext<UserRow>, ApiError> {
    let rows: Vec<UserRow> = sqlx::query_as(
        "
        SELECT u.id, u.email, u.username, u.first_name, u.last_name, COUNT(*) OVER() AS count
        FROM users u
        WHERE u.is_active
        ORDER BY u.date_joined DESC
        LIMIT $1 OFFSET $2
    ",
    )
    .bind(USER_COUNT_PER_PAGE)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    let total_count = rows.get(0).map(|r| r.count).unwrap_or(0);
    let page = PageContext::from_rows(rows, total_count, USER_COUNT_PER_PAGE, offset);
    Ok(page)
}

/// Public profile of a user, with `is_subscribed` relative to the viewer.
pub async fn get_user_profile(
    user_id: Uuid,
    viewer: Option<Uuid>,
    pool: &Pool<Postgres>,
) -> Result<Option<UserProfile>, ApiError> {
    let user = match get_user_by_id(pool, user_id).await? {
        Some(user) => user,
        None => return Ok(None),
    };

    let is_subscribed = match viewer {
        Some(viewer) => super::follows::is_following(viewer, user_id, pool).await?,
        None => false,
    };

    Ok(Some(UserProfile::new(&user, is_subscribed)))
}
