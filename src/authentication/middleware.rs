use std::convert::Infallible;

use sqlx::{Pool, Postgres};
use warp::{reject::Rejection, Filter};

use crate::constants::SESSION_COOKIE;
use crate::database::error::ApiError;

use super::jwt::{verify_jwt_session, SessionData};

/// Requires a valid session cookie; rejects with 401 otherwise.
pub fn with_session() -> impl Filter<Extract = (SessionData,), Error = Rejection> + Copy {
    warp::cookie::optional::<String>(SESSION_COOKIE).and_then(
        |session: Option<String>| async move {
            match session {
                Some(token) => match verify_jwt_session(token) {
                    Ok(data) => Ok(data.into()),
                    Err(e) => Err(warp::reject::custom(e)),
                },
                None => Err(warp::reject::custom(ApiError::unauthorized())),
            }
        },
    )
}

/// Extracts the session when present, `None` for anonymous callers.
pub fn with_possible_session(
) -> impl Filter<Extract = (Option<SessionData>,), Error = Infallible> + Copy {
    warp::cookie::optional::<String>(SESSION_COOKIE).map(|session: Option<String>| {
        session
            .and_then(|token| verify_jwt_session(token).ok())
            .map(Into::into)
    })
}

pub fn with_pool(
    pool: Pool<Postgres>,
) -> impl Filter<Extract = (Pool<Postgres>,), Error = Infallible> + Clone {
    warp::any().map(move || pool.clone())
}
