use std::fmt::{self, Display};

use warp::{http::StatusCode, reject::Rejection};

/// Structured API error carried through warp rejections and rendered
/// by `api::rejection::handle_rejection` as a JSON body.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub code: u16,
    pub info: Option<String>,
}

impl ApiError {
    pub fn new(code: u16, info: &str) -> Self {
        Self {
            code,
            info: Some(info.to_string()),
        }
    }

    pub fn bad_request(info: &str) -> Self {
        Self::new(400, info)
    }

    pub fn unauthorized() -> Self {
        Self::new(401, "Authentication required")
    }

    pub fn forbidden(info: &str) -> Self {
        Self::new(403, info)
    }

    pub fn not_found(info: &str) -> Self {
        Self::new(404, info)
    }

    pub fn conflict(info: &str) -> Self {
        Self::new(409, info)
    }

    pub fn internal(info: &str) -> Self {
        Self::new(500, info)
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.info.as_deref().unwrap_or(""))
    }
}

impl std::error::Error for ApiError {}
impl warp::reject::Reject for ApiError {}

pub struct QueryError {
    code: u16,
    info: String,
}

impl QueryError {
    pub fn new(info: String) -> Self {
        Self { code: 500, info }
    }

    fn conflict(info: String) -> Self {
        Self { code: 409, info }
    }
}

impl From<sqlx::Error> for QueryError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::Configuration(e) => Self::new(format!("{e}")),
            sqlx::Error::Database(e) => match e.kind() {
                sqlx::error::ErrorKind::UniqueViolation => Self::conflict(format!("{e}")),
                _ => Self::new(format!("{e}")),
            },
            sqlx::Error::Io(e) => Self::new(format!("{e}")),
            sqlx::Error::Tls(e) => Self::new(format!("{e}")),
            sqlx::Error::Protocol(e) => Self::new(format!("{e}")),
            sqlx::Error::RowNotFound => Self::new(format!("RowNotFound")),
            sqlx::Error::TypeNotFound { type_name } => {
                Self::new(format!("Type not found: {type_name}"))
            }
            sqlx::Error::ColumnIndexOutOfBounds { index, len } => {
                Self::new(format!("Column index out of bounds {index} ({len})"))
            }
            sqlx::Error::ColumnNotFound(e) => Self::new(format!("{e}")),
            sqlx::Error::ColumnDecode { index, source } => {
                Self::new(format!("Column decode {index} ({source})"))
            }
            sqlx::Error::Decode(e) => Self::new(format!("{e}")),
            sqlx::Error::AnyDriverError(e) => Self::new(format!("{e}")),
            sqlx::Error::PoolTimedOut => Self::new(format!("Pool timed out")),
            sqlx::Error::PoolClosed => Self::new(format!("Pool closed")),
            sqlx::Error::WorkerCrashed => Self::new(format!("Worker crashed")),
            sqlx::Error::Migrate(e) => Self::new(format!("{e}")),
            _ => Self::new(format!("Unknown error")),
        }
    }
}

impl Into<ApiError> for QueryError {
    fn into(self) -> ApiError {
        ApiError {
            code: self.code,
            info: Some(self.info),
        }
    }
}

#[derive(Debug)]
pub struct TypeError {
    info: String,
}

impl TypeError {
    pub fn new(info: &str) -> Self {
        Self {
            info: info.to_string(),
        }
    }
}

impl Into<ApiError> for TypeError {
    fn into(self) -> ApiError {
        ApiError::bad_request(&self.info)
    }
}

impl Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.info)
    }
}

impl std::error::Error for TypeError {}
impl Into<Rejection> for TypeError {
    fn into(self) -> Rejection {
        let e: ApiError = self.into();
        warp::reject::custom(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_status_maps_known_codes() {
        assert_eq!(ApiError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::unauthorized().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::conflict("x").status(), StatusCode::CONFLICT);
    }

    #[test]
    fn type_error_converts_to_bad_request() {
        let e: ApiError = TypeError::new("invalid filter").into();
        assert_eq!(e.code, 400);
        assert_eq!(e.info.as_deref(), Some("invalid filter"));
    }
}
