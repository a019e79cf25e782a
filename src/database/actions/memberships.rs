use crate::{
    error::{ApiError, QueryError},
    schema::Uuid,
};

use sqlx::{Pool, Postgres};

/// The two per-user recipe sets share one toggle shape: a unique
/// (user, recipe) row that is either present or absent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MembershipKind {
    Bookmark,
    ShoppingList,
}

impl MembershipKind {
    pub fn table(&self) -> &'static str {
        match self {
            Self::Bookmark => "bookmarks",
            Self::ShoppingList => "shopping_list",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Bookmark => "favorites",
            Self::ShoppingList => "shopping cart",
        }
    }
}

/// Adding an already-present pair is a conflict, not a no-op.
pub async fn add_membership(
    kind: MembershipKind,
    user_id: Uuid,
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<(), ApiError> {
    let table = kind.table();
    let result = sqlx::query(&format!(
        "INSERT INTO {table} (user_id, recipe_id) VALUES ($1, $2) ON CONFLICT DO NOTHING RETURNING *;"
    ))
    .bind(user_id)
    .bind(recipe_id)
    .execute(pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    if result.rows_affected() <= 0 {
        return Err(ApiError::conflict(&format!(
            "Recipe is already in {}",
            kind.label()
        )));
    }

    Ok(())
}

pub async fn remove_membership(
    kind: MembershipKind,
    user_id: Uuid,
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<(), ApiError> {
    let table = kind.table();
    let result = sqlx::query(&format!(
        "DELETE FROM {table} WHERE user_id = $1 AND recipe_id = $2"
    ))
    .bind(user_id)
    .bind(recipe_id)
    .execute(pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    if result.rows_affected() <= 0 {
        return Err(ApiError::not_found(&format!(
            "Recipe is not in {}",
            kind.label()
        )));
    }

    Ok(())
}

pub async fn has_membership(
    kind: MembershipKind,
    user_id: Uuid,
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<bool, ApiError> {
    let table = kind.table();
    let result: Option<(Uuid,)> = sqlx::query_as(&format!(
        "SELECT recipe_id FROM {table} WHERE user_id = $1 AND recipe_id = $2"
    ))
    .bind(user_id)
    .bind(recipe_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    Ok(result.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_their_tables() {
        assert_eq!(MembershipKind::Bookmark.table(), "bookmarks");
        assert_eq!(MembershipKind::ShoppingList.table(), "shopping_list");
    }
}
