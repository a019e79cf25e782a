use crate::{
    authentication::permissions::ActionType,
    error::{ApiError, QueryError},
    jwt::SessionData,
    pagination::PageContext,
    schema::{
        Recipe, RecipeIngredientRow, RecipeListQuery, RecipePayload, RecipeRow, Uuid,
    },
    RECIPE_COUNT_PER_PAGE,
};

use sqlx::{Pool, Postgres, QueryBuilder};

use super::tags::ensure_tags_exist;

/// Paginated recipe listing, newest first. Flag filters are relative to
/// the viewer; for anonymous callers "1" matches nothing and "0" matches
/// everything.
pub async fn fetch_recipes(
    query: &RecipeListQuery,
    viewer: Option<Uuid>,
    pool: &Pool<Postgres>,
) -> Result<PageContext<RecipeRow>, ApiError> {
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT r.*, COUNT(*) OVER() AS count FROM recipes r WHERE TRUE");

    if let Some(author) = query.author {
        builder.push(" AND r.author_id = ");
        builder.push_bind(author);
    }

    if !query.tags.is_empty() {
        builder.push(
            " AND r.id IN (
                SELECT rt.recipe_id FROM recipe_tags rt
                INNER JOIN tags t ON t.id = rt.tag_id
                WHERE t.slug = ANY(",
        );
        builder.push_bind(query.tags.clone());
        builder.push("))");
    }

    if let Some(flag) = query.is_favorited {
        push_membership_filter(&mut builder, "bookmarks", flag.is_set(), viewer);
    }

    if let Some(flag) = query.is_in_shopping_cart {
        push_membership_filter(&mut builder, "shopping_list", flag.is_set(), viewer);
    }

    builder.push(" ORDER BY r.pub_date DESC LIMIT ");
    builder.push_bind(RECIPE_COUNT_PER_PAGE);
    builder.push(" OFFSET ");
    builder.push_bind(query.offset);

    let rows: Vec<RecipeRow> = builder
        .build_query_as()
        .fetch_all(pool)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    let total_count = rows.get(0).map(|r| r.count).unwrap_or(0);
    let page = PageContext::from_rows(rows, total_count, RECIPE_COUNT_PER_PAGE, query.offset);
    Ok(page)
}

fn push_membership_filter(
    builder: &mut QueryBuilder<Postgres>,
    table: &str,
    wanted: bool,
    viewer: Option<Uuid>,
) {
    match (wanted, viewer) {
        (true, Some(user_id)) => {
            builder.push(format!(
                " AND r.id IN (SELECT m.recipe_id FROM {table} m WHERE m.user_id = "
            ));
            builder.push_bind(user_id);
            builder.push(")");
        }
        (false, Some(user_id)) => {
            builder.push(format!(
                " AND r.id NOT IN (SELECT m.recipe_id FROM {table} m WHERE m.user_id = "
            ));
            builder.push_bind(user_id);
            builder.push(")");
        }
        (true, None) => {
            builder.push(" AND FALSE");
        }
        (false, None) => {}
    }
}

pub async fn get_recipe(id: Uuid, pool: &Pool<Postgres>) -> Result<Option<Recipe>, ApiError> {
    let row: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = $1")
        .bind(id)
        .fetch_optional(&*pool)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    Ok(row)
}

/// Loads a recipe for mutation, enforcing the own-or-admin rule.
pub async fn get_recipe_mut(
    id: Uuid,
    session: &SessionData,
    pool: &Pool<Postgres>,
) -> Result<Recipe, ApiError> {
    let recipe = get_recipe(id, pool).await?;
    session.authenticate(ActionType::ManageOwnRecipes)?;

    match recipe {
        Some(recipe) => match session.authenticate(ActionType::ManageAllRecipes) {
            Ok(_) => Ok(recipe),
            Err(_) => {
                if recipe.author_id != session.user_id {
                    Err(ApiError::forbidden("You are not the author of this recipe"))
                } else {
                    Ok(recipe)
                }
            }
        },
        None => Err(ApiError::not_found("No recipe exists with specified id")),
    }
}

/// Inserts a recipe together with its ingredient rows and tag links in
/// one transaction. The payload must be validated beforehand.
pub async fn create_recipe(
    payload: &RecipePayload,
    author_id: Uuid,
    image: Option<String>,
    pool: &Pool<Postgres>,
) -> Result<Uuid, ApiError> {
    ensure_tags_exist(&payload.tags, pool).await?;

    let mut tr = pool
        .begin()
        .await
        .map_err(|_| ApiError::internal("Could not start transaction"))?;

    let id: (Uuid,) = sqlx::query_as(
        "
        INSERT INTO recipes (author_id, name, text, image, cooking_time)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
    ",
    )
    .bind(author_id)
    .bind(&payload.name)
    .bind(&payload.text)
    .bind(&image)
    .bind(payload.cooking_time)
    .fetch_one(&mut *tr)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    for ingredient in payload.ingredients.iter() {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES ($1, $2, $3)",
        )
        .bind(id.0)
        .bind(ingredient.id)
        .bind(ingredient.amount)
        .execute(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;
    }

    for tag_id in payload.tags.iter() {
        sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES ($1, $2)")
            .bind(id.0)
            .bind(tag_id)
            .execute(&mut *tr)
            .await
            .map_err(|e| QueryError::from(e).into())?;
    }

    tr.commit()
        .await
        .map_err(|_| ApiError::internal("Could not commit transaction"))?;

    Ok(id.0)
}

/// Full-replace update: the old ingredient rows and tag links are
/// deleted and the payload's set is inserted, all in one transaction.
/// `image` of `None` keeps the stored image.
pub async fn update_recipe(
    recipe_id: Uuid,
    payload: &RecipePayload,
    image: Option<String>,
    pool: &Pool<Postgres>,
) -> Result<(), ApiError> {
    ensure_tags_exist(&payload.tags, pool).await?;

    let mut tr = pool
        .begin()
        .await
        .map_err(|_| ApiError::internal("Could not start transaction"))?;

    sqlx::query(
        "
        UPDATE recipes
        SET name = $1, text = $2, cooking_time = $3, image = COALESCE($4, image)
        WHERE id = $5
    ",
    )
    .bind(&payload.name)
    .bind(&payload.text)
    .bind(payload.cooking_time)
    .bind(&image)
    .bind(recipe_id)
    .execute(&mut *tr)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    for ingredient in payload.ingredients.iter() {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES ($1, $2, $3)",
        )
        .bind(recipe_id)
        .bind(ingredient.id)
        .bind(ingredient.amount)
        .execute(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;
    }

    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    for tag_id in payload.tags.iter() {
        sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES ($1, $2)")
            .bind(recipe_id)
            .bind(tag_id)
            .execute(&mut *tr)
            .await
            .map_err(|e| QueryError::from(e).into())?;
    }

    tr.commit()
        .await
        .map_err(|_| ApiError::internal("Could not commit transaction"))?;

    Ok(())
}

/// Deletes a recipe and everything hanging off it.
pub async fn delete_recipe(id: Uuid, pool: &Pool<Postgres>) -> Result<(), ApiError> {
    let mut tr = pool
        .begin()
        .await
        .map_err(|_| ApiError::internal("Could not start transaction"))?;

    sqlx::query("DELETE FROM bookmarks WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    sqlx::query("DELETE FROM shopping_list WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    tr.commit()
        .await
        .map_err(|_| ApiError::internal("Could not commit transaction"))?;
    Ok(())
}

pub async fn list_recipe_ingredients(
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Vec<RecipeIngredientRow>, ApiError> {
    let rows: Vec<RecipeIngredientRow> = sqlx::query_as(
        "
        SELECT i.id AS id, i.name AS name, i.measurement_unit AS measurement_unit, ri.amount AS amount
        FROM recipe_ingredients ri
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = $1
        ORDER BY i.name
    ",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    Ok(rows)
}

/// Most recent recipes of one author, optionally capped. A NULL limit
/// means no cap in Postgres.
pub async fn fetch_author_recipes(
    author_id: Uuid,
    limit: Option<i64>,
    pool: &Pool<Postgres>,
) -> Result<Vec<Recipe>, ApiError> {
    let rows: Vec<Recipe> = sqlx::query_as(
        "SELECT * FROM recipes WHERE author_id = $1 ORDER BY pub_date DESC LIMIT $2",
    )
    .bind(author_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    Ok(rows)
}

pub async fn count_author_recipes(
    author_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<i64, ApiError> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
        .bind(author_id)
        .fetch_one(pool)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    Ok(count.0)
}
