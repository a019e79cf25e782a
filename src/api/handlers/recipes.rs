use sqlx::{Pool, Postgres};
use warp::{http::Response, http::StatusCode, reject::Rejection, reply, Reply};

use crate::{
    actions,
    actions::memberships::MembershipKind,
    error::{ApiError, TypeError},
    jwt::SessionData,
    pagination::PageContext,
    permissions::ActionType,
    schema::{Recipe, RecipeListQuery, RecipeMinified, RecipePayload, RecipeView, Uuid},
    SHOPLIST_FILENAME,
};

use super::{media_root, reject, store_recipe_image};

/// Assembles the full recipe representation for one viewer.
async fn build_recipe_view(
    recipe: Recipe,
    viewer: Option<Uuid>,
    pool: &Pool<Postgres>,
) -> Result<RecipeView, ApiError> {
    let tags = actions::list_recipe_tags(recipe.id, pool).await?;
    let ingredients = actions::list_recipe_ingredients(recipe.id, pool).await?;
    let author = actions::get_user_profile(recipe.author_id, viewer, pool)
        .await?
        .ok_or_else(|| ApiError::internal("Recipe author is missing"))?;

    let (is_favorited, is_in_shopping_cart) = match viewer {
        Some(user_id) => (
            actions::has_membership(MembershipKind::Bookmark, user_id, recipe.id, pool).await?,
            actions::has_membership(MembershipKind::ShoppingList, user_id, recipe.id, pool)
                .await?,
        ),
        None => (false, false),
    };

    Ok(RecipeView {
        id: recipe.id,
        tags,
        author,
        ingredients,
        is_favorited,
        is_in_shopping_cart,
        image: recipe.image_url(),
        name: recipe.name,
        text: recipe.text,
        cooking_time: recipe.cooking_time,
    })
}

pub async fn list_recipes(
    raw_query: String,
    session: Option<SessionData>,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(&raw_query)
        .map_err(|_| -> Rejection { TypeError::new("Invalid query string").into() })?;
    let query = RecipeListQuery::from_pairs(&pairs)
        .map_err(|e| -> Rejection { e.into() })?;

    let viewer = session.map(|s| s.user_id);
    let page = actions::fetch_recipes(&query, viewer, &pool)
        .await
        .map_err(reject)?;

    let mut views = Vec::with_capacity(page.rows.len());
    for row in page.rows.into_iter() {
        let view = build_recipe_view(Recipe::from(row), viewer, &pool)
            .await
            .map_err(reject)?;
        views.push(view);
    }

    Ok(reply::json(&PageContext {
        rows: views,
        total_rows: page.total_rows,
        next_offset: page.next_offset,
        prev_offset: page.prev_offset,
    }))
}

pub async fn get_recipe(
    id: Uuid,
    session: Option<SessionData>,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    let recipe = actions::get_recipe(id, &pool)
        .await
        .map_err(reject)?
        .ok_or_else(|| reject(ApiError::not_found("No recipe exists with specified id")))?;

    let view = build_recipe_view(recipe, session.map(|s| s.user_id), &pool)
        .await
        .map_err(reject)?;

    Ok(reply::json(&view))
}

pub async fn create_recipe(
    session: SessionData,
    payload: RecipePayload,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    session
        .authenticate(ActionType::CreateRecipes)
        .map_err(reject)?;
    payload
        .validate()
        .map_err(|e| -> Rejection { e.into() })?;

    let image = match payload.image.as_deref() {
        Some(data_uri) => Some(
            store_recipe_image(data_uri, &media_root())
                .await
                .map_err(reject)?,
        ),
        None => None,
    };

    let id = actions::create_recipe(&payload, session.user_id, image, &pool)
        .await
        .map_err(reject)?;

    let recipe = actions::get_recipe(id, &pool)
        .await
        .map_err(reject)?
        .ok_or_else(|| reject(ApiError::internal("Created recipe is missing")))?;
    let view = build_recipe_view(recipe, Some(session.user_id), &pool)
        .await
        .map_err(reject)?;

    Ok(reply::with_status(reply::json(&view), StatusCode::CREATED))
}

pub async fn update_recipe(
    id: Uuid,
    session: SessionData,
    payload: RecipePayload,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    let recipe = actions::get_recipe_mut(id, &session, &pool)
        .await
        .map_err(reject)?;
    payload
        .validate()
        .map_err(|e| -> Rejection { e.into() })?;

    let image = match payload.image.as_deref() {
        Some(data_uri) => Some(
            store_recipe_image(data_uri, &media_root())
                .await
                .map_err(reject)?,
        ),
        None => None,
    };

    actions::update_recipe(recipe.id, &payload, image, &pool)
        .await
        .map_err(reject)?;

    let updated = actions::get_recipe(recipe.id, &pool)
        .await
        .map_err(reject)?
        .ok_or_else(|| reject(ApiError::internal("Updated recipe is missing")))?;
    let view = build_recipe_view(updated, Some(session.user_id), &pool)
        .await
        .map_err(reject)?;

    Ok(reply::json(&view))
}

pub async fn delete_recipe(
    id: Uuid,
    session: SessionData,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    let recipe = actions::get_recipe_mut(id, &session, &pool)
        .await
        .map_err(reject)?;

    actions::delete_recipe(recipe.id, &pool)
        .await
        .map_err(reject)?;

    Ok(reply::with_status(warp::reply(), StatusCode::NO_CONTENT))
}

async fn add_to_list(
    kind: MembershipKind,
    id: Uuid,
    session: SessionData,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    session
        .authenticate(ActionType::ManageOwnLists)
        .map_err(reject)?;

    let recipe = actions::get_recipe(id, &pool)
        .await
        .map_err(reject)?
        .ok_or_else(|| reject(ApiError::not_found("No recipe exists with specified id")))?;

    actions::add_membership(kind, session.user_id, recipe.id, &pool)
        .await
        .map_err(reject)?;

    Ok(reply::with_status(
        reply::json(&RecipeMinified::from(recipe)),
        StatusCode::CREATED,
    ))
}

async fn remove_from_list(
    kind: MembershipKind,
    id: Uuid,
    session: SessionData,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    session
        .authenticate(ActionType::ManageOwnLists)
        .map_err(reject)?;

    actions::remove_membership(kind, session.user_id, id, &pool)
        .await
        .map_err(reject)?;

    Ok(reply::with_status(warp::reply(), StatusCode::NO_CONTENT))
}

pub async fn favorite(
    id: Uuid,
    session: SessionData,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    add_to_list(MembershipKind::Bookmark, id, session, pool).await
}

pub async fn unfavorite(
    id: Uuid,
    session: SessionData,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    remove_from_list(MembershipKind::Bookmark, id, session, pool).await
}

pub async fn shopping_cart_add(
    id: Uuid,
    session: SessionData,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    add_to_list(MembershipKind::ShoppingList, id, session, pool).await
}

pub async fn shopping_cart_remove(
    id: Uuid,
    session: SessionData,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    remove_from_list(MembershipKind::ShoppingList, id, session, pool).await
}

pub async fn download_shopping_cart(
    session: SessionData,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    session
        .authenticate(ActionType::ManageOwnLists)
        .map_err(reject)?;

    let rows = actions::aggregate_shopping_list(session.user_id, &pool)
        .await
        .map_err(reject)?;
    let body = actions::format_shopping_list(&rows);

    Response::builder()
        .status(StatusCode::OK)
        .header("content-type", "text/plain; charset=utf-8")
        .header(
            "content-disposition",
            format!("attachment; filename=\"{SHOPLIST_FILENAME}\""),
        )
        .body(body)
        .map_err(|_| reject(ApiError::internal("Failed to build response")))
}
