use std::path::PathBuf;

use serde::de::DeserializeOwned;
use sqlx::{Pool, Postgres};
use warp::{reject::Rejection, Filter, Reply};

use crate::middleware::{with_pool, with_possible_session, with_session};
use crate::schema::{IngredientQuery, PageQuery, SubscriptionQuery};

use super::handlers;

const BODY_LIMIT: u64 = 16 * 1024 * 1024;

fn json_body<T: DeserializeOwned + Send>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
{
    warp::body::content_length_limit(BODY_LIMIT).and(warp::body::json())
}

/// Raw query string, defaulting to empty so that listing endpoints
/// accept requests without any parameters.
fn raw_query() -> impl Filter<Extract = (String,), Error = Rejection> + Clone {
    warp::query::raw().or_else(|_| async { Ok::<(String,), Rejection>((String::new(),)) })
}

/// The full application: `/api/...` plus the `/media` file tree.
pub fn routes(
    pool: Pool<Postgres>,
    media_root: PathBuf,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let api = user_routes(pool.clone())
        .or(recipe_routes(pool.clone()))
        .or(catalog_routes(pool));
    let media = warp::path("media").and(warp::fs::dir(media_root));

    warp::path("api")
        .and(api)
        .or(media)
        .with(warp::log("reseptikirja"))
}

fn user_routes(
    pool: Pool<Postgres>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let register = warp::path!("users")
        .and(warp::post())
        .and(json_body())
        .and(with_pool(pool.clone()))
        .and_then(handlers::users::register);

    let list = warp::path!("users")
        .and(warp::get())
        .and(warp::query::<PageQuery>())
        .and(with_pool(pool.clone()))
        .and_then(handlers::users::list_users);

    let me = warp::path!("users" / "me")
        .and(warp::get())
        .and(with_session())
        .and(with_pool(pool.clone()))
        .and_then(handlers::users::me);

    let subscriptions = warp::path!("users" / "subscriptions")
        .and(warp::get())
        .and(with_session())
        .and(warp::query::<SubscriptionQuery>())
        .and(with_pool(pool.clone()))
        .and_then(handlers::users::subscriptions);

    let subscribe = warp::path!("users" / i32 / "subscribe")
        .and(warp::post())
        .and(with_session())
        .and(with_pool(pool.clone()))
        .and_then(handlers::users::subscribe);

    let unsubscribe = warp::path!("users" / i32 / "subscribe")
        .and(warp::delete())
        .and(with_session())
        .and(with_pool(pool.clone()))
        .and_then(handlers::users::unsubscribe);

    let get = warp::path!("users" / i32)
        .and(warp::get())
        .and(with_possible_session())
        .and(with_pool(pool.clone()))
        .and_then(handlers::users::get_user);

    let login = warp::path!("auth" / "login")
        .and(warp::post())
        .and(json_body())
        .and(with_pool(pool))
        .and_then(handlers::users::login);

    let logout = warp::path!("auth" / "logout")
        .and(warp::post())
        .and_then(handlers::users::logout);

    register
        .or(list)
        .or(me)
        .or(subscriptions)
        .or(subscribe)
        .or(unsubscribe)
        .or(get)
        .or(login)
        .or(logout)
}

fn recipe_routes(
    pool: Pool<Postgres>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let download = warp::path!("recipes" / "download_shopping_cart")
        .and(warp::get())
        .and(with_session())
        .and(with_pool(pool.clone()))
        .and_then(handlers::recipes::download_shopping_cart);

    let list = warp::path!("recipes")
        .and(warp::get())
        .and(raw_query())
        .and(with_possible_session())
        .and(with_pool(pool.clone()))
        .and_then(handlers::recipes::list_recipes);

    let create = warp::path!("recipes")
        .and(warp::post())
        .and(with_session())
        .and(json_body())
        .and(with_pool(pool.clone()))
        .and_then(handlers::recipes::create_recipe);

    let get = warp::path!("recipes" / i32)
        .and(warp::get())
        .and(with_possible_session())
        .and(with_pool(pool.clone()))
        .and_then(handlers::recipes::get_recipe);

    let update = warp::path!("recipes" / i32)
        .and(warp::patch())
        .and(with_session())
        .and(json_body())
        .and(with_pool(pool.clone()))
        .and_then(handlers::recipes::update_recipe);

    let delete = warp::path!("recipes" / i32)
        .and(warp::delete())
        .and(with_session())
        .and(with_pool(pool.clone()))
        .and_then(handlers::recipes::delete_recipe);

    let favorite = warp::path!("recipes" / i32 / "favorite")
        .and(warp::post())
        .and(with_session())
        .and(with_pool(pool.clone()))
        .and_then(handlers::recipes::favorite);

    let unfavorite = warp::path!("recipes" / i32 / "favorite")
        .and(warp::delete())
        .and(with_session())
        .and(with_pool(pool.clone()))
        .and_then(handlers::recipes::unfavorite);

    let cart_add = warp::path!("recipes" / i32 / "shopping_cart")
        .and(warp::post())
        .and(with_session())
        .and(with_pool(pool.clone()))
        .and_then(handlers::recipes::shopping_cart_add);

    let cart_remove = warp::path!("recipes" / i32 / "shopping_cart")
        .and(warp::delete())
        .and(with_session())
        .and(with_pool(pool))
        .and_then(handlers::recipes::shopping_cart_remove);

    download
        .or(list)
        .or(create)
        .or(favorite)
        .or(unfavorite)
        .or(cart_add)
        .or(cart_remove)
        .or(get)
        .or(update)
        .or(delete)
}

fn catalog_routes(
    pool: Pool<Postgres>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let list_tags = warp::path!("tags")
        .and(warp::get())
        .and(with_pool(pool.clone()))
        .and_then(handlers::catalog::list_tags);

    let get_tag = warp::path!("tags" / i32)
        .and(warp::get())
        .and(with_pool(pool.clone()))
        .and_then(handlers::catalog::get_tag);

    let create_tag = warp::path!("tags")
        .and(warp::post())
        .and(with_session())
        .and(json_body())
        .and(with_pool(pool.clone()))
        .and_then(handlers::catalog::create_tag);

    let update_tag = warp::path!("tags" / i32)
        .and(warp::patch())
        .and(with_session())
        .and(json_body())
        .and(with_pool(pool.clone()))
        .and_then(handlers::catalog::update_tag);

    let delete_tag = warp::path!("tags" / i32)
        .and(warp::delete())
        .and(with_session())
        .and(with_pool(pool.clone()))
        .and_then(handlers::catalog::delete_tag);

    let list_ingredients = warp::path!("ingredients")
        .and(warp::get())
        .and(warp::query::<IngredientQuery>())
        .and(with_pool(pool.clone()))
        .and_then(handlers::catalog::list_ingredients);

    let get_ingredient = warp::path!("ingredients" / i32)
        .and(warp::get())
        .and(with_pool(pool.clone()))
        .and_then(handlers::catalog::get_ingredient);

    let create_ingredient = warp::path!("ingredients")
        .and(warp::post())
        .and(with_session())
        .and(json_body())
        .and(with_pool(pool.clone()))
        .and_then(handlers::catalog::create_ingredient);

    let update_ingredient = warp::path!("ingredients" / i32)
        .and(warp::patch())
        .and(with_session())
        .and(json_body())
        .and(with_pool(pool.clone()))
        .and_then(handlers::catalog::update_ingredient);

    let delete_ingredient = warp::path!("ingredients" / i32)
        .and(warp::delete())
        .and(with_session())
        .and(with_pool(pool))
        .and_then(handlers::catalog::delete_ingredient);

    list_tags
        .or(create_tag)
        .or(get_tag)
        .or(update_tag)
        .or(delete_tag)
        .or(list_ingredients)
        .or(create_ingredient)
        .or(get_ingredient)
        .or(update_ingredient)
        .or(delete_ingredient)
}
