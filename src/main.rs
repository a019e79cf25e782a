use std::{env, net::SocketAddr};

use sqlx::{postgres::PgPoolOptions, Executor};
use warp::Filter;

use reseptikirja::{handlers::media_root, rejection::handle_rejection, routes::routes};

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let bind_addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| String::from("0.0.0.0:8080"))
        .parse()
        .expect("BIND_ADDR must be a valid socket address");

    let pool = PgPoolOptions::new()
        .max_connections(8)
        .connect(&database_url)
        .await
        .expect("Failed to connect to the database");

    pool.execute(include_str!("database/schema.sql"))
        .await
        .expect("Failed to apply the database schema");

    log::info!("listening on {bind_addr}");

    warp::serve(routes(pool, media_root()).recover(handle_rejection))
        .run(bind_addr)
        .await;
}
