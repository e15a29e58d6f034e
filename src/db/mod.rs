pub mod repository;

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let mut options = SqlitePoolOptions::new().max_connections(5);

    // An in-memory database lives and dies with its single connection.
    if database_url.contains(":memory:") {
        options = options
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = options.connect(database_url).await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
