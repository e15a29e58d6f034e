use sqlx::SqlitePool;

use crate::services::DescriptionGenerator;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub generator: DescriptionGenerator,
}
