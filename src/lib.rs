pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod openai;
pub mod services;
pub mod state;
pub mod validation;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::openai::OpenAiHttpClient;
use crate::services::DescriptionGenerator;
use crate::state::AppState;

/// Connects the database and wires the description generator from config.
pub async fn build_state(config: &AppConfig) -> Result<AppState, Box<dyn std::error::Error>> {
    let db = db::connect(&config.database_url).await?;

    let generator = match &config.openai {
        Some(openai) => {
            let client = OpenAiHttpClient::new(openai.clone())?;
            let model = client.model().to_string();
            DescriptionGenerator::new(Arc::new(client), model)
        }
        None => {
            tracing::warn!("OPENAI_API_KEY is not set; description generation is disabled");
            DescriptionGenerator::uninitialized()
        }
    };

    Ok(AppState { db, generator })
}
