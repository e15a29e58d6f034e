use axum::Json;
use axum::extract::Path;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde_json::Value;
use tracing::info;

use crate::db::repository;
use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;
use crate::validation::{validate_create, validate_update};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/generate-description", post(generate_description))
}

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest("Invalid task ID".to_string()))
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, AppError> {
    let tasks = repository::fetch_tasks(&state.db)
        .await
        .map_err(AppError::store("Failed to fetch tasks"))?;
    Ok(Json(tasks))
}

async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let req = validate_create(json_body(body)?).map_err(AppError::Validation)?;
    let task = repository::insert_task(&state.db, req)
        .await
        .map_err(AppError::store("Failed to create task"))?;
    info!("created task {}", task.id);
    Ok((StatusCode::CREATED, Json(task)))
}

async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, AppError> {
    let id = parse_id(&id)?;
    let task = repository::find_task_by_id(&state.db, id)
        .await
        .map_err(AppError::store("Failed to fetch task"))?
        .ok_or(AppError::NotFound)?;
    Ok(Json(task))
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Task>, AppError> {
    let id = parse_id(&id)?;
    let patch = validate_update(json_body(body)?).map_err(AppError::Validation)?;
    let task = repository::update_task(&state.db, id, patch)
        .await
        .map_err(AppError::store("Failed to update task"))?
        .ok_or(AppError::NotFound)?;
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    let ok = repository::delete_task(&state.db, id)
        .await
        .map_err(AppError::store("Failed to delete task"))?;
    if ok {
        info!("deleted task {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn generate_description(
    State(state): State<AppState>,
    body: Result<Json<GenerateDescriptionRequest>, JsonRejection>,
) -> Result<Json<GenerateDescriptionResponse>, AppError> {
    if !state.generator.is_initialized() {
        return Err(AppError::NotConfigured);
    }

    let req = match body {
        Ok(Json(req)) if !req.title.is_empty() => req,
        _ => return Err(AppError::BadRequest("Invalid request data".to_string())),
    };

    let description = state.generator.generate(&req.title).await?;
    Ok(Json(GenerateDescriptionResponse { description }))
}
