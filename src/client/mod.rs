use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{GenerateDescriptionRequest, GenerateDescriptionResponse, Priority, Task};

pub const DEFAULT_BASE_URL: &str = "http://localhost:4321";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message} (status {status})")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskData {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    /// Local `YYYY-MM-DDTHH:MM`; the server pins it to UTC+4.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

/// Fields left as `None` are not sent. `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdateData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Typed client for the task HTTP API.
#[derive(Clone, Debug)]
pub struct TaskApiClient {
    client: Client,
    base_url: String,
}

impl Default for TaskApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl TaskApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    pub async fn create_task(&self, data: &CreateTaskData) -> Result<Task, ClientError> {
        let response = self.client.post(self.url("/tasks")).json(data).send().await?;
        let response = ensure_success(response, "Failed to create task").await?;
        Ok(response.json().await?)
    }

    pub async fn get_tasks(&self) -> Result<Vec<Task>, ClientError> {
        let response = self.client.get(self.url("/tasks")).send().await?;
        let response = ensure_success(response, "Failed to fetch tasks").await?;
        Ok(response.json().await?)
    }

    pub async fn get_task(&self, id: i64) -> Result<Task, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/tasks/{}", id)))
            .send()
            .await?;
        let response = ensure_success(response, "Failed to fetch task").await?;
        Ok(response.json().await?)
    }

    pub async fn update_task(&self, id: i64, data: &TaskUpdateData) -> Result<Task, ClientError> {
        let response = self
            .client
            .put(self.url(&format!("/tasks/{}", id)))
            .json(data)
            .send()
            .await?;
        let response = ensure_success(response, "Failed to update task").await?;
        Ok(response.json().await?)
    }

    /// Flips `completed` based on the task's current server-side state.
    pub async fn toggle_task_status(&self, id: i64) -> Result<Task, ClientError> {
        let current = self.get_task(id).await?;
        let data = TaskUpdateData {
            completed: Some(!current.completed),
            ..Default::default()
        };
        self.update_task(id, &data).await
    }

    pub async fn delete_task(&self, id: i64) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.url(&format!("/tasks/{}", id)))
            .send()
            .await?;
        ensure_success(response, "Failed to delete task").await?;
        Ok(())
    }

    pub async fn generate_description(&self, title: &str) -> Result<String, ClientError> {
        let request = GenerateDescriptionRequest {
            title: title.to_string(),
        };
        let response = self
            .client
            .post(self.url("/generate-description"))
            .json(&request)
            .send()
            .await?;
        let response = ensure_success(response, "Failed to generate description").await?;
        let body: GenerateDescriptionResponse = response.json().await?;
        Ok(body.description)
    }
}

async fn ensure_success(response: Response, fallback: &str) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: ErrorBody = response.json().await.unwrap_or_default();
    Err(ClientError::Api {
        status: status.as_u16(),
        message: body
            .message
            .or(body.error)
            .unwrap_or_else(|| fallback.to_string()),
    })
}
