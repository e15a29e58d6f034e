use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationErrors};

use crate::models::{NewTask, Priority, TaskPatch};

/// Clients send a local `YYYY-MM-DDTHH:MM` value; it is pinned to UTC+4.
pub const DUE_DATE_SUFFIX: &str = ":00+04:00";

pub const TITLE_MAX_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub path: Vec<String>,
    pub message: String,
}

impl Issue {
    pub fn at(field: &str, message: impl Into<String>) -> Self {
        Self {
            path: vec![field.to_string()],
            message: message.into(),
        }
    }

    pub fn root(message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateTaskRequest {
    #[validate(
        required(message = "Title is required"),
        length(min = 1, message = "Title is required")
    )]
    title: Option<String>,
    description: Option<String>,
    #[validate(required(message = "Priority is required"))]
    priority: Option<String>,
    due_date: Option<String>,
}

/// Every key is optional, but only `description` and `dueDate` accept `null`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateTaskRequest {
    #[serde(default, deserialize_with = "nullable")]
    title: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    priority: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    due_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    completed: Option<Option<bool>>,
}

// Keeps an explicit `null` distinct from a missing key.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Appends the fixed offset to a local date-time. Empty input means "no due date".
pub fn normalize_due_date(raw: &str) -> Result<Option<DateTime<FixedOffset>>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    let stamped = format!("{}{}", raw, DUE_DATE_SUFFIX);
    DateTime::parse_from_rfc3339(&stamped)
        .map(Some)
        .map_err(|_| format!("Invalid date-time: '{}'", raw))
}

pub fn validate_create(body: Value) -> Result<NewTask, Vec<Issue>> {
    let req: CreateTaskRequest =
        serde_json::from_value(body).map_err(|e| vec![Issue::root(e.to_string())])?;

    let mut issues = Vec::new();
    if let Err(errors) = req.validate() {
        collect_issues(&errors, &mut issues);
    }
    if let Some(title) = req.title.as_deref() {
        check_title_max(title, &mut issues);
    }

    let priority = req
        .priority
        .as_deref()
        .and_then(|raw| check_priority(raw, &mut issues));
    let due_date = match req.due_date.as_deref() {
        Some(raw) => check_due_date(raw, &mut issues),
        None => None,
    };

    match (req.title, priority) {
        (Some(title), Some(priority)) if issues.is_empty() => Ok(NewTask {
            title,
            description: req.description,
            priority,
            due_date,
        }),
        _ => Err(sorted(issues)),
    }
}

pub fn validate_update(body: Value) -> Result<TaskPatch, Vec<Issue>> {
    let req: UpdateTaskRequest =
        serde_json::from_value(body).map_err(|e| vec![Issue::root(e.to_string())])?;

    let mut issues = Vec::new();

    let title = req
        .title
        .and_then(|value| non_null(value, "title", "Expected string, received null", &mut issues));
    if let Some(title) = title.as_deref() {
        if title.is_empty() {
            issues.push(Issue::at("title", "Title is required"));
        }
        check_title_max(title, &mut issues);
    }

    let priority = req
        .priority
        .and_then(|value| {
            non_null(
                value,
                "priority",
                "Expected 'LOW' | 'MEDIUM' | 'HIGH', received null",
                &mut issues,
            )
        })
        .and_then(|raw| check_priority(&raw, &mut issues));

    let completed = req.completed.and_then(|value| {
        non_null(value, "completed", "Expected boolean, received null", &mut issues)
    });

    let due_date = req.due_date.map(|value| match value.as_deref() {
        Some(raw) => check_due_date(raw, &mut issues),
        None => None,
    });

    if !issues.is_empty() {
        return Err(sorted(issues));
    }

    Ok(TaskPatch {
        title,
        description: req.description,
        priority,
        due_date,
        completed,
    })
}

fn non_null<T>(value: Option<T>, field: &str, message: &str, issues: &mut Vec<Issue>) -> Option<T> {
    if value.is_none() {
        issues.push(Issue::at(field, message));
    }
    value
}

// Length is measured in UTF-16 code units, the way browser clients count it.
fn check_title_max(title: &str, issues: &mut Vec<Issue>) {
    if title.encode_utf16().count() > TITLE_MAX_LEN {
        issues.push(Issue::at("title", "Title must be less than 100 characters"));
    }
}

fn check_priority(raw: &str, issues: &mut Vec<Issue>) -> Option<Priority> {
    match raw.parse::<Priority>() {
        Ok(priority) => Some(priority),
        Err(message) => {
            issues.push(Issue::at("priority", message));
            None
        }
    }
}

fn check_due_date(raw: &str, issues: &mut Vec<Issue>) -> Option<DateTime<Utc>> {
    match normalize_due_date(raw) {
        Ok(due) => due.map(|d| d.with_timezone(&Utc)),
        Err(message) => {
            issues.push(Issue::at("dueDate", message));
            None
        }
    }
}

fn collect_issues(errors: &ValidationErrors, issues: &mut Vec<Issue>) {
    for (field, field_errors) in errors.field_errors() {
        for err in field_errors.iter() {
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| err.code.to_string());
            issues.push(Issue::at(&field.to_string(), message));
        }
    }
}

fn sorted(mut issues: Vec<Issue>) -> Vec<Issue> {
    issues.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.message.cmp(&b.message)));
    issues
}
