//! HTTP handlers for the task routes.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};

use super::error::ApiErrorResponse;
use super::AppState;
use crate::task::{DeletedTask, NewTask, Task, TaskPatch};

type ApiResult<T> = Result<Json<T>, ApiErrorResponse>;

/// Path id, with malformed values answered in the JSON error shape
type TaskId = Result<Path<u64>, PathRejection>;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Body returned when a task is moved to the deleted collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
    pub task: DeletedTask,
}

/// Body returned when a deleted task is removed for good.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurgeResponse {
    pub message: String,
    pub warning: String,
    pub task: DeletedTask,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Vec<Task>> {
    state.run(|service| service.list()).await.map(Json)
}

pub async fn get_task(State(state): State<AppState>, id: TaskId) -> ApiResult<Task> {
    let Path(id) = id?;
    state.run(move |service| service.get(id)).await.map(Json)
}

pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> ApiResult<Task> {
    let Json(new_task) = payload?;
    state
        .run(move |service| service.create(new_task))
        .await
        .map(Json)
}

pub async fn replace_task(
    State(state): State<AppState>,
    id: TaskId,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> ApiResult<Task> {
    let Path(id) = id?;
    let Json(new_task) = payload?;
    state
        .run(move |service| service.replace(id, new_task))
        .await
        .map(Json)
}

pub async fn patch_task(
    State(state): State<AppState>,
    id: TaskId,
    payload: Result<Json<TaskPatch>, JsonRejection>,
) -> ApiResult<Task> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    state
        .run(move |service| service.patch(id, patch))
        .await
        .map(Json)
}

pub async fn delete_task(
    State(state): State<AppState>,
    id: TaskId,
) -> ApiResult<DeleteResponse> {
    let Path(id) = id?;
    let task = state.run(move |service| service.delete(id)).await?;
    Ok(Json(DeleteResponse {
        message: "Task deleted".to_string(),
        task,
    }))
}

pub async fn list_deleted(State(state): State<AppState>) -> ApiResult<Vec<DeletedTask>> {
    state
        .run(|service| service.list_deleted())
        .await
        .map(Json)
}

pub async fn get_deleted(
    State(state): State<AppState>,
    id: TaskId,
) -> ApiResult<DeletedTask> {
    let Path(id) = id?;
    state
        .run(move |service| service.get_deleted(id))
        .await
        .map(Json)
}

pub async fn restore_task(State(state): State<AppState>, id: TaskId) -> ApiResult<Task> {
    let Path(id) = id?;
    state.run(move |service| service.restore(id)).await.map(Json)
}

pub async fn purge_task(
    State(state): State<AppState>,
    id: TaskId,
) -> ApiResult<PurgeResponse> {
    let Path(id) = id?;
    let task = state.run(move |service| service.purge(id)).await?;
    Ok(Json(PurgeResponse {
        message: "Task permanently deleted".to_string(),
        warning: "This action cannot be undone".to_string(),
        task,
    }))
}
