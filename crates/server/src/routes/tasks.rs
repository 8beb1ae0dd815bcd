use std::collections::HashSet;

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use db::{
    DbErr,
    models::{
        task::{CreateTask, Task, TaskWithRelations, UpdateTask},
        user::User,
    },
};
use utils_core::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::load_task_middleware};

pub async fn get_tasks(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<TaskWithRelations>>>, ApiError> {
    let tasks = Task::find_all(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(tasks)))
}

pub async fn get_task(
    Extension(task): Extension<TaskWithRelations>,
) -> Result<ResponseJson<ApiResponse<TaskWithRelations>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn create_task(
    Extension(actor): Extension<User>,
    State(state): State<AppState>,
    Json(payload): Json<CreateTask>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<TaskWithRelations>>), ApiError> {
    let pool = &state.db().pool;
    let task = Task::create(pool, &payload, Uuid::new_v4()).await?;

    let assignees: HashSet<Uuid> = payload.assignees.iter().flatten().copied().collect();
    state
        .notifier()
        .task_created(pool, &actor, &task, &assignees)
        .await;

    let task = Task::find_by_id(pool, task.id)
        .await?
        .ok_or(ApiError::Database(DbErr::RecordNotFound(
            "Task not found".to_string(),
        )))?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(task)),
    ))
}

pub async fn update_task(
    Extension(existing): Extension<TaskWithRelations>,
    Extension(actor): Extension<User>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateTask>,
) -> Result<ResponseJson<ApiResponse<TaskWithRelations>>, ApiError> {
    let pool = &state.db().pool;
    let old_assignees: HashSet<Uuid> = existing.assignees.iter().map(|u| u.id).collect();
    let old_progress = existing.progress.clone();

    let task = Task::update(pool, existing.id, &payload).await?;
    let new_assignees = Task::assignee_ids(pool, task.id).await?;

    state
        .notifier()
        .task_updated(
            pool,
            &actor,
            &task,
            &old_assignees,
            &new_assignees,
            &old_progress,
        )
        .await;

    let task = Task::find_by_id(pool, task.id)
        .await?
        .ok_or(ApiError::Database(DbErr::RecordNotFound(
            "Task not found".to_string(),
        )))?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn delete_task(
    Extension(existing): Extension<TaskWithRelations>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    Task::delete(&state.db().pool, existing.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router(state: &AppState) -> Router<AppState> {
    let task_id_router = Router::new()
        .route("/", get(get_task).put(update_task).delete(delete_task))
        .layer(from_fn_with_state(state.clone(), load_task_middleware));

    let tasks_router = Router::new()
        .route("/", get(get_tasks).post(create_task))
        .nest("/{task_id}", task_id_router);

    Router::new().nest("/tasks", tasks_router)
}
