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
        subtask::{CreateSubtask, Subtask, SubtaskWithAssignees, UpdateSubtask},
        task::Task,
        user::User,
    },
};
use utils_core::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::load_subtask_middleware};

pub async fn get_subtasks(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<SubtaskWithAssignees>>>, ApiError> {
    let subtasks = Subtask::find_all(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(subtasks)))
}

pub async fn get_subtask(
    Extension(subtask): Extension<SubtaskWithAssignees>,
) -> Result<ResponseJson<ApiResponse<SubtaskWithAssignees>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(subtask)))
}

pub async fn create_subtask(
    State(state): State<AppState>,
    Json(payload): Json<CreateSubtask>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<SubtaskWithAssignees>>), ApiError> {
    let pool = &state.db().pool;
    let subtask = Subtask::create(pool, &payload, Uuid::new_v4()).await?;
    let subtask = Subtask::find_by_id(pool, subtask.id)
        .await?
        .ok_or(ApiError::Database(DbErr::RecordNotFound(
            "Subtask not found".to_string(),
        )))?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(subtask)),
    ))
}

pub async fn update_subtask(
    Extension(existing): Extension<SubtaskWithAssignees>,
    Extension(actor): Extension<User>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateSubtask>,
) -> Result<ResponseJson<ApiResponse<SubtaskWithAssignees>>, ApiError> {
    let pool = &state.db().pool;
    let old_progress = existing.progress.clone();

    let subtask = Subtask::update(pool, existing.id, &payload).await?;

    let task_assignees = Task::assignee_ids(pool, subtask.task_id).await?;
    state
        .notifier()
        .subtask_completed(
            pool,
            &actor,
            subtask.id,
            &subtask.title,
            &old_progress,
            &subtask.progress,
            &task_assignees,
        )
        .await;

    let subtask = Subtask::find_by_id(pool, subtask.id)
        .await?
        .ok_or(ApiError::Database(DbErr::RecordNotFound(
            "Subtask not found".to_string(),
        )))?;
    Ok(ResponseJson(ApiResponse::success(subtask)))
}

pub async fn delete_subtask(
    Extension(existing): Extension<SubtaskWithAssignees>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    Subtask::delete(&state.db().pool, existing.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router(state: &AppState) -> Router<AppState> {
    let subtask_id_router = Router::new()
        .route(
            "/",
            get(get_subtask).put(update_subtask).delete(delete_subtask),
        )
        .layer(from_fn_with_state(state.clone(), load_subtask_middleware));

    let subtasks_router = Router::new()
        .route("/", get(get_subtasks).post(create_subtask))
        .nest("/{subtask_id}", subtask_id_router);

    Router::new().nest("/subtasks", subtasks_router)
}
