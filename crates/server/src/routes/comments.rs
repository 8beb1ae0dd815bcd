use std::collections::HashSet;

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use db::models::{
    comment::{Comment, CommentWithUser, CreateComment, UpdateComment},
    task::Task,
    user::User,
};
use services::policy::ensure_owner;
use utils_core::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::load_comment_middleware};

pub async fn create_comment(
    Extension(actor): Extension<User>,
    State(state): State<AppState>,
    Json(payload): Json<CreateComment>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Comment>>), ApiError> {
    let pool = &state.db().pool;
    let comment = Comment::create(pool, &payload, actor.id, Uuid::new_v4()).await?;

    if let Some(task) = Task::find_by_id(pool, comment.task_id).await? {
        let assignees: HashSet<Uuid> = task.assignees.iter().map(|u| u.id).collect();
        state
            .notifier()
            .comment_added(pool, &actor, &task.title, comment.id, &assignees)
            .await;
    }

    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(comment)),
    ))
}

pub async fn get_task_comments(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<CommentWithUser>>>, ApiError> {
    let comments = Comment::find_by_task(&state.db().pool, task_id).await?;
    Ok(ResponseJson(ApiResponse::success(comments)))
}

pub async fn update_comment(
    Extension(existing): Extension<Comment>,
    Extension(actor): Extension<User>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateComment>,
) -> Result<ResponseJson<ApiResponse<Comment>>, ApiError> {
    ensure_owner(&existing, &actor)?;
    let comment = Comment::update(&state.db().pool, existing.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(comment)))
}

pub async fn delete_comment(
    Extension(existing): Extension<Comment>,
    Extension(actor): Extension<User>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    ensure_owner(&existing, &actor)?;
    Comment::delete(&state.db().pool, existing.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router(state: &AppState) -> Router<AppState> {
    let comment_id_router = Router::new()
        .route("/", put(update_comment).delete(delete_comment))
        .layer(from_fn_with_state(state.clone(), load_comment_middleware));

    let comments_router = Router::new()
        .route("/", post(create_comment))
        .route("/task/{task_id}", get(get_task_comments))
        .nest("/{comment_id}", comment_id_router);

    Router::new().nest("/comments", comments_router)
}
