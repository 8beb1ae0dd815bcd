use std::{fmt::Display, future::Future};

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use db::models::{
    comment::Comment, document::Document, subtask::Subtask, task::Task, workspace::Workspace,
};
use uuid::Uuid;

use crate::AppState;

async fn fetch_model_or_status<M, E, Fut>(
    model_name: &'static str,
    model_id: Uuid,
    load_future: Fut,
) -> Result<M, StatusCode>
where
    E: Display,
    Fut: Future<Output = Result<Option<M>, E>>,
{
    match load_future.await {
        Ok(Some(model)) => Ok(model),
        Ok(None) => {
            tracing::warn!("{model_name} {model_id} not found");
            Err(StatusCode::NOT_FOUND)
        }
        Err(error) => {
            tracing::error!("Failed to fetch {model_name} {model_id}: {error}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn load_request_extension<M, E, Fut>(
    request: Request,
    next: Next,
    model_name: &'static str,
    model_id: Uuid,
    load_future: Fut,
) -> Result<Response, StatusCode>
where
    M: Clone + Send + Sync + 'static,
    E: Display,
    Fut: Future<Output = Result<Option<M>, E>>,
{
    let model = fetch_model_or_status(model_name, model_id, load_future).await?;
    let mut request = request;
    request.extensions_mut().insert(model);
    Ok(next.run(request).await)
}

pub async fn load_workspace_middleware(
    State(state): State<AppState>,
    Path(workspace_id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    load_request_extension(
        request,
        next,
        "Workspace",
        workspace_id,
        Workspace::find_by_id(&state.db().pool, workspace_id),
    )
    .await
}

pub async fn load_task_middleware(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    load_request_extension(
        request,
        next,
        "Task",
        task_id,
        Task::find_by_id(&state.db().pool, task_id),
    )
    .await
}

pub async fn load_subtask_middleware(
    State(state): State<AppState>,
    Path(subtask_id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    load_request_extension(
        request,
        next,
        "Subtask",
        subtask_id,
        Subtask::find_by_id(&state.db().pool, subtask_id),
    )
    .await
}

pub async fn load_document_middleware(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    load_request_extension(
        request,
        next,
        "Document",
        document_id,
        Document::find_by_id(&state.db().pool, document_id),
    )
    .await
}

pub async fn load_comment_middleware(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    load_request_extension(
        request,
        next,
        "Comment",
        comment_id,
        Comment::find_by_id(&state.db().pool, comment_id),
    )
    .await
}
