use axum::{
    Extension, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{delete, get, put},
};
use db::models::{notification::Notification, user::User};
use serde::Serialize;
use ts_rs::TS;
use utils_core::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Serialize, TS)]
pub struct ReadAllResponse {
    pub updated: u64,
}

pub async fn get_notifications(
    Extension(user): Extension<User>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Notification>>>, ApiError> {
    let notifications = Notification::find_by_user(&state.db().pool, user.id).await?;
    Ok(ResponseJson(ApiResponse::success(notifications)))
}

pub async fn mark_as_read(
    Extension(user): Extension<User>,
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Notification>>, ApiError> {
    let notification = Notification::mark_as_read(&state.db().pool, notification_id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(notification)))
}

pub async fn mark_all_as_read(
    Extension(user): Extension<User>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<ReadAllResponse>>, ApiError> {
    let updated = Notification::mark_all_as_read(&state.db().pool, user.id).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        ReadAllResponse { updated },
        "All notifications marked as read",
    )))
}

pub async fn delete_notification(
    Extension(user): Extension<User>,
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let rows = Notification::delete_for_user(&state.db().pool, notification_id, user.id).await?;
    if rows == 0 {
        return Err(ApiError::NotFound("Notification not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    let notifications_router = Router::new()
        .route("/", get(get_notifications))
        .route("/read-all", put(mark_all_as_read))
        .route("/{notification_id}/read", put(mark_as_read))
        .route("/{notification_id}", delete(delete_notification));

    Router::new().nest("/notifications", notifications_router)
}
