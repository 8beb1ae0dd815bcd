use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::workspace::{CreateWorkspace, UpdateWorkspace, Workspace, WorkspaceWithRelations};
use utils_core::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::load_workspace_middleware};

pub async fn get_workspaces(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<WorkspaceWithRelations>>>, ApiError> {
    let workspaces = Workspace::find_all(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(workspaces)))
}

pub async fn get_workspace(
    Extension(workspace): Extension<WorkspaceWithRelations>,
) -> Result<ResponseJson<ApiResponse<WorkspaceWithRelations>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(workspace)))
}

pub async fn create_workspace(
    State(state): State<AppState>,
    Json(payload): Json<CreateWorkspace>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Workspace>>), ApiError> {
    let workspace = Workspace::create(&state.db().pool, &payload, Uuid::new_v4()).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(workspace)),
    ))
}

pub async fn update_workspace(
    Extension(existing): Extension<WorkspaceWithRelations>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateWorkspace>,
) -> Result<ResponseJson<ApiResponse<Workspace>>, ApiError> {
    let workspace = Workspace::update(&state.db().pool, existing.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(workspace)))
}

pub async fn delete_workspace(
    Extension(existing): Extension<WorkspaceWithRelations>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    Workspace::delete(&state.db().pool, existing.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router(state: &AppState) -> Router<AppState> {
    let workspace_id_router = Router::new()
        .route(
            "/",
            get(get_workspace)
                .put(update_workspace)
                .delete(delete_workspace),
        )
        .layer(from_fn_with_state(state.clone(), load_workspace_middleware));

    let workspaces_router = Router::new()
        .route("/", get(get_workspaces).post(create_workspace))
        .nest("/{workspace_id}", workspace_id_router);

    Router::new().nest("/workspaces", workspaces_router)
}
