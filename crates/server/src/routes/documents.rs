use std::collections::HashSet;

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    document::{CreateDocument, Document, DocumentWithRelations, UpdateDocument},
    user::User,
};
use utils_core::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::load_document_middleware};

pub async fn get_documents(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<DocumentWithRelations>>>, ApiError> {
    let documents = Document::find_all(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(documents)))
}

pub async fn get_document(
    Extension(document): Extension<DocumentWithRelations>,
) -> Result<ResponseJson<ApiResponse<DocumentWithRelations>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(document)))
}

pub async fn create_document(
    Extension(actor): Extension<User>,
    State(state): State<AppState>,
    Json(payload): Json<CreateDocument>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<DocumentWithRelations>>), ApiError> {
    let pool = &state.db().pool;
    let document = Document::create(pool, &payload, actor.id, Uuid::new_v4()).await?;

    let contributors: HashSet<Uuid> = document.contributors.iter().map(|u| u.id).collect();
    state
        .notifier()
        .document_shared(pool, &actor, document.id, &document.title, &contributors)
        .await;

    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(document)),
    ))
}

pub async fn update_document(
    Extension(existing): Extension<DocumentWithRelations>,
    Extension(actor): Extension<User>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateDocument>,
) -> Result<ResponseJson<ApiResponse<DocumentWithRelations>>, ApiError> {
    let pool = &state.db().pool;

    let old_contributors: HashSet<Uuid> = existing.contributors.iter().map(|u| u.id).collect();
    let document = Document::update(pool, existing.id, &payload).await?;

    // Only freshly added contributors hear about the share.
    let added: HashSet<Uuid> = document
        .contributors
        .iter()
        .map(|u| u.id)
        .filter(|id| !old_contributors.contains(id))
        .collect();
    state
        .notifier()
        .document_shared(pool, &actor, document.id, &document.title, &added)
        .await;

    Ok(ResponseJson(ApiResponse::success(document)))
}

pub async fn delete_document(
    Extension(existing): Extension<DocumentWithRelations>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    Document::delete(&state.db().pool, existing.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router(state: &AppState) -> Router<AppState> {
    let document_id_router = Router::new()
        .route(
            "/",
            get(get_document).put(update_document).delete(delete_document),
        )
        .layer(from_fn_with_state(state.clone(), load_document_middleware));

    let documents_router = Router::new()
        .route("/", get(get_documents).post(create_document))
        .nest("/{document_id}", document_id_router);

    Router::new().nest("/documents", documents_router)
}
