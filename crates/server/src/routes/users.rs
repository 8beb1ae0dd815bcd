use auth::{hash_password, verify_password};
use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{StatusCode, header},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::user::{CreateUser, UpdateUser, User};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use ts_rs::TS;
use utils_core::{assets::upload_dir, response::ApiResponse};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize, TS)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, TS)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Profile updates take the plaintext password and re-hash it here; the
/// stored hash never crosses the API boundary in either direction.
#[derive(Debug, Default, Deserialize, TS)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// An image part buffered out of a multipart body.
struct UploadedImage {
    data: Bytes,
    extension: String,
}

impl UploadedImage {
    /// Writes the bytes under the upload directory and returns the public
    /// `/uploads/...` path.
    async fn store(&self) -> Result<String, ApiError> {
        let file_name = format!("{}.{}", Uuid::new_v4(), self.extension);
        let dir = upload_dir();
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&file_name), &self.data).await?;
        Ok(format!("/uploads/{file_name}"))
    }
}

/// Register and profile update take either a JSON body or a multipart
/// form whose text fields mirror the JSON shape, plus an optional `image`
/// file part.
async fn read_payload<T: DeserializeOwned>(
    req: Request,
) -> Result<(T, Option<UploadedImage>), ApiError> {
    let is_multipart = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));
    if !is_multipart {
        let Json(payload) = Json::<T>::from_request(req, &())
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        return Ok((payload, None));
    }

    let mut multipart = Multipart::from_request(req, &())
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let mut fields = serde_json::Map::new();
    let mut image = None;
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == "image" && field.file_name().is_some() {
            let extension = field
                .file_name()
                .and_then(|file| file.rsplit_once('.').map(|(_, ext)| ext.to_string()))
                .unwrap_or_else(|| "bin".to_string());
            let data = field.bytes().await?;
            if data.is_empty() {
                return Err(ApiError::BadRequest("Empty image upload".to_string()));
            }
            image = Some(UploadedImage { data, extension });
        } else {
            fields.insert(name, serde_json::Value::String(field.text().await?));
        }
    }
    let payload = serde_json::from_value(serde_json::Value::Object(fields))
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok((payload, image))
}

pub async fn register(
    State(state): State<AppState>,
    req: Request,
) -> Result<(StatusCode, ResponseJson<ApiResponse<AuthResponse>>), ApiError> {
    let (payload, image): (RegisterRequest, _) = read_payload(req).await?;
    if payload.password.trim().is_empty() {
        return Err(ApiError::BadRequest("Password is required".to_string()));
    }
    let password_hash = hash_password(&payload.password)?;
    let image = match image {
        Some(part) => Some(part.store().await?),
        None => payload.image,
    };
    let user = User::create(
        &state.db().pool,
        &CreateUser {
            name: payload.name,
            email: payload.email,
            password_hash,
            image,
        },
        Uuid::new_v4(),
    )
    .await?;
    let token = state.tokens().issue(user.id)?;

    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(AuthResponse { token, user })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<ResponseJson<ApiResponse<AuthResponse>>, ApiError> {
    let credentials = User::find_credentials_by_email(&state.db().pool, &payload.email)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    if !verify_password(&payload.password, &credentials.password_hash)? {
        return Err(ApiError::Unauthorized);
    }

    let token = state.tokens().issue(credentials.user.id)?;
    Ok(ResponseJson(ApiResponse::success(AuthResponse {
        token,
        user: credentials.user,
    })))
}

pub async fn get_profile(
    Extension(user): Extension<User>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(user)))
}

pub async fn update_profile(
    Extension(user): Extension<User>,
    State(state): State<AppState>,
    req: Request,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    let (payload, image): (UpdateProfileRequest, _) = read_payload(req).await?;
    let password_hash = match payload.password.as_deref() {
        Some(password) if !password.trim().is_empty() => Some(hash_password(password)?),
        Some(_) => return Err(ApiError::BadRequest("Password is required".to_string())),
        None => None,
    };
    let image = match image {
        Some(part) => Some(part.store().await?),
        None => None,
    };
    let updated = User::update(
        &state.db().pool,
        user.id,
        &UpdateUser {
            name: payload.name,
            email: payload.email,
            password_hash,
            image,
        },
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(updated)))
}

pub async fn get_users(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<User>>>, ApiError> {
    let users = User::find_all(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(users)))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    let user = User::find_by_id(&state.db().pool, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(user)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let rows = User::delete(&state.db().pool, user_id).await?;
    if rows == 0 {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
}

pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/users", get(get_users))
        .route("/users/profile", get(get_profile).put(update_profile))
        .route("/users/{user_id}", get(get_user).delete(delete_user))
}
