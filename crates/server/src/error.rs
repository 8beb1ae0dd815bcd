use auth::{PasswordError, TokenError};
use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::{
    DbErr,
    models::{
        comment::CommentError, document::DocumentError, notification::NotificationError,
        subtask::SubtaskError, task::TaskError, user::UserError, workspace::WorkspaceError,
    },
};
use services::policy::PolicyError;
use thiserror::Error;
use utils_core::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Subtask(#[from] SubtaskError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Comment(#[from] CommentError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error("Invalid or expired token")]
    Token(#[from] TokenError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::User(err) => match err {
                UserError::NotFound => StatusCode::NOT_FOUND,
                UserError::EmailTaken | UserError::ValidationError(_) => StatusCode::BAD_REQUEST,
                UserError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Workspace(err) => match err {
                WorkspaceError::NotFound => StatusCode::NOT_FOUND,
                WorkspaceError::ValidationError(_) => StatusCode::BAD_REQUEST,
                WorkspaceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Task(err) => match err {
                TaskError::NotFound | TaskError::WorkspaceNotFound => StatusCode::NOT_FOUND,
                TaskError::AssigneeNotFound(_) | TaskError::ValidationError(_) => {
                    StatusCode::BAD_REQUEST
                }
                TaskError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Subtask(err) => match err {
                SubtaskError::NotFound | SubtaskError::TaskNotFound => StatusCode::NOT_FOUND,
                SubtaskError::AssigneeNotFound(_) | SubtaskError::ValidationError(_) => {
                    StatusCode::BAD_REQUEST
                }
                SubtaskError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Document(err) => match err {
                DocumentError::NotFound
                | DocumentError::WorkspaceNotFound
                | DocumentError::AuthorNotFound => StatusCode::NOT_FOUND,
                DocumentError::ContributorNotFound(_) | DocumentError::ValidationError(_) => {
                    StatusCode::BAD_REQUEST
                }
                DocumentError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Comment(err) => match err {
                CommentError::NotFound | CommentError::TaskNotFound | CommentError::UserNotFound => {
                    StatusCode::NOT_FOUND
                }
                CommentError::ValidationError(_) => StatusCode::BAD_REQUEST,
                CommentError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Notification(err) => match err {
                NotificationError::NotFound | NotificationError::UserNotFound => {
                    StatusCode::NOT_FOUND
                }
                NotificationError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Policy(_) => StatusCode::FORBIDDEN,
            ApiError::Token(_) | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Password(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Database(DbErr::RecordNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Multipart(_) => StatusCode::BAD_REQUEST,
            ApiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let message = self.to_string();
        if status_code.is_server_error() {
            tracing::error!("API error ({status_code}): {message}");
        }
        (status_code, Json(ApiResponse::<()>::error(&message))).into_response()
    }
}
