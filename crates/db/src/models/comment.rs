use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use super::user::User;
use crate::{entities::comment, models::ids};

#[derive(Debug, Error)]
pub enum CommentError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Comment not found")]
    NotFound,
    #[error("Task not found")]
    TaskNotFound,
    #[error("User not found")]
    UserNotFound,
    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Comment {
    pub id: Uuid,
    pub task_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CommentWithUser {
    #[serde(flatten)]
    #[ts(flatten)]
    pub comment: Comment,
    pub user: User,
}

impl std::ops::Deref for CommentWithUser {
    type Target = Comment;
    fn deref(&self) -> &Self::Target {
        &self.comment
    }
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateComment {
    pub task_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct UpdateComment {
    pub content: String,
}

impl Comment {
    async fn from_model<C: ConnectionTrait>(db: &C, model: comment::Model) -> Result<Self, DbErr> {
        let task_id = ids::task_uuid_by_id(db, model.task_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Task not found".to_string()))?;
        let user_id = ids::user_uuid_by_id(db, model.user_id)
            .await?
            .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;
        Ok(Self {
            id: model.uuid,
            task_id,
            user_id,
            content: model.content,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateComment,
        author: Uuid,
        comment_id: Uuid,
    ) -> Result<Self, CommentError> {
        if data.content.trim().is_empty() {
            return Err(CommentError::ValidationError(
                "Content is required".to_string(),
            ));
        }
        let task_row_id = ids::task_id_by_uuid(db, data.task_id)
            .await?
            .ok_or(CommentError::TaskNotFound)?;
        let user_row_id = ids::user_id_by_uuid(db, author)
            .await?
            .ok_or(CommentError::UserNotFound)?;

        let now = Utc::now();
        let active = comment::ActiveModel {
            uuid: Set(comment_id),
            task_id: Set(task_row_id),
            user_id: Set(user_row_id),
            content: Set(data.content.clone()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Self::from_model(db, model).await.map_err(Into::into)
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<Option<Self>, CommentError> {
        let model = comment::Entity::find()
            .filter(comment::Column::Uuid.eq(id))
            .one(db)
            .await?;
        match model {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    /// Comments for a task, newest first, each with its author embedded.
    pub async fn find_by_task<C: ConnectionTrait>(
        db: &C,
        task_id: Uuid,
    ) -> Result<Vec<CommentWithUser>, CommentError> {
        let task_row_id = ids::task_id_by_uuid(db, task_id)
            .await?
            .ok_or(CommentError::TaskNotFound)?;
        let models = comment::Entity::find()
            .filter(comment::Column::TaskId.eq(task_row_id))
            .order_by_desc(comment::Column::CreatedAt)
            .all(db)
            .await?;

        let mut comments = Vec::with_capacity(models.len());
        for model in models {
            let user = User::find_by_row_ids(db, &[model.user_id])
                .await?
                .pop()
                .ok_or(CommentError::UserNotFound)?;
            let comment = Self::from_model(db, model).await?;
            comments.push(CommentWithUser { comment, user });
        }
        Ok(comments)
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        data: &UpdateComment,
    ) -> Result<Self, CommentError> {
        if data.content.trim().is_empty() {
            return Err(CommentError::ValidationError(
                "Content is required".to_string(),
            ));
        }
        let record = comment::Entity::find()
            .filter(comment::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(CommentError::NotFound)?;

        let mut active: comment::ActiveModel = record.into();
        active.content = Set(data.content.clone());
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(db).await?;
        Self::from_model(db, updated).await.map_err(Into::into)
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = comment::Entity::delete_many()
            .filter(comment::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
