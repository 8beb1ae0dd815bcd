use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use crate::{
    entities::notification,
    models::ids,
    types::{NotificationType, RelatedEntity},
};

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Notification not found")]
    NotFound,
    #[error("User not found")]
    UserNotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_type: NotificationType,
    pub message: String,
    pub is_read: bool,
    #[serde(flatten)]
    #[ts(flatten)]
    pub related: Option<RelatedEntity>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateNotification {
    pub user_id: Uuid,
    pub notification_type: NotificationType,
    pub message: String,
    pub related: Option<RelatedEntity>,
}

impl Notification {
    async fn from_model<C: ConnectionTrait>(
        db: &C,
        model: notification::Model,
    ) -> Result<Self, DbErr> {
        let user_id = ids::user_uuid_by_id(db, model.user_id)
            .await?
            .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;
        Ok(Self {
            id: model.uuid,
            user_id,
            notification_type: model.notification_type,
            message: model.message,
            is_read: model.is_read,
            related: RelatedEntity::from_columns(
                model.related_type.as_deref(),
                model.related_uuid,
            ),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateNotification,
        notification_id: Uuid,
    ) -> Result<Self, NotificationError> {
        let user_row_id = ids::user_id_by_uuid(db, data.user_id)
            .await?
            .ok_or(NotificationError::UserNotFound)?;

        let now = Utc::now();
        let active = notification::ActiveModel {
            uuid: Set(notification_id),
            user_id: Set(user_row_id),
            notification_type: Set(data.notification_type.clone()),
            message: Set(data.message.clone()),
            is_read: Set(false),
            related_type: Set(data.related.as_ref().map(|r| r.kind().to_string())),
            related_uuid: Set(data.related.as_ref().map(|r| r.uuid())),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Self::from_model(db, model).await.map_err(Into::into)
    }

    /// Notifications for a user, newest first.
    pub async fn find_by_user<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
    ) -> Result<Vec<Self>, NotificationError> {
        let user_row_id = ids::user_id_by_uuid(db, user_id)
            .await?
            .ok_or(NotificationError::UserNotFound)?;
        let models = notification::Entity::find()
            .filter(notification::Column::UserId.eq(user_row_id))
            .order_by_desc(notification::Column::CreatedAt)
            .all(db)
            .await?;
        let mut notifications = Vec::with_capacity(models.len());
        for model in models {
            notifications.push(Self::from_model(db, model).await?);
        }
        Ok(notifications)
    }

    /// Marks one notification read. Scoped to the owner; returns None
    /// when the id does not exist or belongs to someone else.
    pub async fn mark_as_read<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, NotificationError> {
        let user_row_id = ids::user_id_by_uuid(db, user_id)
            .await?
            .ok_or(NotificationError::UserNotFound)?;
        let record = notification::Entity::find()
            .filter(notification::Column::Uuid.eq(id))
            .filter(notification::Column::UserId.eq(user_row_id))
            .one(db)
            .await?;
        let Some(record) = record else {
            return Ok(None);
        };

        let mut active: notification::ActiveModel = record.into();
        active.is_read = Set(true);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(db).await?;
        Ok(Some(Self::from_model(db, updated).await?))
    }

    pub async fn mark_all_as_read<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
    ) -> Result<u64, NotificationError> {
        let user_row_id = ids::user_id_by_uuid(db, user_id)
            .await?
            .ok_or(NotificationError::UserNotFound)?;
        let result = notification::Entity::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .col_expr(notification::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(notification::Column::UserId.eq(user_row_id))
            .filter(notification::Column::IsRead.eq(false))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    /// Owner-scoped delete; 0 rows when the id is not theirs.
    pub async fn delete_for_user<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, NotificationError> {
        let user_row_id = ids::user_id_by_uuid(db, user_id)
            .await?
            .ok_or(NotificationError::UserNotFound)?;
        let result = notification::Entity::delete_many()
            .filter(notification::Column::Uuid.eq(id))
            .filter(notification::Column::UserId.eq(user_row_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
