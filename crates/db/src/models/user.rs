use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use crate::entities::user;

#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("User not found")]
    NotFound,
    #[error("A user with this email already exists")]
    EmailTaken,
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Sanitized user representation. The password hash never leaves the db
/// crate except through [`UserCredentials`], which only login touches.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Login-only view carrying the stored hash for verification.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub image: Option<String>,
}

impl User {
    pub(crate) fn from_model(model: user::Model) -> Self {
        Self {
            id: model.uuid,
            name: model.name,
            email: model.email,
            image: model.image,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }

    fn validate_email(email: &str) -> Result<(), UserError> {
        let trimmed = email.trim();
        if trimmed.is_empty() || !trimmed.contains('@') {
            return Err(UserError::ValidationError(format!(
                "Invalid email address: {email}"
            )));
        }
        Ok(())
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateUser,
        user_id: Uuid,
    ) -> Result<Self, UserError> {
        if data.name.trim().is_empty() {
            return Err(UserError::ValidationError("Name is required".to_string()));
        }
        Self::validate_email(&data.email)?;

        let taken = user::Entity::find()
            .filter(user::Column::Email.eq(data.email.trim()))
            .one(db)
            .await?
            .is_some();
        if taken {
            return Err(UserError::EmailTaken);
        }

        let now = Utc::now();
        let active = user::ActiveModel {
            uuid: Set(user_id),
            name: Set(data.name.clone()),
            email: Set(data.email.trim().to_string()),
            password_hash: Set(data.password_hash.clone()),
            image: Set(data.image.clone()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let models = user::Entity::find()
            .order_by_desc(user::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(models.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let model = user::Entity::find()
            .filter(user::Column::Uuid.eq(id))
            .one(db)
            .await?;
        Ok(model.map(Self::from_model))
    }

    pub async fn find_credentials_by_email<C: ConnectionTrait>(
        db: &C,
        email: &str,
    ) -> Result<Option<UserCredentials>, DbErr> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email.trim()))
            .one(db)
            .await?;
        Ok(model.map(|m| {
            let password_hash = m.password_hash.clone();
            UserCredentials {
                user: Self::from_model(m),
                password_hash,
            }
        }))
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        data: &UpdateUser,
    ) -> Result<Self, UserError> {
        let record = user::Entity::find()
            .filter(user::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(UserError::NotFound)?;

        if let Some(email) = data.email.as_deref() {
            Self::validate_email(email)?;
            let taken = user::Entity::find()
                .filter(user::Column::Email.eq(email.trim()))
                .filter(user::Column::Uuid.ne(id))
                .one(db)
                .await?
                .is_some();
            if taken {
                return Err(UserError::EmailTaken);
            }
        }
        if let Some(name) = data.name.as_deref()
            && name.trim().is_empty()
        {
            return Err(UserError::ValidationError("Name is required".to_string()));
        }

        let mut active: user::ActiveModel = record.into();
        if let Some(name) = data.name.clone() {
            active.name = Set(name);
        }
        if let Some(email) = data.email.clone() {
            active.email = Set(email.trim().to_string());
        }
        if let Some(password_hash) = data.password_hash.clone() {
            active.password_hash = Set(password_hash);
        }
        if let Some(image) = data.image.clone() {
            active.image = Set(Some(image));
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = user::Entity::delete_many()
            .filter(user::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    /// Batch-load sanitized users by row id, preserving the input order.
    pub(crate) async fn find_by_row_ids<C: ConnectionTrait>(
        db: &C,
        row_ids: &[i64],
    ) -> Result<Vec<Self>, DbErr> {
        if row_ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = user::Entity::find()
            .filter(user::Column::Id.is_in(row_ids.to_vec()))
            .all(db)
            .await?;
        let mut by_id: std::collections::HashMap<i64, user::Model> =
            models.into_iter().map(|m| (m.id, m)).collect();
        Ok(row_ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .map(Self::from_model)
            .collect())
    }
}
