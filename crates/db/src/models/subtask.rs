use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use super::user::User;
use crate::{
    entities::{subtask, subtask_assignee},
    models::ids,
    types::SubtaskProgress,
};

#[derive(Debug, Error)]
pub enum SubtaskError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Subtask not found")]
    NotFound,
    #[error("Task not found")]
    TaskNotFound,
    #[error("Assignee not found: {0}")]
    AssigneeNotFound(Uuid),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Subtask {
    pub id: Uuid,
    pub task_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<i32>,
    pub progress: SubtaskProgress,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SubtaskWithAssignees {
    #[serde(flatten)]
    #[ts(flatten)]
    pub subtask: Subtask,
    pub assignees: Vec<User>,
}

impl std::ops::Deref for SubtaskWithAssignees {
    type Target = Subtask;
    fn deref(&self) -> &Self::Target {
        &self.subtask
    }
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateSubtask {
    pub task_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<i32>,
    pub progress: Option<SubtaskProgress>,
    pub due_date: Option<DateTime<Utc>>,
    pub assignees: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateSubtask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i32>,
    pub progress: Option<SubtaskProgress>,
    pub due_date: Option<DateTime<Utc>>,
    /// When present, replaces the whole assignee set.
    pub assignees: Option<Vec<Uuid>>,
}

fn validate_priority(priority: Option<i32>) -> Result<(), SubtaskError> {
    match priority {
        Some(p) if !(1..=3).contains(&p) => Err(SubtaskError::ValidationError(format!(
            "Priority must be between 1 and 3, got {p}"
        ))),
        _ => Ok(()),
    }
}

impl Subtask {
    async fn from_model<C: ConnectionTrait>(db: &C, model: subtask::Model) -> Result<Self, DbErr> {
        let task_id = ids::task_uuid_by_id(db, model.task_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Task not found".to_string()))?;
        Ok(Self {
            id: model.uuid,
            task_id,
            title: model.title,
            description: model.description,
            priority: model.priority,
            progress: model.progress,
            due_date: model.due_date.map(Into::into),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateSubtask,
        subtask_id: Uuid,
    ) -> Result<Self, SubtaskError> {
        if data.title.trim().is_empty() {
            return Err(SubtaskError::ValidationError(
                "Title is required".to_string(),
            ));
        }
        validate_priority(data.priority)?;
        let task_row_id = ids::task_id_by_uuid(db, data.task_id)
            .await?
            .ok_or(SubtaskError::TaskNotFound)?;

        let now = Utc::now();
        let active = subtask::ActiveModel {
            uuid: Set(subtask_id),
            task_id: Set(task_row_id),
            title: Set(data.title.clone()),
            description: Set(data.description.clone()),
            priority: Set(data.priority),
            progress: Set(data.progress.clone().unwrap_or_default()),
            due_date: Set(data.due_date.map(Into::into)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        let model = active.insert(db).await?;

        if let Some(assignees) = &data.assignees {
            Self::replace_assignees(db, model.id, assignees).await?;
        }
        Self::from_model(db, model).await.map_err(Into::into)
    }

    pub async fn find_all<C: ConnectionTrait>(
        db: &C,
    ) -> Result<Vec<SubtaskWithAssignees>, SubtaskError> {
        let models = subtask::Entity::find()
            .order_by_desc(subtask::Column::CreatedAt)
            .all(db)
            .await?;
        SubtaskWithAssignees::from_models(db, models)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<Option<SubtaskWithAssignees>, SubtaskError> {
        let model = subtask::Entity::find()
            .filter(subtask::Column::Uuid.eq(id))
            .one(db)
            .await?;
        match model {
            Some(model) => Ok(SubtaskWithAssignees::from_models(db, vec![model])
                .await?
                .pop()),
            None => Ok(None),
        }
    }

    async fn replace_assignees<C: ConnectionTrait>(
        db: &C,
        subtask_row_id: i64,
        assignees: &[Uuid],
    ) -> Result<(), SubtaskError> {
        let mut user_row_ids = Vec::with_capacity(assignees.len());
        for user_id in assignees {
            let row_id = ids::user_id_by_uuid(db, *user_id)
                .await?
                .ok_or(SubtaskError::AssigneeNotFound(*user_id))?;
            user_row_ids.push(row_id);
        }

        subtask_assignee::Entity::delete_many()
            .filter(subtask_assignee::Column::SubtaskId.eq(subtask_row_id))
            .exec(db)
            .await?;

        let now = Utc::now();
        for user_row_id in user_row_ids {
            let active = subtask_assignee::ActiveModel {
                subtask_id: Set(subtask_row_id),
                user_id: Set(user_row_id),
                created_at: Set(now.into()),
                ..Default::default()
            };
            active.insert(db).await?;
        }
        Ok(())
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        data: &UpdateSubtask,
    ) -> Result<Self, SubtaskError> {
        validate_priority(data.priority)?;
        if let Some(title) = data.title.as_deref()
            && title.trim().is_empty()
        {
            return Err(SubtaskError::ValidationError(
                "Title is required".to_string(),
            ));
        }

        let record = subtask::Entity::find()
            .filter(subtask::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(SubtaskError::NotFound)?;
        let subtask_row_id = record.id;

        let mut active: subtask::ActiveModel = record.into();
        if let Some(title) = data.title.clone() {
            active.title = Set(title);
        }
        if let Some(description) = data.description.clone() {
            active.description = Set(Some(description));
        }
        if let Some(priority) = data.priority {
            active.priority = Set(Some(priority));
        }
        if let Some(progress) = data.progress.clone() {
            active.progress = Set(progress);
        }
        if let Some(due_date) = data.due_date {
            active.due_date = Set(Some(due_date.into()));
        }
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(db).await?;

        if let Some(assignees) = &data.assignees {
            Self::replace_assignees(db, subtask_row_id, assignees).await?;
        }
        Self::from_model(db, updated).await.map_err(Into::into)
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = subtask::Entity::delete_many()
            .filter(subtask::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}

impl SubtaskWithAssignees {
    pub(crate) async fn find_by_task_row_id<C: ConnectionTrait>(
        db: &C,
        task_row_id: i64,
    ) -> Result<Vec<Self>, DbErr> {
        let models = subtask::Entity::find()
            .filter(subtask::Column::TaskId.eq(task_row_id))
            .order_by_desc(subtask::Column::CreatedAt)
            .all(db)
            .await?;
        Self::from_models(db, models).await
    }

    async fn from_models<C: ConnectionTrait>(
        db: &C,
        models: Vec<subtask::Model>,
    ) -> Result<Vec<Self>, DbErr> {
        let mut subtasks = Vec::with_capacity(models.len());
        for model in models {
            let row_id = model.id;
            let subtask = Subtask::from_model(db, model).await?;
            let user_row_ids: Vec<i64> = subtask_assignee::Entity::find()
                .select_only()
                .column(subtask_assignee::Column::UserId)
                .filter(subtask_assignee::Column::SubtaskId.eq(row_id))
                .into_tuple()
                .all(db)
                .await?;
            let assignees = User::find_by_row_ids(db, &user_row_ids).await?;
            subtasks.push(SubtaskWithAssignees { subtask, assignees });
        }
        Ok(subtasks)
    }
}
