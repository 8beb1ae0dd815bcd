use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use super::{subtask::SubtaskWithAssignees, user::User};
use crate::{
    entities::{task, task_assignee},
    models::ids,
    types::TaskProgress,
};

#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Task not found")]
    NotFound,
    #[error("Workspace not found")]
    WorkspaceNotFound,
    #[error("Assignee not found: {0}")]
    AssigneeNotFound(Uuid),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Task {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<i32>,
    pub progress: TaskProgress,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct TaskWithRelations {
    #[serde(flatten)]
    #[ts(flatten)]
    pub task: Task,
    pub assignees: Vec<User>,
    pub subtasks: Vec<SubtaskWithAssignees>,
}

impl std::ops::Deref for TaskWithRelations {
    type Target = Task;
    fn deref(&self) -> &Self::Target {
        &self.task
    }
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateTask {
    pub workspace_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<i32>,
    pub progress: Option<TaskProgress>,
    pub due_date: Option<DateTime<Utc>>,
    pub assignees: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i32>,
    pub progress: Option<TaskProgress>,
    pub due_date: Option<DateTime<Utc>>,
    /// When present, replaces the whole assignee set.
    pub assignees: Option<Vec<Uuid>>,
}

fn validate_priority(priority: Option<i32>) -> Result<(), TaskError> {
    match priority {
        Some(p) if !(1..=3).contains(&p) => Err(TaskError::ValidationError(format!(
            "Priority must be between 1 and 3, got {p}"
        ))),
        _ => Ok(()),
    }
}

impl Task {
    async fn from_model<C: ConnectionTrait>(db: &C, model: task::Model) -> Result<Self, DbErr> {
        let workspace_id = ids::workspace_uuid_by_id(db, model.workspace_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Workspace not found".to_string()))?;
        Ok(Self {
            id: model.uuid,
            workspace_id,
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
        data: &CreateTask,
        task_id: Uuid,
    ) -> Result<Self, TaskError> {
        if data.title.trim().is_empty() {
            return Err(TaskError::ValidationError("Title is required".to_string()));
        }
        validate_priority(data.priority)?;
        let workspace_row_id = ids::workspace_id_by_uuid(db, data.workspace_id)
            .await?
            .ok_or(TaskError::WorkspaceNotFound)?;

        let now = Utc::now();
        let active = task::ActiveModel {
            uuid: Set(task_id),
            workspace_id: Set(workspace_row_id),
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

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<TaskWithRelations>, TaskError> {
        let models = task::Entity::find()
            .order_by_desc(task::Column::CreatedAt)
            .all(db)
            .await?;
        Self::with_relations(db, models).await
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<Option<TaskWithRelations>, TaskError> {
        let model = task::Entity::find()
            .filter(task::Column::Uuid.eq(id))
            .one(db)
            .await?;
        match model {
            Some(model) => Ok(Self::with_relations(db, vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    pub(crate) async fn find_by_workspace_row_id<C: ConnectionTrait>(
        db: &C,
        workspace_row_id: i64,
    ) -> Result<Vec<TaskWithRelations>, TaskError> {
        let models = task::Entity::find()
            .filter(task::Column::WorkspaceId.eq(workspace_row_id))
            .order_by_desc(task::Column::CreatedAt)
            .all(db)
            .await?;
        Self::with_relations(db, models).await
    }

    async fn with_relations<C: ConnectionTrait>(
        db: &C,
        models: Vec<task::Model>,
    ) -> Result<Vec<TaskWithRelations>, TaskError> {
        let mut tasks = Vec::with_capacity(models.len());
        for model in models {
            let row_id = model.id;
            let task = Self::from_model(db, model).await?;
            let assignees = Self::assignees_by_row_id(db, row_id).await?;
            let subtasks = SubtaskWithAssignees::find_by_task_row_id(db, row_id).await?;
            tasks.push(TaskWithRelations {
                task,
                assignees,
                subtasks,
            });
        }
        Ok(tasks)
    }

    async fn assignees_by_row_id<C: ConnectionTrait>(
        db: &C,
        task_row_id: i64,
    ) -> Result<Vec<User>, DbErr> {
        let user_row_ids: Vec<i64> = task_assignee::Entity::find()
            .select_only()
            .column(task_assignee::Column::UserId)
            .filter(task_assignee::Column::TaskId.eq(task_row_id))
            .into_tuple()
            .all(db)
            .await?;
        User::find_by_row_ids(db, &user_row_ids).await
    }

    /// The current assignee uuid set, for diffing before an update.
    pub async fn assignee_ids<C: ConnectionTrait>(
        db: &C,
        task_id: Uuid,
    ) -> Result<HashSet<Uuid>, TaskError> {
        let task_row_id = ids::task_id_by_uuid(db, task_id)
            .await?
            .ok_or(TaskError::NotFound)?;
        let assignees = Self::assignees_by_row_id(db, task_row_id).await?;
        Ok(assignees.into_iter().map(|u| u.id).collect())
    }

    async fn replace_assignees<C: ConnectionTrait>(
        db: &C,
        task_row_id: i64,
        assignees: &[Uuid],
    ) -> Result<(), TaskError> {
        let mut user_row_ids = Vec::with_capacity(assignees.len());
        for user_id in assignees {
            let row_id = ids::user_id_by_uuid(db, *user_id)
                .await?
                .ok_or(TaskError::AssigneeNotFound(*user_id))?;
            user_row_ids.push(row_id);
        }

        task_assignee::Entity::delete_many()
            .filter(task_assignee::Column::TaskId.eq(task_row_id))
            .exec(db)
            .await?;

        let now = Utc::now();
        for user_row_id in user_row_ids {
            let active = task_assignee::ActiveModel {
                task_id: Set(task_row_id),
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
        data: &UpdateTask,
    ) -> Result<Self, TaskError> {
        validate_priority(data.priority)?;
        if let Some(title) = data.title.as_deref()
            && title.trim().is_empty()
        {
            return Err(TaskError::ValidationError("Title is required".to_string()));
        }

        let record = task::Entity::find()
            .filter(task::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(TaskError::NotFound)?;
        let task_row_id = record.id;

        let mut active: task::ActiveModel = record.into();
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
            Self::replace_assignees(db, task_row_id, assignees).await?;
        }
        Self::from_model(db, updated).await.map_err(Into::into)
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = task::Entity::delete_many()
            .filter(task::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
