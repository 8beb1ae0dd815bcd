use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use super::{
    document::{Document, DocumentWithRelations},
    task::{Task, TaskWithRelations},
};
use crate::entities::workspace;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Workspace not found")]
    NotFound,
    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Workspace with its tasks and documents fully expanded.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct WorkspaceWithRelations {
    #[serde(flatten)]
    #[ts(flatten)]
    pub workspace: Workspace,
    pub tasks: Vec<TaskWithRelations>,
    pub documents: Vec<DocumentWithRelations>,
}

impl std::ops::Deref for WorkspaceWithRelations {
    type Target = Workspace;
    fn deref(&self) -> &Self::Target {
        &self.workspace
    }
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateWorkspace {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateWorkspace {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Workspace {
    fn from_model(model: workspace::Model) -> Self {
        Self {
            id: model.uuid,
            name: model.name,
            description: model.description,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateWorkspace,
        workspace_id: Uuid,
    ) -> Result<Self, WorkspaceError> {
        if data.name.trim().is_empty() {
            return Err(WorkspaceError::ValidationError(
                "Name is required".to_string(),
            ));
        }
        let now = Utc::now();
        let active = workspace::ActiveModel {
            uuid: Set(workspace_id),
            name: Set(data.name.clone()),
            description: Set(data.description.clone()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        Ok(Self::from_model(active.insert(db).await?))
    }

    pub async fn find_all<C: ConnectionTrait>(
        db: &C,
    ) -> Result<Vec<WorkspaceWithRelations>, WorkspaceError> {
        let models = workspace::Entity::find()
            .order_by_desc(workspace::Column::CreatedAt)
            .all(db)
            .await?;
        let mut workspaces = Vec::with_capacity(models.len());
        for model in models {
            workspaces.push(WorkspaceWithRelations::load(db, model).await?);
        }
        Ok(workspaces)
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<Option<WorkspaceWithRelations>, WorkspaceError> {
        let model = workspace::Entity::find()
            .filter(workspace::Column::Uuid.eq(id))
            .one(db)
            .await?;
        match model {
            Some(model) => Ok(Some(WorkspaceWithRelations::load(db, model).await?)),
            None => Ok(None),
        }
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        data: &UpdateWorkspace,
    ) -> Result<Self, WorkspaceError> {
        if let Some(name) = data.name.as_deref()
            && name.trim().is_empty()
        {
            return Err(WorkspaceError::ValidationError(
                "Name is required".to_string(),
            ));
        }
        let record = workspace::Entity::find()
            .filter(workspace::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(WorkspaceError::NotFound)?;

        let mut active: workspace::ActiveModel = record.into();
        if let Some(name) = data.name.clone() {
            active.name = Set(name);
        }
        if let Some(description) = data.description.clone() {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(Utc::now().into());
        Ok(Self::from_model(active.update(db).await?))
    }

    /// Deletes the workspace; tasks, subtasks and documents under it go
    /// with it through the schema's cascades.
    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = workspace::Entity::delete_many()
            .filter(workspace::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}

impl WorkspaceWithRelations {
    async fn load<C: ConnectionTrait>(
        db: &C,
        model: workspace::Model,
    ) -> Result<Self, WorkspaceError> {
        let row_id = model.id;
        let tasks = Task::find_by_workspace_row_id(db, row_id)
            .await
            .map_err(|e| match e {
                crate::models::task::TaskError::Database(db_err) => {
                    WorkspaceError::Database(db_err)
                }
                other => WorkspaceError::ValidationError(other.to_string()),
            })?;
        let documents = Document::find_by_workspace_row_id(db, row_id)
            .await
            .map_err(|e| match e {
                crate::models::document::DocumentError::Database(db_err) => {
                    WorkspaceError::Database(db_err)
                }
                other => WorkspaceError::ValidationError(other.to_string()),
            })?;
        Ok(Self {
            workspace: Workspace::from_model(model),
            tasks,
            documents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DBService,
        models::{
            subtask::Subtask,
            task::{CreateTask, Task},
        },
    };

    async fn memory_db() -> DBService {
        DBService::new_with_url("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn create_and_fetch_round_trip() {
        let db = memory_db().await;
        let id = Uuid::new_v4();
        Workspace::create(
            &db.pool,
            &CreateWorkspace {
                name: "Design".to_string(),
                description: Some("Product design team".to_string()),
            },
            id,
        )
        .await
        .unwrap();

        let loaded = Workspace::find_by_id(&db.pool, id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Design");
        assert!(loaded.tasks.is_empty());
        assert!(loaded.documents.is_empty());
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let db = memory_db().await;
        let err = Workspace::create(
            &db.pool,
            &CreateWorkspace {
                name: "   ".to_string(),
                description: None,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, WorkspaceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn detail_embeds_tasks() {
        let db = memory_db().await;
        let ws = Uuid::new_v4();
        Workspace::create(
            &db.pool,
            &CreateWorkspace {
                name: "Eng".to_string(),
                description: None,
            },
            ws,
        )
        .await
        .unwrap();
        Task::create(
            &db.pool,
            &CreateTask {
                workspace_id: ws,
                title: "Ship it".to_string(),
                description: None,
                priority: None,
                progress: None,
                due_date: None,
                assignees: None,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let loaded = Workspace::find_by_id(&db.pool, ws).await.unwrap().unwrap();
        assert_eq!(loaded.tasks.len(), 1);
        assert_eq!(loaded.tasks[0].title, "Ship it");
    }

    #[tokio::test]
    async fn delete_cascades_to_tasks_and_subtasks() {
        let db = memory_db().await;
        let ws = Uuid::new_v4();
        Workspace::create(
            &db.pool,
            &CreateWorkspace {
                name: "Temp".to_string(),
                description: None,
            },
            ws,
        )
        .await
        .unwrap();
        let task_id = Uuid::new_v4();
        Task::create(
            &db.pool,
            &CreateTask {
                workspace_id: ws,
                title: "Doomed".to_string(),
                description: None,
                priority: None,
                progress: None,
                due_date: None,
                assignees: None,
            },
            task_id,
        )
        .await
        .unwrap();
        let subtask_id = Uuid::new_v4();
        Subtask::create(
            &db.pool,
            &crate::models::subtask::CreateSubtask {
                task_id,
                title: "Also doomed".to_string(),
                description: None,
                priority: None,
                progress: None,
                due_date: None,
                assignees: None,
            },
            subtask_id,
        )
        .await
        .unwrap();

        let rows = Workspace::delete(&db.pool, ws).await.unwrap();
        assert_eq!(rows, 1);
        assert!(Task::find_by_id(&db.pool, task_id).await.unwrap().is_none());
        assert!(
            Subtask::find_by_id(&db.pool, subtask_id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn update_merges_partial_fields() {
        let db = memory_db().await;
        let id = Uuid::new_v4();
        Workspace::create(
            &db.pool,
            &CreateWorkspace {
                name: "Before".to_string(),
                description: Some("keep me".to_string()),
            },
            id,
        )
        .await
        .unwrap();

        let updated = Workspace::update(
            &db.pool,
            id,
            &UpdateWorkspace {
                name: Some("After".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "After");
        assert_eq!(updated.description.as_deref(), Some("keep me"));
    }
}
