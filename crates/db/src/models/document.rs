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
    entities::{document, document_contributor},
    models::ids,
};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Document not found")]
    NotFound,
    #[error("Workspace not found")]
    WorkspaceNotFound,
    #[error("Author not found")]
    AuthorNotFound,
    #[error("Contributor not found: {0}")]
    ContributorNotFound(Uuid),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Document {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct DocumentWithRelations {
    #[serde(flatten)]
    #[ts(flatten)]
    pub document: Document,
    pub author: User,
    pub contributors: Vec<User>,
}

impl std::ops::Deref for DocumentWithRelations {
    type Target = Document;
    fn deref(&self) -> &Self::Target {
        &self.document
    }
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateDocument {
    pub workspace_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub contributors: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateDocument {
    pub title: Option<String>,
    pub description: Option<String>,
    /// When present, replaces the whole contributor set.
    pub contributors: Option<Vec<Uuid>>,
}

impl Document {
    fn from_model(model: &document::Model, workspace_id: Uuid) -> Self {
        Self {
            id: model.uuid,
            workspace_id,
            title: model.title.clone(),
            description: model.description.clone(),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateDocument,
        author: Uuid,
        document_id: Uuid,
    ) -> Result<DocumentWithRelations, DocumentError> {
        if data.title.trim().is_empty() {
            return Err(DocumentError::ValidationError(
                "Title is required".to_string(),
            ));
        }
        let workspace_row_id = ids::workspace_id_by_uuid(db, data.workspace_id)
            .await?
            .ok_or(DocumentError::WorkspaceNotFound)?;
        let author_row_id = ids::user_id_by_uuid(db, author)
            .await?
            .ok_or(DocumentError::AuthorNotFound)?;

        let now = Utc::now();
        let active = document::ActiveModel {
            uuid: Set(document_id),
            workspace_id: Set(workspace_row_id),
            author_id: Set(author_row_id),
            title: Set(data.title.clone()),
            description: Set(data.description.clone()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        let model = active.insert(db).await?;

        if let Some(contributors) = &data.contributors {
            Self::replace_contributors(db, model.id, contributors).await?;
        }
        DocumentWithRelations::load(db, model).await
    }

    pub async fn find_all<C: ConnectionTrait>(
        db: &C,
    ) -> Result<Vec<DocumentWithRelations>, DocumentError> {
        let models = document::Entity::find()
            .order_by_desc(document::Column::CreatedAt)
            .all(db)
            .await?;
        let mut documents = Vec::with_capacity(models.len());
        for model in models {
            documents.push(DocumentWithRelations::load(db, model).await?);
        }
        Ok(documents)
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<Option<DocumentWithRelations>, DocumentError> {
        let model = document::Entity::find()
            .filter(document::Column::Uuid.eq(id))
            .one(db)
            .await?;
        match model {
            Some(model) => Ok(Some(DocumentWithRelations::load(db, model).await?)),
            None => Ok(None),
        }
    }

    pub(crate) async fn find_by_workspace_row_id<C: ConnectionTrait>(
        db: &C,
        workspace_row_id: i64,
    ) -> Result<Vec<DocumentWithRelations>, DocumentError> {
        let models = document::Entity::find()
            .filter(document::Column::WorkspaceId.eq(workspace_row_id))
            .order_by_desc(document::Column::CreatedAt)
            .all(db)
            .await?;
        let mut documents = Vec::with_capacity(models.len());
        for model in models {
            documents.push(DocumentWithRelations::load(db, model).await?);
        }
        Ok(documents)
    }

    async fn replace_contributors<C: ConnectionTrait>(
        db: &C,
        document_row_id: i64,
        contributors: &[Uuid],
    ) -> Result<(), DocumentError> {
        let mut user_row_ids = Vec::with_capacity(contributors.len());
        for user_id in contributors {
            let row_id = ids::user_id_by_uuid(db, *user_id)
                .await?
                .ok_or(DocumentError::ContributorNotFound(*user_id))?;
            user_row_ids.push(row_id);
        }

        document_contributor::Entity::delete_many()
            .filter(document_contributor::Column::DocumentId.eq(document_row_id))
            .exec(db)
            .await?;

        let now = Utc::now();
        for user_row_id in user_row_ids {
            let active = document_contributor::ActiveModel {
                document_id: Set(document_row_id),
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
        data: &UpdateDocument,
    ) -> Result<DocumentWithRelations, DocumentError> {
        if let Some(title) = data.title.as_deref()
            && title.trim().is_empty()
        {
            return Err(DocumentError::ValidationError(
                "Title is required".to_string(),
            ));
        }
        let record = document::Entity::find()
            .filter(document::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(DocumentError::NotFound)?;
        let document_row_id = record.id;

        let mut active: document::ActiveModel = record.into();
        if let Some(title) = data.title.clone() {
            active.title = Set(title);
        }
        if let Some(description) = data.description.clone() {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(db).await?;

        if let Some(contributors) = &data.contributors {
            Self::replace_contributors(db, document_row_id, contributors).await?;
        }
        DocumentWithRelations::load(db, updated).await
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = document::Entity::delete_many()
            .filter(document::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}

impl DocumentWithRelations {
    async fn load<C: ConnectionTrait>(
        db: &C,
        model: document::Model,
    ) -> Result<Self, DocumentError> {
        let workspace_id = ids::workspace_uuid_by_id(db, model.workspace_id)
            .await?
            .ok_or(DocumentError::WorkspaceNotFound)?;
        let author = User::find_by_row_ids(db, &[model.author_id])
            .await?
            .pop()
            .ok_or(DocumentError::AuthorNotFound)?;
        let contributor_row_ids: Vec<i64> = document_contributor::Entity::find()
            .select_only()
            .column(document_contributor::Column::UserId)
            .filter(document_contributor::Column::DocumentId.eq(model.id))
            .into_tuple()
            .all(db)
            .await?;
        let contributors = User::find_by_row_ids(db, &contributor_row_ids).await?;
        let document = Document::from_model(&model, workspace_id);
        Ok(Self {
            document,
            author,
            contributors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DBService,
        models::{
            user::{CreateUser, User},
            workspace::{CreateWorkspace, Workspace},
        },
    };

    async fn memory_db() -> DBService {
        DBService::new_with_url("sqlite::memory:").await.unwrap()
    }

    async fn seed(db: &DBService) -> (Uuid, Uuid) {
        let ws = Uuid::new_v4();
        Workspace::create(
            &db.pool,
            &CreateWorkspace {
                name: "Docs".to_string(),
                description: None,
            },
            ws,
        )
        .await
        .unwrap();
        let author = Uuid::new_v4();
        User::create(
            &db.pool,
            &CreateUser {
                name: "Author".to_string(),
                email: "author@example.com".to_string(),
                password_hash: "h".to_string(),
                image: None,
            },
            author,
        )
        .await
        .unwrap();
        (ws, author)
    }

    #[tokio::test]
    async fn create_embeds_author() {
        let db = memory_db().await;
        let (ws, author) = seed(&db).await;
        let doc = Document::create(
            &db.pool,
            &CreateDocument {
                workspace_id: ws,
                title: "Runbook".to_string(),
                description: None,
                contributors: None,
            },
            author,
            Uuid::new_v4(),
        )
        .await
        .unwrap();
        assert_eq!(doc.author.id, author);
        assert!(doc.contributors.is_empty());
        assert_eq!(doc.workspace_id, ws);
    }

    #[tokio::test]
    async fn ghost_contributor_is_rejected() {
        let db = memory_db().await;
        let (ws, author) = seed(&db).await;
        let ghost = Uuid::new_v4();
        let err = Document::create(
            &db.pool,
            &CreateDocument {
                workspace_id: ws,
                title: "Runbook".to_string(),
                description: None,
                contributors: Some(vec![ghost]),
            },
            author,
            Uuid::new_v4(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DocumentError::ContributorNotFound(id) if id == ghost));
    }

    #[tokio::test]
    async fn contributor_set_replace_on_update() {
        let db = memory_db().await;
        let (ws, author) = seed(&db).await;
        let other = Uuid::new_v4();
        User::create(
            &db.pool,
            &CreateUser {
                name: "Other".to_string(),
                email: "other@example.com".to_string(),
                password_hash: "h".to_string(),
                image: None,
            },
            other,
        )
        .await
        .unwrap();

        let doc_id = Uuid::new_v4();
        Document::create(
            &db.pool,
            &CreateDocument {
                workspace_id: ws,
                title: "Guide".to_string(),
                description: None,
                contributors: Some(vec![author]),
            },
            author,
            doc_id,
        )
        .await
        .unwrap();

        let updated = Document::update(
            &db.pool,
            doc_id,
            &UpdateDocument {
                contributors: Some(vec![other]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.contributors.len(), 1);
        assert_eq!(updated.contributors[0].id, other);
    }

    #[tokio::test]
    async fn deleting_workspace_removes_documents() {
        let db = memory_db().await;
        let (ws, author) = seed(&db).await;
        let doc_id = Uuid::new_v4();
        Document::create(
            &db.pool,
            &CreateDocument {
                workspace_id: ws,
                title: "Ephemeral".to_string(),
                description: None,
                contributors: None,
            },
            author,
            doc_id,
        )
        .await
        .unwrap();

        Workspace::delete(&db.pool, ws).await.unwrap();
        assert!(
            Document::find_by_id(&db.pool, doc_id)
                .await
                .unwrap()
                .is_none()
        );
    }
}
