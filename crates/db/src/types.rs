use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Workflow stage of a task.
#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    TS,
    EnumString,
    Display,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum TaskProgress {
    #[default]
    #[sea_orm(string_value = "To Do")]
    #[serde(rename = "To Do")]
    #[strum(serialize = "To Do")]
    Todo,
    #[sea_orm(string_value = "In Progress")]
    #[serde(rename = "In Progress")]
    #[strum(serialize = "In Progress")]
    InProgress,
    #[sea_orm(string_value = "In Review")]
    #[serde(rename = "In Review")]
    #[strum(serialize = "In Review")]
    InReview,
    #[sea_orm(string_value = "Completed")]
    #[serde(rename = "Completed")]
    #[strum(serialize = "Completed")]
    Completed,
}

/// Workflow stage of a subtask. Deliberately a different vocabulary than
/// [`TaskProgress`] ("In Development"/"Review" instead of
/// "In Progress"/"In Review"); the two stay separate types so the kanban
/// columns for each level keep their own labels.
#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    TS,
    EnumString,
    Display,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum SubtaskProgress {
    #[default]
    #[sea_orm(string_value = "To Do")]
    #[serde(rename = "To Do")]
    #[strum(serialize = "To Do")]
    Todo,
    #[sea_orm(string_value = "In Development")]
    #[serde(rename = "In Development")]
    #[strum(serialize = "In Development")]
    InDevelopment,
    #[sea_orm(string_value = "Review")]
    #[serde(rename = "Review")]
    #[strum(serialize = "Review")]
    Review,
    #[sea_orm(string_value = "Completed")]
    #[serde(rename = "Completed")]
    #[strum(serialize = "Completed")]
    Completed,
}

#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    TS,
    EnumString,
    Display,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    #[sea_orm(string_value = "TASK_ASSIGNED")]
    TaskAssigned,
    #[sea_orm(string_value = "TASK_UPDATED")]
    TaskUpdated,
    #[sea_orm(string_value = "TASK_COMPLETED")]
    TaskCompleted,
    #[sea_orm(string_value = "COMMENT_ADDED")]
    CommentAdded,
    #[sea_orm(string_value = "DOCUMENT_SHARED")]
    DocumentShared,
    #[sea_orm(string_value = "WORKSPACE_INVITATION")]
    WorkspaceInvitation,
    #[sea_orm(string_value = "DEADLINE_APPROACHING")]
    DeadlineApproaching,
    #[sea_orm(string_value = "SUBTASK_COMPLETED")]
    SubtaskCompleted,
}

/// Entity a notification points back at. Stored as a type/uuid column
/// pair but modeled as a tagged union so a notification can never carry a
/// related id with an unknown kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "related_type", content = "related_id")]
pub enum RelatedEntity {
    Task(Uuid),
    Subtask(Uuid),
    Comment(Uuid),
    Document(Uuid),
    Workspace(Uuid),
}

impl RelatedEntity {
    pub fn kind(&self) -> &'static str {
        match self {
            RelatedEntity::Task(_) => "Task",
            RelatedEntity::Subtask(_) => "Subtask",
            RelatedEntity::Comment(_) => "Comment",
            RelatedEntity::Document(_) => "Document",
            RelatedEntity::Workspace(_) => "Workspace",
        }
    }

    pub fn uuid(&self) -> Uuid {
        match self {
            RelatedEntity::Task(id)
            | RelatedEntity::Subtask(id)
            | RelatedEntity::Comment(id)
            | RelatedEntity::Document(id)
            | RelatedEntity::Workspace(id) => *id,
        }
    }

    /// Rebuild from the stored column pair. Unknown kinds decode to
    /// `None` instead of failing the whole row read.
    pub fn from_columns(kind: Option<&str>, uuid: Option<Uuid>) -> Option<Self> {
        match (kind?, uuid?) {
            ("Task", id) => Some(RelatedEntity::Task(id)),
            ("Subtask", id) => Some(RelatedEntity::Subtask(id)),
            ("Comment", id) => Some(RelatedEntity::Comment(id)),
            ("Document", id) => Some(RelatedEntity::Document(id)),
            ("Workspace", id) => Some(RelatedEntity::Workspace(id)),
            _ => None,
        }
    }
}
