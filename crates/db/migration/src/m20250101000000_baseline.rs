use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Users::Table)
                    .col(pk_id_col(manager, Users::Id))
                    .col(uuid_col(Users::Uuid))
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Image).string())
                    .col(timestamp_col(Users::CreatedAt))
                    .col(timestamp_col(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_users_uuid")
                    .table(Users::Table)
                    .col(Users::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Workspaces::Table)
                    .col(pk_id_col(manager, Workspaces::Id))
                    .col(uuid_col(Workspaces::Uuid))
                    .col(ColumnDef::new(Workspaces::Name).string().not_null())
                    .col(ColumnDef::new(Workspaces::Description).text())
                    .col(timestamp_col(Workspaces::CreatedAt))
                    .col(timestamp_col(Workspaces::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_workspaces_uuid")
                    .table(Workspaces::Table)
                    .col(Workspaces::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Tasks::Table)
                    .col(pk_id_col(manager, Tasks::Id))
                    .col(uuid_col(Tasks::Uuid))
                    .col(fk_id_col(manager, Tasks::WorkspaceId))
                    .col(ColumnDef::new(Tasks::Title).string().not_null())
                    .col(ColumnDef::new(Tasks::Description).text())
                    .col(ColumnDef::new(Tasks::Priority).integer())
                    .col(
                        ColumnDef::new(Tasks::Progress)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("To Do")),
                    )
                    .col(ColumnDef::new(Tasks::DueDate).timestamp())
                    .col(timestamp_col(Tasks::CreatedAt))
                    .col(timestamp_col(Tasks::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_workspace_id")
                            .from(Tasks::Table, Tasks::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_tasks_uuid")
                    .table(Tasks::Table)
                    .col(Tasks::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_tasks_workspace_id")
                    .table(Tasks::Table)
                    .col(Tasks::WorkspaceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Subtasks::Table)
                    .col(pk_id_col(manager, Subtasks::Id))
                    .col(uuid_col(Subtasks::Uuid))
                    .col(fk_id_col(manager, Subtasks::TaskId))
                    .col(ColumnDef::new(Subtasks::Title).string().not_null())
                    .col(ColumnDef::new(Subtasks::Description).text())
                    .col(ColumnDef::new(Subtasks::Priority).integer())
                    .col(
                        ColumnDef::new(Subtasks::Progress)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("To Do")),
                    )
                    .col(ColumnDef::new(Subtasks::DueDate).timestamp())
                    .col(timestamp_col(Subtasks::CreatedAt))
                    .col(timestamp_col(Subtasks::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subtasks_task_id")
                            .from(Subtasks::Table, Subtasks::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_subtasks_uuid")
                    .table(Subtasks::Table)
                    .col(Subtasks::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_subtasks_task_id")
                    .table(Subtasks::Table)
                    .col(Subtasks::TaskId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Documents::Table)
                    .col(pk_id_col(manager, Documents::Id))
                    .col(uuid_col(Documents::Uuid))
                    .col(fk_id_col(manager, Documents::WorkspaceId))
                    .col(fk_id_col(manager, Documents::AuthorId))
                    .col(ColumnDef::new(Documents::Title).string().not_null())
                    .col(ColumnDef::new(Documents::Description).text())
                    .col(timestamp_col(Documents::CreatedAt))
                    .col(timestamp_col(Documents::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_documents_workspace_id")
                            .from(Documents::Table, Documents::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_documents_author_id")
                            .from(Documents::Table, Documents::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_documents_uuid")
                    .table(Documents::Table)
                    .col(Documents::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_documents_workspace_id")
                    .table(Documents::Table)
                    .col(Documents::WorkspaceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Comments::Table)
                    .col(pk_id_col(manager, Comments::Id))
                    .col(uuid_col(Comments::Uuid))
                    .col(fk_id_col(manager, Comments::TaskId))
                    .col(fk_id_col(manager, Comments::UserId))
                    .col(ColumnDef::new(Comments::Content).text().not_null())
                    .col(timestamp_col(Comments::CreatedAt))
                    .col(timestamp_col(Comments::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_task_id")
                            .from(Comments::Table, Comments::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_user_id")
                            .from(Comments::Table, Comments::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_comments_uuid")
                    .table(Comments::Table)
                    .col(Comments::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_comments_task_id")
                    .table(Comments::Table)
                    .col(Comments::TaskId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Notifications::Table)
                    .col(pk_id_col(manager, Notifications::Id))
                    .col(uuid_col(Notifications::Uuid))
                    .col(fk_id_col(manager, Notifications::UserId))
                    .col(
                        ColumnDef::new(Notifications::NotificationType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Notifications::Message).text().not_null())
                    .col(
                        ColumnDef::new(Notifications::IsRead)
                            .boolean()
                            .not_null()
                            .default(Expr::val(false)),
                    )
                    .col(ColumnDef::new(Notifications::RelatedType).string_len(32))
                    .col(uuid_nullable_col(Notifications::RelatedUuid))
                    .col(timestamp_col(Notifications::CreatedAt))
                    .col(timestamp_col(Notifications::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notifications_user_id")
                            .from(Notifications::Table, Notifications::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_notifications_uuid")
                    .table(Notifications::Table)
                    .col(Notifications::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_notifications_user_id")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(TaskAssignees::Table)
                    .col(pk_id_col(manager, TaskAssignees::Id))
                    .col(fk_id_col(manager, TaskAssignees::TaskId))
                    .col(fk_id_col(manager, TaskAssignees::UserId))
                    .col(timestamp_col(TaskAssignees::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_assignees_task_id")
                            .from(TaskAssignees::Table, TaskAssignees::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_assignees_user_id")
                            .from(TaskAssignees::Table, TaskAssignees::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_task_assignees_task_user")
                    .table(TaskAssignees::Table)
                    .col(TaskAssignees::TaskId)
                    .col(TaskAssignees::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(SubtaskAssignees::Table)
                    .col(pk_id_col(manager, SubtaskAssignees::Id))
                    .col(fk_id_col(manager, SubtaskAssignees::SubtaskId))
                    .col(fk_id_col(manager, SubtaskAssignees::UserId))
                    .col(timestamp_col(SubtaskAssignees::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subtask_assignees_subtask_id")
                            .from(SubtaskAssignees::Table, SubtaskAssignees::SubtaskId)
                            .to(Subtasks::Table, Subtasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subtask_assignees_user_id")
                            .from(SubtaskAssignees::Table, SubtaskAssignees::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_subtask_assignees_subtask_user")
                    .table(SubtaskAssignees::Table)
                    .col(SubtaskAssignees::SubtaskId)
                    .col(SubtaskAssignees::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(DocumentContributors::Table)
                    .col(pk_id_col(manager, DocumentContributors::Id))
                    .col(fk_id_col(manager, DocumentContributors::DocumentId))
                    .col(fk_id_col(manager, DocumentContributors::UserId))
                    .col(timestamp_col(DocumentContributors::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_document_contributors_document_id")
                            .from(
                                DocumentContributors::Table,
                                DocumentContributors::DocumentId,
                            )
                            .to(Documents::Table, Documents::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_document_contributors_user_id")
                            .from(DocumentContributors::Table, DocumentContributors::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_document_contributors_document_user")
                    .table(DocumentContributors::Table)
                    .col(DocumentContributors::DocumentId)
                    .col(DocumentContributors::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Table::drop().table(DocumentContributors::Table).to_owned(),
            Table::drop().table(SubtaskAssignees::Table).to_owned(),
            Table::drop().table(TaskAssignees::Table).to_owned(),
            Table::drop().table(Notifications::Table).to_owned(),
            Table::drop().table(Comments::Table).to_owned(),
            Table::drop().table(Documents::Table).to_owned(),
            Table::drop().table(Subtasks::Table).to_owned(),
            Table::drop().table(Tasks::Table).to_owned(),
            Table::drop().table(Workspaces::Table).to_owned(),
            Table::drop().table(Users::Table).to_owned(),
        ] {
            manager.drop_table(table).await?;
        }
        Ok(())
    }
}

fn pk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().auto_increment().primary_key().to_owned()
}

fn fk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().to_owned()
}

fn uuid_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().to_owned()
}

fn uuid_nullable_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().to_owned()
}

fn timestamp_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Uuid,
    Name,
    Email,
    PasswordHash,
    Image,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Workspaces {
    Table,
    Id,
    Uuid,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Tasks {
    Table,
    Id,
    Uuid,
    WorkspaceId,
    Title,
    Description,
    Priority,
    Progress,
    DueDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Subtasks {
    Table,
    Id,
    Uuid,
    TaskId,
    Title,
    Description,
    Priority,
    Progress,
    DueDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Documents {
    Table,
    Id,
    Uuid,
    WorkspaceId,
    AuthorId,
    Title,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Comments {
    Table,
    Id,
    Uuid,
    TaskId,
    UserId,
    Content,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Notifications {
    Table,
    Id,
    Uuid,
    UserId,
    NotificationType,
    Message,
    IsRead,
    RelatedType,
    RelatedUuid,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum TaskAssignees {
    Table,
    Id,
    TaskId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum SubtaskAssignees {
    Table,
    Id,
    SubtaskId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum DocumentContributors {
    Table,
    Id,
    DocumentId,
    UserId,
    CreatedAt,
}
