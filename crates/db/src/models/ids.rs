use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use crate::entities::{task, user, workspace};

pub async fn user_id_by_uuid<C: ConnectionTrait>(db: &C, uuid: Uuid) -> Result<Option<i64>, DbErr> {
    user::Entity::find()
        .select_only()
        .column(user::Column::Id)
        .filter(user::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

pub async fn user_uuid_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Uuid>, DbErr> {
    user::Entity::find()
        .select_only()
        .column(user::Column::Uuid)
        .filter(user::Column::Id.eq(id))
        .into_tuple()
        .one(db)
        .await
}

pub async fn workspace_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    workspace::Entity::find()
        .select_only()
        .column(workspace::Column::Id)
        .filter(workspace::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

pub async fn workspace_uuid_by_id<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> Result<Option<Uuid>, DbErr> {
    workspace::Entity::find()
        .select_only()
        .column(workspace::Column::Uuid)
        .filter(workspace::Column::Id.eq(id))
        .into_tuple()
        .one(db)
        .await
}

pub async fn task_id_by_uuid<C: ConnectionTrait>(db: &C, uuid: Uuid) -> Result<Option<i64>, DbErr> {
    task::Entity::find()
        .select_only()
        .column(task::Column::Id)
        .filter(task::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

pub async fn task_uuid_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Uuid>, DbErr> {
    task::Entity::find()
        .select_only()
        .column(task::Column::Uuid)
        .filter(task::Column::Id.eq(id))
        .into_tuple()
        .one(db)
        .await
}

