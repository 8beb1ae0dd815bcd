use std::collections::HashSet;

use db::{
    ConnectionTrait,
    models::{
        notification::{CreateNotification, Notification},
        task::Task,
        user::User,
    },
    types::{NotificationType, RelatedEntity, SubtaskProgress, TaskProgress},
};
use uuid::Uuid;

/// Emits user notifications for task, subtask and comment activity.
///
/// Emission is best effort: a failed insert is logged and swallowed so the
/// triggering request still succeeds.
#[derive(Clone, Default)]
pub struct Notifier;

impl Notifier {
    pub fn new() -> Self {
        Self
    }

    async fn emit<C: ConnectionTrait>(&self, db: &C, data: CreateNotification) {
        if let Err(e) = Notification::create(db, &data, Uuid::new_v4()).await {
            tracing::warn!(
                user_id = %data.user_id,
                notification_type = %data.notification_type,
                "failed to create notification: {e}"
            );
        }
    }

    /// Every assignee of a freshly created task hears about it, the
    /// creator included if they assigned themselves.
    pub async fn task_created<C: ConnectionTrait>(
        &self,
        db: &C,
        actor: &User,
        task: &Task,
        assignees: &HashSet<Uuid>,
    ) {
        for user_id in assignees {
            self.emit(
                db,
                CreateNotification {
                    user_id: *user_id,
                    notification_type: NotificationType::TaskAssigned,
                    message: format!("{} assigned you a task: {}", actor.name, task.title),
                    related: Some(RelatedEntity::Task(task.id)),
                },
            )
            .await;
        }
    }

    /// Diff-aware fan-out after a task update. Assignees added by the
    /// update get an assignment notice, and a transition into `Completed`
    /// tells the whole (new) assignee set, minus whoever completed it.
    /// An update that changes neither emits nothing.
    pub async fn task_updated<C: ConnectionTrait>(
        &self,
        db: &C,
        actor: &User,
        task: &Task,
        old_assignees: &HashSet<Uuid>,
        new_assignees: &HashSet<Uuid>,
        old_progress: &TaskProgress,
    ) {
        for user_id in new_assignees.difference(old_assignees) {
            self.emit(
                db,
                CreateNotification {
                    user_id: *user_id,
                    notification_type: NotificationType::TaskAssigned,
                    message: format!("{} assigned you a task: {}", actor.name, task.title),
                    related: Some(RelatedEntity::Task(task.id)),
                },
            )
            .await;
        }

        let completed =
            task.progress == TaskProgress::Completed && *old_progress != TaskProgress::Completed;
        if !completed {
            return;
        }
        for user_id in new_assignees {
            if *user_id == actor.id {
                continue;
            }
            self.emit(
                db,
                CreateNotification {
                    user_id: *user_id,
                    notification_type: NotificationType::TaskCompleted,
                    message: format!("{} completed task: {}", actor.name, task.title),
                    related: Some(RelatedEntity::Task(task.id)),
                },
            )
            .await;
        }
    }

    /// A new comment notifies the task's assignees, minus the commenter.
    pub async fn comment_added<C: ConnectionTrait>(
        &self,
        db: &C,
        actor: &User,
        task_title: &str,
        comment_id: Uuid,
        assignees: &HashSet<Uuid>,
    ) {
        for user_id in assignees {
            if *user_id == actor.id {
                continue;
            }
            self.emit(
                db,
                CreateNotification {
                    user_id: *user_id,
                    notification_type: NotificationType::CommentAdded,
                    message: format!("{} commented on task: {}", actor.name, task_title),
                    related: Some(RelatedEntity::Comment(comment_id)),
                },
            )
            .await;
        }
    }

    /// A subtask moving into `Completed` notifies the parent task's
    /// assignees, minus whoever completed it.
    pub async fn subtask_completed<C: ConnectionTrait>(
        &self,
        db: &C,
        actor: &User,
        subtask_id: Uuid,
        subtask_title: &str,
        old_progress: &SubtaskProgress,
        new_progress: &SubtaskProgress,
        task_assignees: &HashSet<Uuid>,
    ) {
        if *new_progress != SubtaskProgress::Completed
            || *old_progress == SubtaskProgress::Completed
        {
            return;
        }
        for user_id in task_assignees {
            if *user_id == actor.id {
                continue;
            }
            self.emit(
                db,
                CreateNotification {
                    user_id: *user_id,
                    notification_type: NotificationType::SubtaskCompleted,
                    message: format!("{} completed subtask: {}", actor.name, subtask_title),
                    related: Some(RelatedEntity::Subtask(subtask_id)),
                },
            )
            .await;
        }
    }

    /// A document shared with contributors notifies each of them, minus
    /// the author doing the sharing.
    pub async fn document_shared<C: ConnectionTrait>(
        &self,
        db: &C,
        actor: &User,
        document_id: Uuid,
        document_title: &str,
        contributors: &HashSet<Uuid>,
    ) {
        for user_id in contributors {
            if *user_id == actor.id {
                continue;
            }
            self.emit(
                db,
                CreateNotification {
                    user_id: *user_id,
                    notification_type: NotificationType::DocumentShared,
                    message: format!(
                        "{} shared a document with you: {}",
                        actor.name, document_title
                    ),
                    related: Some(RelatedEntity::Document(document_id)),
                },
            )
            .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::{
        DBService,
        models::{
            task::{CreateTask, Task},
            user::{CreateUser, User},
            workspace::{CreateWorkspace, Workspace},
        },
    };

    async fn memory_db() -> DBService {
        DBService::new_with_url("sqlite::memory:").await.unwrap()
    }

    async fn seed_user(db: &DBService, name: &str, email: &str) -> User {
        User::create(
            &db.pool,
            &CreateUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash: "h".to_string(),
                image: None,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap()
    }

    async fn seed_task(db: &DBService, title: &str) -> Task {
        let ws = Uuid::new_v4();
        Workspace::create(
            &db.pool,
            &CreateWorkspace {
                name: "WS".to_string(),
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
                title: title.to_string(),
                description: None,
                priority: None,
                progress: None,
                due_date: None,
                assignees: None,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn task_created_notifies_every_assignee_including_the_actor() {
        let db = memory_db().await;
        let actor = seed_user(&db, "Ada", "ada@example.com").await;
        let other = seed_user(&db, "Grace", "grace@example.com").await;
        let task = seed_task(&db, "Ship it").await;

        let assignees: HashSet<Uuid> = [actor.id, other.id].into_iter().collect();
        Notifier::new()
            .task_created(&db.pool, &actor, &task, &assignees)
            .await;

        // Self-assignment still produces an assignment notice.
        let own = Notification::find_by_user(&db.pool, actor.id).await.unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].notification_type, NotificationType::TaskAssigned);
        let theirs = Notification::find_by_user(&db.pool, other.id).await.unwrap();
        assert_eq!(theirs.len(), 1);
        assert_eq!(theirs[0].message, "Ada assigned you a task: Ship it");
        assert_eq!(theirs[0].notification_type, NotificationType::TaskAssigned);
    }

    #[tokio::test]
    async fn task_updated_only_notifies_newly_added_assignees() {
        let db = memory_db().await;
        let actor = seed_user(&db, "Ada", "ada@example.com").await;
        let veteran = seed_user(&db, "Grace", "grace@example.com").await;
        let rookie = seed_user(&db, "Edsger", "edsger@example.com").await;
        let task = seed_task(&db, "Refactor").await;

        let old: HashSet<Uuid> = [veteran.id].into_iter().collect();
        let new: HashSet<Uuid> = [veteran.id, rookie.id].into_iter().collect();
        Notifier::new()
            .task_updated(&db.pool, &actor, &task, &old, &new, &TaskProgress::Todo)
            .await;

        assert!(
            Notification::find_by_user(&db.pool, veteran.id)
                .await
                .unwrap()
                .is_empty()
        );
        let rookie_inbox = Notification::find_by_user(&db.pool, rookie.id).await.unwrap();
        assert_eq!(rookie_inbox.len(), 1);
        assert_eq!(
            rookie_inbox[0].notification_type,
            NotificationType::TaskAssigned
        );
    }

    #[tokio::test]
    async fn unchanged_update_emits_nothing() {
        let db = memory_db().await;
        let actor = seed_user(&db, "Ada", "ada@example.com").await;
        let other = seed_user(&db, "Grace", "grace@example.com").await;
        let task = seed_task(&db, "Steady state").await;

        let set: HashSet<Uuid> = [other.id].into_iter().collect();
        Notifier::new()
            .task_updated(&db.pool, &actor, &task, &set, &set, &TaskProgress::Todo)
            .await;

        assert!(
            Notification::find_by_user(&db.pool, other.id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn completion_notifies_the_new_assignee_set() {
        let db = memory_db().await;
        let actor = seed_user(&db, "Ada", "ada@example.com").await;
        let veteran = seed_user(&db, "Grace", "grace@example.com").await;
        let rookie = seed_user(&db, "Edsger", "edsger@example.com").await;
        let mut task = seed_task(&db, "Finish line").await;
        task.progress = TaskProgress::Completed;

        let old: HashSet<Uuid> = [veteran.id].into_iter().collect();
        let new: HashSet<Uuid> = [veteran.id, rookie.id].into_iter().collect();
        Notifier::new()
            .task_updated(&db.pool, &actor, &task, &old, &new, &TaskProgress::InProgress)
            .await;

        let veteran_inbox = Notification::find_by_user(&db.pool, veteran.id)
            .await
            .unwrap();
        assert_eq!(veteran_inbox.len(), 1);
        assert_eq!(
            veteran_inbox[0].notification_type,
            NotificationType::TaskCompleted
        );
        assert_eq!(veteran_inbox[0].message, "Ada completed task: Finish line");

        // Added in the completing update: assigned and completed both land.
        let rookie_types: HashSet<NotificationType> =
            Notification::find_by_user(&db.pool, rookie.id)
                .await
                .unwrap()
                .into_iter()
                .map(|n| n.notification_type)
                .collect();
        assert_eq!(
            rookie_types,
            [
                NotificationType::TaskAssigned,
                NotificationType::TaskCompleted
            ]
            .into_iter()
            .collect()
        );
    }

    #[tokio::test]
    async fn subtask_completion_requires_a_transition() {
        let db = memory_db().await;
        let actor = seed_user(&db, "Ada", "ada@example.com").await;
        let other = seed_user(&db, "Grace", "grace@example.com").await;
        let set: HashSet<Uuid> = [other.id].into_iter().collect();
        let subtask_id = Uuid::new_v4();

        let notifier = Notifier::new();
        notifier
            .subtask_completed(
                &db.pool,
                &actor,
                subtask_id,
                "Wire it",
                &SubtaskProgress::Completed,
                &SubtaskProgress::Completed,
                &set,
            )
            .await;
        assert!(
            Notification::find_by_user(&db.pool, other.id)
                .await
                .unwrap()
                .is_empty()
        );

        notifier
            .subtask_completed(
                &db.pool,
                &actor,
                subtask_id,
                "Wire it",
                &SubtaskProgress::Review,
                &SubtaskProgress::Completed,
                &set,
            )
            .await;
        let inbox = Notification::find_by_user(&db.pool, other.id).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(
            inbox[0].notification_type,
            NotificationType::SubtaskCompleted
        );
    }

    #[tokio::test]
    async fn failed_emission_does_not_propagate() {
        let db = memory_db().await;
        let actor = seed_user(&db, "Ada", "ada@example.com").await;
        let task = seed_task(&db, "Ghost town").await;

        // Recipient does not exist; the emit is dropped silently.
        let ghost: HashSet<Uuid> = [Uuid::new_v4()].into_iter().collect();
        Notifier::new()
            .task_created(&db.pool, &actor, &task, &ghost)
            .await;
    }
}
