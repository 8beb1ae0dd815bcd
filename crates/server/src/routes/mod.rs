pub mod comments;
pub mod documents;
pub mod health;
pub mod notifications;
pub mod subtasks;
pub mod tasks;
pub mod users;
pub mod workspaces;
