pub mod comment;
pub mod document;
pub mod document_contributor;
pub mod notification;
pub mod subtask;
pub mod subtask_assignee;
pub mod task;
pub mod task_assignee;
pub mod user;
pub mod workspace;
