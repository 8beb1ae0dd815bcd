pub mod comment;
pub mod document;
pub mod ids;
pub mod notification;
pub mod subtask;
pub mod task;
pub mod user;
pub mod workspace;
