use db::models::{comment::Comment, user::User};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("You can only modify your own {0}")]
    NotOwner(&'static str),
}

/// Resources that belong to a single user. Comments are the only
/// owner-gated resource; every other entity is open to any
/// authenticated user.
pub trait Owned {
    const KIND: &'static str;

    fn owner(&self) -> Uuid;
}

impl Owned for Comment {
    const KIND: &'static str = "comments";

    fn owner(&self) -> Uuid {
        self.user_id
    }
}

pub fn ensure_owner<T: Owned>(resource: &T, user: &User) -> Result<(), PolicyError> {
    if resource.owner() == user.id {
        Ok(())
    } else {
        Err(PolicyError::NotOwner(T::KIND))
    }
}
