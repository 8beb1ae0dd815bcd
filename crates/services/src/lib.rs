pub mod notify;
pub mod policy;
