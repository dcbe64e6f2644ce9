//! Route handlers. Every JSON error body is `{"message": ...}`.

pub mod health;
pub mod user_register;
