//! HTTP handlers. Each one extracts, calls a single service operation and wraps the result in
//! the response envelope; failures render through [`crate::error::AppError`].

pub mod categories;
pub mod goods;
pub mod resource;
pub mod users;

pub use resource::not_found;
