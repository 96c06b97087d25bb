//! Shopfront: REST backend for goods, categories and users with soft delete, audit stamping and
//! a uniform `{code, message, data}` response envelope.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{Settings, StoreBackend};
pub use error::{AppError, ConfigError};
pub use migration::{apply_migrations, ensure_database_exists};
pub use response::{ApiResponse, PageData};
pub use routes::app;
pub use state::AppState;
pub use store::{AuditStamper, MemoryStore, PgStore, Store};
