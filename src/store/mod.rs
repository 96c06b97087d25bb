//! Persistence gateway: the only code that reads or writes storage.
//!
//! A [`Store`] hands out [`Session`]s. Every read on a session applies the soft-delete filter
//! from [`policy`], and every write is stamped by [`AuditStamper`] before it reaches the driver.
//! A session opened with [`Store::begin`] is all-or-nothing: dropping it without
//! [`Session::commit`] discards its writes.

pub mod audit;
mod memory;
pub mod policy;
mod postgres;
mod query;

pub use audit::{AuditStamper, Clock, SystemClock};
pub use memory::{MemorySession, MemoryStore};
pub use postgres::{PgSession, PgStore};
pub use query::{Filter, ListQuery, Order, Window};

use crate::error::AppError;
use crate::model::{Entity, ID_COLUMN};
use crate::sql::FieldValue;
use async_trait::async_trait;

#[async_trait]
pub trait Store: Clone + Send + Sync + 'static {
    type Session: Session;

    /// Opens a transactional session.
    async fn begin(&self) -> Result<Self::Session, AppError>;

    /// Opens a session for reads only; nothing needs to be committed.
    async fn connect(&self) -> Result<Self::Session, AppError>;

    /// Cheap liveness probe for readiness checks.
    async fn ping(&self) -> Result<(), AppError>;
}

#[async_trait]
pub trait Session: Send {
    /// Assigns identity and both audit timestamps. `None` when the write affected no row.
    async fn insert<E: Entity>(&mut self, entity: E) -> Result<Option<E>, AppError>;

    /// Live entity by id; soft-deleted and missing ids are indistinguishable.
    async fn find_by_id<E: Entity>(&mut self, id: i64) -> Result<Option<E>, AppError>;

    async fn list<E: Entity>(&mut self, query: &ListQuery) -> Result<Vec<E>, AppError>;

    /// Number of live rows matching every filter.
    async fn count<E: Entity>(&mut self, filters: &[Filter]) -> Result<u64, AppError>;

    /// Refreshes `update_time` on `entity` and persists all of its business values.
    /// Returns rows affected; zero when the row is gone or was deleted meanwhile.
    async fn update<E: Entity>(&mut self, entity: &mut E) -> Result<u64, AppError>;

    /// Flags a live row as deleted. Returns rows affected; zero for an already deleted id.
    async fn soft_delete<E: Entity>(&mut self, id: i64) -> Result<u64, AppError>;

    /// Live rows holding `value` in `column`, optionally ignoring one id.
    async fn count_by_unique_field<E: Entity>(
        &mut self,
        column: &'static str,
        value: &FieldValue,
        exclude_id: Option<i64>,
    ) -> Result<u64, AppError> {
        let mut filters = vec![Filter::Eq(column, value.clone())];
        if let Some(id) = exclude_id {
            filters.push(Filter::Ne(ID_COLUMN, FieldValue::BigInt(id)));
        }
        self.count::<E>(&filters).await
    }

    async fn commit(self) -> Result<(), AppError>;
}
