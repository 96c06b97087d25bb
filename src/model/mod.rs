//! Persisted entities: goods, categories and users.
//!
//! Every entity carries a store-assigned `id` and an [`Audit`] pair. The deletion flag is a
//! storage concern and never appears on the Rust side; see [`crate::store::policy`].

mod category;
mod good;
mod patch;
mod user;

pub use category::{Category, CreateCategory, UpdateCategory, SORT_ORDER_COLUMN};
pub use good::{CreateGood, Good, UpdateGood, PRICE_COLUMN};
pub use patch::Patch;
pub use user::{
    CreateUser, UpdateUser, User, DEFAULT_ROLE, DEFAULT_STATUS, ROLE_COLUMN, STATUS_COLUMN,
    USERNAME_COLUMN,
};

use crate::sql::FieldValue;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::FromRow;

pub const ID_COLUMN: &str = "id";
pub const CREATE_TIME_COLUMN: &str = "create_time";
pub const UPDATE_TIME_COLUMN: &str = "update_time";

/// Creation and last-write timestamps. Only the audit stamper assigns these.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

/// Shape of a persisted entity as the persistence gateway sees it.
pub trait Entity: Clone + Send + Sync + Unpin + 'static + for<'r> FromRow<'r, PgRow> {
    /// Backing table.
    const TABLE: &'static str;
    /// Business columns in the order [`Entity::values`] yields them. Excludes id, audit pair and deletion flag.
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
    fn audit(&self) -> &Audit;
    fn audit_mut(&mut self) -> &mut Audit;

    /// Current business values, aligned with [`Entity::COLUMNS`].
    fn values(&self) -> Vec<FieldValue>;

    /// Value of any selectable column by name.
    fn field(&self, column: &str) -> Option<FieldValue> {
        match column {
            ID_COLUMN => Some(FieldValue::BigInt(self.id())),
            CREATE_TIME_COLUMN => Some(FieldValue::Timestamp(self.audit().create_time)),
            UPDATE_TIME_COLUMN => Some(FieldValue::Timestamp(self.audit().update_time)),
            _ => {
                let idx = Self::COLUMNS.iter().position(|c| *c == column)?;
                self.values().into_iter().nth(idx)
            }
        }
    }
}
