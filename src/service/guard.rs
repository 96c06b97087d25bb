//! Pre-write uniqueness check.
//!
//! Check-then-act: two concurrent writers can both pass before either commits. The partial unique
//! index created by the migrations is the backstop for that window.

use crate::error::AppError;
use crate::model::Entity;
use crate::sql::FieldValue;
use crate::store::Session;

/// A value that must not appear on any other live row.
#[derive(Clone, Debug, PartialEq)]
pub struct UniqueKey {
    pub column: &'static str,
    /// Name used in the conflict message.
    pub label: &'static str,
    pub value: FieldValue,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct UniquenessGuard;

impl UniquenessGuard {
    /// Fails with `Conflict` on the first key already held by a live row other than `exclude_id`.
    pub async fn check<E: Entity, T: Session>(
        &self,
        session: &mut T,
        keys: &[UniqueKey],
        exclude_id: Option<i64>,
    ) -> Result<(), AppError> {
        for key in keys {
            let taken = session
                .count_by_unique_field::<E>(key.column, &key.value, exclude_id)
                .await?;
            if taken > 0 {
                tracing::warn!(table = E::TABLE, column = key.column, value = %key.value, "unique value taken");
                return Err(AppError::Conflict(format!(
                    "{} already exists: {}",
                    key.label, key.value
                )));
            }
        }
        Ok(())
    }
}
