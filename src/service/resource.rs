use super::{Merge, UniqueKey, Validate};
use crate::model::Entity;
use crate::store::Order;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// An entity exposed as a REST resource: its request shapes and search behaviour.
pub trait Resource: Entity + Serialize {
    /// Singular name used in messages and logs.
    const LABEL: &'static str;
    /// Column the keyword search matches against.
    const SEARCH_COLUMN: &'static str;

    type Create: DeserializeOwned + Validate + Send + 'static;
    type Update: DeserializeOwned + Validate + Merge<Self> + Send + 'static;

    fn search_order() -> Vec<Order>;

    /// Entity not yet persisted; id and audit pair are placeholders until insert.
    fn from_create(req: Self::Create) -> Self;

    /// Globally unique values of a new entity, checked before insert.
    fn unique_keys(&self) -> Vec<UniqueKey> {
        Vec::new()
    }
}
