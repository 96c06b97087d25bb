//! Resource routes. Every resource gets the same six operations under its own prefix, plus the
//! lookups specific to it.

use crate::handlers::{categories, goods, resource, users};
use crate::model::{Category, Good, User};
use crate::service::{EntityService, Resource};
use crate::store::Store;
use axum::{routing::get, Router};
use std::sync::Arc;

type ServiceRouter<E, S> = Router<Arc<EntityService<E, S>>>;

/// `/`, `/search` and `/:id`. Static segments win over `:id`, so extra lookups can share the prefix.
fn crud<E: Resource, S: Store>() -> ServiceRouter<E, S> {
    Router::new()
        .route("/", get(resource::page::<E, S>).post(resource::create::<E, S>))
        .route("/search", get(resource::search::<E, S>))
        .route(
            "/:id",
            get(resource::read::<E, S>)
                .put(resource::update::<E, S>)
                .delete(resource::delete::<E, S>),
        )
}

pub fn goods_routes<S: Store>(svc: Arc<EntityService<Good, S>>) -> Router {
    crud::<Good, S>()
        .route("/byPrice", get(goods::by_price::<S>))
        .with_state(svc)
}

pub fn category_routes<S: Store>(svc: Arc<EntityService<Category, S>>) -> Router {
    crud::<Category, S>()
        .route("/sorted", get(categories::sorted::<S>))
        .with_state(svc)
}

pub fn user_routes<S: Store>(svc: Arc<EntityService<User, S>>) -> Router {
    crud::<User, S>()
        .route("/username/:username", get(users::by_username::<S>))
        .route("/role/:role", get(users::by_role::<S>))
        .route("/status/:status", get(users::by_status::<S>))
        .with_state(svc)
}
