mod common;
mod resource;

pub use common::common_routes;
pub use resource::{category_routes, goods_routes, user_routes};

use crate::handlers::not_found;
use crate::state::AppState;
use crate::store::Store;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Request bodies above this size are refused before deserialization.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Full application router: `/api/goods`, `/api/categories`, `/api/users`, the operational
/// routes, and an envelope 404 for everything else.
pub fn app<S: Store>(state: AppState<S>) -> Router {
    Router::new()
        .nest("/api/goods", goods_routes(state.goods))
        .nest("/api/categories", category_routes(state.categories))
        .nest("/api/users", user_routes(state.users))
        .merge(common_routes(state.store))
        .fallback(not_found)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}
