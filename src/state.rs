//! Shared application state: the store plus one service per resource.

use crate::config::Settings;
use crate::model::{Category, Good, User};
use crate::service::{EntityService, ServiceOptions, UniquenessGuard};
use crate::store::Store;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState<S> {
    pub store: S,
    pub goods: Arc<EntityService<Good, S>>,
    pub categories: Arc<EntityService<Category, S>>,
    pub users: Arc<EntityService<User, S>>,
}

impl<S: Store> AppState<S> {
    pub fn new(store: S, options: ServiceOptions) -> Self {
        AppState {
            goods: Arc::new(EntityService::new(store.clone(), UniquenessGuard, options)),
            categories: Arc::new(EntityService::new(store.clone(), UniquenessGuard, options)),
            users: Arc::new(EntityService::new(store.clone(), UniquenessGuard, options)),
            store,
        }
    }

    pub fn from_settings(store: S, settings: &Settings) -> Self {
        Self::new(store, settings.service_options())
    }
}
