//! One business operation per call: create, get, page, update, delete, search.

use super::{EmptyPatchPolicy, Merge, Resource, UniquenessGuard};
use crate::error::AppError;
use crate::model::ID_COLUMN;
use crate::response::PageData;
use crate::store::{Filter, ListQuery, Order, Session, Store, Window};
use std::marker::PhantomData;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Options fixed at construction time.
#[derive(Clone, Copy, Debug)]
pub struct ServiceOptions {
    pub empty_patch: EmptyPatchPolicy,
    pub max_page_size: u32,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        ServiceOptions {
            empty_patch: EmptyPatchPolicy::default(),
            max_page_size: 100,
        }
    }
}

pub struct EntityService<E, S> {
    store: S,
    guard: UniquenessGuard,
    options: ServiceOptions,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Resource, S: Store> EntityService<E, S> {
    pub fn new(store: S, guard: UniquenessGuard, options: ServiceOptions) -> Self {
        EntityService {
            store,
            guard,
            options,
            _entity: PhantomData,
        }
    }

    /// Load a live entity or fail with `NotFound`.
    async fn load(session: &mut S::Session, id: i64) -> Result<E, AppError> {
        session.find_by_id::<E>(id).await?.ok_or_else(|| {
            tracing::warn!(resource = E::LABEL, id, "not found");
            AppError::NotFound(format!("{} not found: {}", E::LABEL, id))
        })
    }

    pub async fn create(&self, req: E::Create) -> Result<E, AppError> {
        let entity = E::from_create(req);
        let mut session = self.store.begin().await?;
        self.guard
            .check::<E, _>(&mut session, &entity.unique_keys(), None)
            .await?;
        let stored = session
            .insert(entity)
            .await?
            .ok_or_else(|| AppError::Business(format!("failed to create {}", E::LABEL)))?;
        session.commit().await?;
        tracing::info!(resource = E::LABEL, id = stored.id(), "created");
        Ok(stored)
    }

    pub async fn get(&self, id: i64) -> Result<E, AppError> {
        let mut session = self.store.connect().await?;
        Self::load(&mut session, id).await
    }

    /// Page window over live entities ordered by id, with the total live count.
    pub async fn page(&self, page: Option<u32>, size: Option<u32>) -> Result<PageData<E>, AppError> {
        let page = page.unwrap_or(DEFAULT_PAGE).max(1);
        let size = size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, self.options.max_page_size.max(1));
        let query = ListQuery::new()
            .order_by([Order::asc(ID_COLUMN)])
            .window(Window::page(page, size));
        let mut session = self.store.connect().await?;
        let total = session.count::<E>(&[]).await?;
        let records = session.list::<E>(&query).await?;
        tracing::debug!(resource = E::LABEL, page, size, total, returned = records.len(), "page");
        Ok(PageData::new(records, total, page, size))
    }

    pub async fn update(&self, id: i64, req: E::Update) -> Result<E, AppError> {
        let mut session = self.store.begin().await?;
        let mut entity = Self::load(&mut session, id).await?;
        self.guard
            .check::<E, _>(&mut session, &req.unique_keys(), Some(id))
            .await?;
        let outcome = req.merge_into(&mut entity);
        if outcome.is_empty() && self.options.empty_patch == EmptyPatchPolicy::Skip {
            tracing::debug!(resource = E::LABEL, id, "empty update skipped");
            return Ok(entity);
        }
        if outcome.is_empty() {
            tracing::debug!(resource = E::LABEL, id, "empty update, refreshing update time only");
        }
        let affected = session.update(&mut entity).await?;
        if affected == 0 {
            tracing::warn!(resource = E::LABEL, id, "update affected no rows");
            return Err(AppError::Business(format!("failed to update {}", E::LABEL)));
        }
        session.commit().await?;
        tracing::info!(
            resource = E::LABEL,
            id,
            present = outcome.present(),
            fields = ?outcome.fields(),
            "updated"
        );
        Ok(entity)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut session = self.store.begin().await?;
        Self::load(&mut session, id).await?;
        let affected = session.soft_delete::<E>(id).await?;
        if affected == 0 {
            tracing::warn!(resource = E::LABEL, id, "delete affected no rows");
            return Err(AppError::Business(format!("failed to delete {}", E::LABEL)));
        }
        session.commit().await?;
        tracing::info!(resource = E::LABEL, id, "deleted");
        Ok(())
    }

    /// Substring search on the resource's search column; never fails for zero matches.
    pub async fn search(&self, keyword: &str) -> Result<Vec<E>, AppError> {
        let query = ListQuery::new()
            .filter(Filter::Contains(E::SEARCH_COLUMN, keyword.to_string()))
            .order_by(E::search_order());
        let found = self.find(&query).await?;
        tracing::info!(resource = E::LABEL, keyword, found = found.len(), "search");
        Ok(found)
    }

    /// Live entities matching an arbitrary query.
    pub async fn find(&self, query: &ListQuery) -> Result<Vec<E>, AppError> {
        let mut session = self.store.connect().await?;
        session.list::<E>(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CreateGood, CreateUser, Good, UpdateGood, UpdateUser, User};
    use crate::model::Entity;
    use crate::sql::FieldValue;
    use crate::store::{AuditStamper, Clock, MemorySession, MemoryStore};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::sync::{Arc, Mutex};

    /// Advances one second per sample so every write gets a distinct timestamp.
    struct Ticking(Mutex<DateTime<Utc>>);

    impl Clock for Ticking {
        fn now(&self) -> DateTime<Utc> {
            let mut t = self.0.lock().unwrap();
            *t += Duration::seconds(1);
            *t
        }
    }

    fn store() -> MemoryStore {
        let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        MemoryStore::new(AuditStamper::new(Arc::new(Ticking(Mutex::new(start)))))
    }

    fn goods(store: &MemoryStore, empty_patch: EmptyPatchPolicy) -> EntityService<Good, MemoryStore> {
        let options = ServiceOptions {
            empty_patch,
            max_page_size: 100,
        };
        EntityService::new(store.clone(), UniquenessGuard, options)
    }

    fn users(store: &MemoryStore) -> EntityService<User, MemoryStore> {
        EntityService::new(store.clone(), UniquenessGuard, ServiceOptions::default())
    }

    fn good(name: &str, stock: i32) -> CreateGood {
        CreateGood {
            name: Some(name.into()),
            price: Some(Decimal::new(999, 2)),
            description: None,
            stock: Some(stock),
        }
    }

    fn user(name: &str) -> CreateUser {
        CreateUser {
            username: Some(name.into()),
            password: Some("secret1".into()),
            ..CreateUser::default()
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = store();
        let svc = goods(&store, EmptyPatchPolicy::Touch);
        let created = svc.create(good("Laptop", 5)).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.audit.create_time, created.audit.update_time);
        let fetched = svc.get(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn partial_update_keeps_absent_fields_and_create_time() {
        let store = store();
        let svc = goods(&store, EmptyPatchPolicy::Touch);
        let created = svc.create(good("Laptop", 5)).await.unwrap();
        let patch: UpdateGood = serde_json::from_str(r#"{"stock": 3}"#).unwrap();
        let updated = svc.update(created.id, patch).await.unwrap();
        assert_eq!(updated.stock, 3);
        assert_eq!(updated.name, "Laptop");
        assert_eq!(updated.price, created.price);
        assert_eq!(updated.audit.create_time, created.audit.create_time);
        assert!(updated.audit.update_time > created.audit.update_time);
        assert_eq!(svc.get(created.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn empty_update_follows_policy() {
        let store = store();
        let touch = goods(&store, EmptyPatchPolicy::Touch);
        let skip = goods(&store, EmptyPatchPolicy::Skip);
        let created = touch.create(good("Desk", 1)).await.unwrap();

        let skipped = skip.update(created.id, UpdateGood::default()).await.unwrap();
        assert_eq!(skipped, created);

        let touched = touch.update(created.id, UpdateGood::default()).await.unwrap();
        assert!(touched.audit.update_time > created.audit.update_time);
        assert_eq!(touched.name, created.name);
    }

    #[tokio::test]
    async fn deleted_entities_disappear_everywhere() {
        let store = store();
        let svc = goods(&store, EmptyPatchPolicy::Touch);
        let a = svc.create(good("Mouse", 1)).await.unwrap();
        svc.create(good("Mousepad", 1)).await.unwrap();
        svc.delete(a.id).await.unwrap();

        assert!(matches!(svc.get(a.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(svc.delete(a.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            svc.update(a.id, UpdateGood::default()).await,
            Err(AppError::NotFound(_))
        ));
        let found = svc.search("Mouse").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Mousepad");
        assert_eq!(svc.page(None, None).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn search_is_newest_first_and_empty_is_ok() {
        let store = store();
        let svc = goods(&store, EmptyPatchPolicy::Touch);
        svc.create(good("Red pen", 1)).await.unwrap();
        svc.create(good("Blue pen", 1)).await.unwrap();
        let found = svc.search("pen").await.unwrap();
        let names: Vec<_> = found.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["Blue pen", "Red pen"]);
        assert!(svc.search("zzz").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn page_clamps_and_windows() {
        let store = store();
        let svc = goods(&store, EmptyPatchPolicy::Touch);
        for i in 0..5 {
            svc.create(good(&format!("Item {i}"), i)).await.unwrap();
        }
        let page = svc.page(Some(2), Some(2)).await.unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.pages, 3);
        let names: Vec<_> = page.records.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["Item 2", "Item 3"]);

        let clamped = svc.page(Some(0), Some(1000)).await.unwrap();
        assert_eq!(clamped.current, 1);
        assert_eq!(clamped.size, 100);
        assert_eq!(clamped.records.len(), 5);
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected_on_create_and_update() {
        let store = store();
        let svc = users(&store);
        svc.create(user("alice")).await.unwrap();
        let bob = svc.create(user("bob")).await.unwrap();

        let err = svc.create(user("alice")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m.contains("alice")));

        let rename: UpdateUser = serde_json::from_str(r#"{"username": "alice"}"#).unwrap();
        assert!(matches!(svc.update(bob.id, rename).await, Err(AppError::Conflict(_))));

        let keep: UpdateUser = serde_json::from_str(r#"{"username": "bob"}"#).unwrap();
        assert_eq!(svc.update(bob.id, keep).await.unwrap().username, "bob");
    }

    #[tokio::test]
    async fn username_is_free_again_after_delete() {
        let store = store();
        let svc = users(&store);
        let first = svc.create(user("carol")).await.unwrap();
        svc.delete(first.id).await.unwrap();
        let second = svc.create(user("carol")).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    /// Store whose writes find the row gone between load and write, as after a concurrent delete.
    #[derive(Clone)]
    struct RowVanishes(MemoryStore);

    struct RowVanishesSession(MemorySession);

    #[async_trait]
    impl Store for RowVanishes {
        type Session = RowVanishesSession;

        async fn begin(&self) -> Result<RowVanishesSession, AppError> {
            Ok(RowVanishesSession(self.0.begin().await?))
        }

        async fn connect(&self) -> Result<RowVanishesSession, AppError> {
            Ok(RowVanishesSession(self.0.connect().await?))
        }

        async fn ping(&self) -> Result<(), AppError> {
            self.0.ping().await
        }
    }

    #[async_trait]
    impl Session for RowVanishesSession {
        async fn insert<E: Entity>(&mut self, entity: E) -> Result<Option<E>, AppError> {
            self.0.insert(entity).await
        }

        async fn find_by_id<E: Entity>(&mut self, id: i64) -> Result<Option<E>, AppError> {
            self.0.find_by_id(id).await
        }

        async fn list<E: Entity>(&mut self, query: &ListQuery) -> Result<Vec<E>, AppError> {
            self.0.list(query).await
        }

        async fn count<E: Entity>(&mut self, filters: &[Filter]) -> Result<u64, AppError> {
            self.0.count::<E>(filters).await
        }

        async fn update<E: Entity>(&mut self, entity: &mut E) -> Result<u64, AppError> {
            self.0.soft_delete::<E>(entity.id()).await?;
            self.0.update(entity).await
        }

        async fn soft_delete<E: Entity>(&mut self, id: i64) -> Result<u64, AppError> {
            self.0.soft_delete::<E>(id).await?;
            self.0.soft_delete::<E>(id).await
        }

        async fn count_by_unique_field<E: Entity>(
            &mut self,
            column: &'static str,
            value: &FieldValue,
            exclude_id: Option<i64>,
        ) -> Result<u64, AppError> {
            self.0.count_by_unique_field::<E>(column, value, exclude_id).await
        }

        async fn commit(self) -> Result<(), AppError> {
            self.0.commit().await
        }
    }

    #[tokio::test]
    async fn zero_rows_affected_is_a_business_failure_and_rolls_back() {
        let inner = store();
        let plain = goods(&inner, EmptyPatchPolicy::Touch);
        let created = plain.create(good("Lamp", 2)).await.unwrap();
        let vanishing: EntityService<Good, RowVanishes> =
            EntityService::new(RowVanishes(inner.clone()), UniquenessGuard, ServiceOptions::default());

        let patch: UpdateGood = serde_json::from_str(r#"{"stock": 9}"#).unwrap();
        let err = vanishing.update(created.id, patch).await.unwrap_err();
        assert!(matches!(err, AppError::Business(ref m) if m == "failed to update good"), "{err:?}");

        let err = vanishing.delete(created.id).await.unwrap_err();
        assert!(matches!(err, AppError::Business(ref m) if m == "failed to delete good"), "{err:?}");

        // Neither the update nor the interleaved deletes were committed.
        assert_eq!(plain.get(created.id).await.unwrap(), created);
    }
}
