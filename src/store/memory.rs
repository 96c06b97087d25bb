//! In-process backend with the same contract as PostgreSQL.
//!
//! Committed state is an immutable snapshot. Read sessions share the current snapshot without
//! locking out anyone. Write sessions are serialized by a lock, work on a private copy, and a
//! commit publishes that copy as the next snapshot.

use super::policy::{self, DELETED, LIVE};
use super::{AuditStamper, Filter, ListQuery, Session, Store};
use crate::error::AppError;
use crate::model::Entity;
use async_trait::async_trait;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Clone)]
struct StoredRow {
    deleted: i32,
    entity: Arc<dyn Any + Send + Sync>,
}

#[derive(Clone, Default)]
struct Table {
    /// Last id handed out. Ids are never reused, deleted or not.
    last_id: i64,
    rows: BTreeMap<i64, StoredRow>,
}

#[derive(Clone, Default)]
struct Tables {
    by_name: HashMap<&'static str, Table>,
}

type Published = Arc<RwLock<Arc<Tables>>>;

fn current(published: &Published) -> Arc<Tables> {
    let guard = published.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    Arc::clone(&guard)
}

#[derive(Clone)]
pub struct MemoryStore {
    published: Published,
    writer: Arc<Mutex<()>>,
    stamper: AuditStamper,
}

impl MemoryStore {
    pub fn new(stamper: AuditStamper) -> Self {
        MemoryStore {
            published: Arc::new(RwLock::new(Arc::new(Tables::default()))),
            writer: Arc::new(Mutex::new(())),
            stamper,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new(AuditStamper::default())
    }
}

#[async_trait]
impl Store for MemoryStore {
    type Session = MemorySession;

    async fn begin(&self) -> Result<MemorySession, AppError> {
        let lock = self.writer.clone().lock_owned().await;
        // Taken after the lock, so the copy includes every earlier commit.
        let working = Tables::clone(&current(&self.published));
        Ok(MemorySession {
            view: View::Writer {
                _lock: lock,
                working,
                published: self.published.clone(),
            },
            stamper: self.stamper.clone(),
        })
    }

    async fn connect(&self) -> Result<MemorySession, AppError> {
        Ok(MemorySession {
            view: View::Snapshot(current(&self.published)),
            stamper: self.stamper.clone(),
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

enum View {
    /// Read-only view of one committed snapshot.
    Snapshot(Arc<Tables>),
    Writer {
        _lock: OwnedMutexGuard<()>,
        working: Tables,
        published: Published,
    },
}

pub struct MemorySession {
    view: View,
    stamper: AuditStamper,
}

impl MemorySession {
    fn tables(&self) -> &Tables {
        match &self.view {
            View::Snapshot(tables) => tables,
            View::Writer { working, .. } => working,
        }
    }

    fn table(&mut self, name: &'static str) -> Result<&mut Table, AppError> {
        match &mut self.view {
            View::Writer { working, .. } => Ok(working.by_name.entry(name).or_default()),
            View::Snapshot(_) => Err(AppError::Internal(
                "write attempted on a read-only memory session".into(),
            )),
        }
    }

    fn live<E: Entity>(&self) -> Vec<E> {
        self.tables()
            .by_name
            .get(E::TABLE)
            .map(|t| {
                t.rows
                    .values()
                    .filter(|r| policy::is_live(r.deleted))
                    .filter_map(|r| r.entity.downcast_ref::<E>().cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn matching<E: Entity>(&self, filters: &[Filter]) -> Vec<E> {
        self.live::<E>()
            .into_iter()
            .filter(|e| filters.iter().all(|f| f.matches(e)))
            .collect()
    }
}

#[async_trait]
impl Session for MemorySession {
    async fn insert<E: Entity>(&mut self, mut entity: E) -> Result<Option<E>, AppError> {
        self.stamper.stamp_insert(entity.audit_mut());
        let table = self.table(E::TABLE)?;
        table.last_id += 1;
        entity.set_id(table.last_id);
        table.rows.insert(
            table.last_id,
            StoredRow {
                deleted: LIVE,
                entity: Arc::new(entity.clone()),
            },
        );
        Ok(Some(entity))
    }

    async fn find_by_id<E: Entity>(&mut self, id: i64) -> Result<Option<E>, AppError> {
        Ok(self
            .tables()
            .by_name
            .get(E::TABLE)
            .and_then(|t| t.rows.get(&id))
            .filter(|r| policy::is_live(r.deleted))
            .and_then(|r| r.entity.downcast_ref::<E>().cloned()))
    }

    async fn list<E: Entity>(&mut self, query: &ListQuery) -> Result<Vec<E>, AppError> {
        let mut rows = self.matching::<E>(&query.filters);
        query.sort(&mut rows);
        Ok(match query.window {
            Some(w) => rows
                .into_iter()
                .skip(usize::try_from(w.offset).unwrap_or(usize::MAX))
                .take(w.limit as usize)
                .collect(),
            None => rows,
        })
    }

    async fn count<E: Entity>(&mut self, filters: &[Filter]) -> Result<u64, AppError> {
        Ok(self.matching::<E>(filters).len() as u64)
    }

    async fn update<E: Entity>(&mut self, entity: &mut E) -> Result<u64, AppError> {
        self.stamper.stamp_update(entity.audit_mut());
        let id = entity.id();
        let Some(row) = self
            .table(E::TABLE)?
            .rows
            .get_mut(&id)
            .filter(|r| policy::is_live(r.deleted))
        else {
            return Ok(0);
        };
        row.entity = Arc::new(entity.clone());
        Ok(1)
    }

    async fn soft_delete<E: Entity>(&mut self, id: i64) -> Result<u64, AppError> {
        match self.table(E::TABLE)?.rows.get_mut(&id) {
            Some(row) if policy::is_live(row.deleted) => {
                row.deleted = DELETED;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn commit(self) -> Result<(), AppError> {
        if let View::Writer {
            working, published, ..
        } = self.view
        {
            let mut slot = published.write().unwrap_or_else(|poisoned| poisoned.into_inner());
            *slot = Arc::new(working);
        }
        Ok(())
    }
}
