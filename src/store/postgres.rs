//! PostgreSQL gateway on sqlx.

use super::{AuditStamper, Filter, ListQuery, Session, Store};
use crate::error::AppError;
use crate::model::Entity;
use crate::sql::{self, FieldValue, QueryBuf};
use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    stamper: AuditStamper,
}

impl PgStore {
    pub fn new(pool: PgPool, stamper: AuditStamper) -> Self {
        PgStore { pool, stamper }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    type Session = PgSession;

    async fn begin(&self) -> Result<PgSession, AppError> {
        let tx = self.pool.begin().await?;
        Ok(PgSession {
            conn: Conn::Tx(tx),
            stamper: self.stamper.clone(),
        })
    }

    async fn connect(&self) -> Result<PgSession, AppError> {
        let conn = self.pool.acquire().await?;
        Ok(PgSession {
            conn: Conn::Pooled(conn),
            stamper: self.stamper.clone(),
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

enum Conn {
    Pooled(PoolConnection<Postgres>),
    Tx(Transaction<'static, Postgres>),
}

/// Session over a pooled connection or an open transaction. A dropped transaction rolls back.
pub struct PgSession {
    conn: Conn,
    stamper: AuditStamper,
}

impl PgSession {
    fn conn(&mut self) -> &mut PgConnection {
        match &mut self.conn {
            Conn::Pooled(c) => &mut **c,
            Conn::Tx(tx) => &mut **tx,
        }
    }

    async fn execute(&mut self, q: &QueryBuf) -> Result<u64, AppError> {
        // Write parameters can carry credentials; only their count is logged.
        tracing::debug!(sql = %q.sql, params = q.params.len(), "execute");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        let done = query.execute(self.conn()).await?;
        Ok(done.rows_affected())
    }

    async fn fetch_many<E: Entity>(&mut self, q: &QueryBuf) -> Result<Vec<E>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_as::<_, E>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.fetch_all(self.conn()).await?)
    }
}

#[async_trait]
impl Session for PgSession {
    async fn insert<E: Entity>(&mut self, mut entity: E) -> Result<Option<E>, AppError> {
        self.stamper.stamp_insert(entity.audit_mut());
        let q = sql::insert(&entity);
        tracing::debug!(sql = %q.sql, params = q.params.len(), "insert");
        let mut query = sqlx::query_scalar::<_, i64>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        let id = query.fetch_optional(self.conn()).await?;
        Ok(id.map(|id| {
            entity.set_id(id);
            entity
        }))
    }

    async fn find_by_id<E: Entity>(&mut self, id: i64) -> Result<Option<E>, AppError> {
        let q = sql::select_by_id::<E>();
        tracing::debug!(sql = %q.sql, id, "query");
        let row = sqlx::query_as::<_, E>(&q.sql)
            .bind(id)
            .fetch_optional(self.conn())
            .await?;
        Ok(row)
    }

    async fn list<E: Entity>(&mut self, query: &ListQuery) -> Result<Vec<E>, AppError> {
        let q = sql::select_list::<E>(query);
        self.fetch_many(&q).await
    }

    async fn count<E: Entity>(&mut self, filters: &[Filter]) -> Result<u64, AppError> {
        let q = sql::count::<E>(filters);
        tracing::debug!(sql = %q.sql, params = ?q.params, "count");
        let mut query = sqlx::query_scalar::<_, i64>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        let n = query.fetch_one(self.conn()).await?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    async fn update<E: Entity>(&mut self, entity: &mut E) -> Result<u64, AppError> {
        self.stamper.stamp_update(entity.audit_mut());
        let q = sql::update(&*entity);
        self.execute(&q).await
    }

    async fn soft_delete<E: Entity>(&mut self, id: i64) -> Result<u64, AppError> {
        let mut q = sql::soft_delete::<E>();
        q.params.push(FieldValue::BigInt(id));
        self.execute(&q).await
    }

    async fn commit(self) -> Result<(), AppError> {
        match self.conn {
            Conn::Tx(tx) => tx.commit().await?,
            Conn::Pooled(_) => {}
        }
        Ok(())
    }
}
