//! Builds parameterized INSERT, SELECT, UPDATE, soft DELETE and COUNT for an entity.
//! Identifiers come from entity definitions; every value is a bind parameter.

use crate::model::{Audit, Entity, CREATE_TIME_COLUMN, ID_COLUMN, UPDATE_TIME_COLUMN};
use crate::sql::FieldValue;
use crate::store::policy::{live_predicate, DELETED, DELETED_COLUMN, LIVE};
use crate::store::{Filter, ListQuery};

/// Quote identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Escape LIKE wildcards so a keyword only ever matches literally.
fn like_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<FieldValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: FieldValue) -> usize {
        self.params.push(v);
        self.params.len()
    }

    /// Live-row predicate followed by each filter, joined with AND.
    fn where_clause(&mut self, filters: &[Filter]) -> String {
        let mut parts = vec![live_predicate()];
        for f in filters {
            let col = quoted(f.column());
            let part = match f {
                Filter::Eq(_, v) => format!("{} = ${}", col, self.push_param(v.clone())),
                Filter::Ne(_, v) => format!("{} <> ${}", col, self.push_param(v.clone())),
                Filter::Gte(_, v) => format!("{} >= ${}", col, self.push_param(v.clone())),
                Filter::Lte(_, v) => format!("{} <= ${}", col, self.push_param(v.clone())),
                Filter::Contains(_, needle) => format!(
                    "{} LIKE ${} ESCAPE '\\'",
                    col,
                    self.push_param(FieldValue::Text(like_pattern(needle)))
                ),
            };
            parts.push(part);
        }
        format!(" WHERE {}", parts.join(" AND "))
    }
}

/// id, business columns, audit pair. The deletion flag is never selected.
fn select_column_list<E: Entity>() -> String {
    std::iter::once(ID_COLUMN)
        .chain(E::COLUMNS.iter().copied())
        .chain([CREATE_TIME_COLUMN, UPDATE_TIME_COLUMN])
        .map(quoted)
        .collect::<Vec<_>>()
        .join(", ")
}

/// SELECT one live row by id. Caller binds id as $1.
pub fn select_by_id<E: Entity>() -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = $1 AND {}",
        select_column_list::<E>(),
        quoted(E::TABLE),
        quoted(ID_COLUMN),
        live_predicate()
    );
    q
}

/// SELECT live rows with filters, caller-specified ORDER BY and optional LIMIT/OFFSET.
pub fn select_list<E: Entity>(query: &ListQuery) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = q.where_clause(&query.filters);
    let order_clause = if query.orders.is_empty() {
        String::new()
    } else {
        let parts: Vec<String> = query
            .orders
            .iter()
            .map(|o| format!("{} {}", quoted(o.column), if o.descending { "DESC" } else { "ASC" }))
            .collect();
        format!(" ORDER BY {}", parts.join(", "))
    };
    let window_clause = query
        .window
        .map(|w| format!(" LIMIT {} OFFSET {}", w.limit, w.offset))
        .unwrap_or_default();
    q.sql = format!(
        "SELECT {} FROM {}{}{}{}",
        select_column_list::<E>(),
        quoted(E::TABLE),
        where_clause,
        order_clause,
        window_clause
    );
    q
}

/// COUNT(*) of live rows matching filters.
pub fn count<E: Entity>(filters: &[Filter]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = q.where_clause(filters);
    q.sql = format!("SELECT COUNT(*) FROM {}{}", quoted(E::TABLE), where_clause);
    q
}

/// INSERT business values, a live deletion flag and the already stamped audit pair. Returns the new id.
pub fn insert<E: Entity>(entity: &E) -> QueryBuf {
    let mut q = QueryBuf::new();
    let Audit {
        create_time,
        update_time,
    } = *entity.audit();
    let mut cols: Vec<String> = E::COLUMNS.iter().map(|c| quoted(c)).collect();
    let mut placeholders: Vec<String> = entity
        .values()
        .into_iter()
        .map(|v| format!("${}", q.push_param(v)))
        .collect();
    for (col, v) in [
        (DELETED_COLUMN, FieldValue::Int(LIVE)),
        (CREATE_TIME_COLUMN, FieldValue::Timestamp(create_time)),
        (UPDATE_TIME_COLUMN, FieldValue::Timestamp(update_time)),
    ] {
        cols.push(quoted(col));
        placeholders.push(format!("${}", q.push_param(v)));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quoted(E::TABLE),
        cols.join(", "),
        placeholders.join(", "),
        quoted(ID_COLUMN)
    );
    q
}

/// UPDATE every business column plus `update_time` of a live row. `create_time` is never written.
pub fn update<E: Entity>(entity: &E) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets: Vec<String> = E::COLUMNS
        .iter()
        .zip(entity.values())
        .map(|(col, v)| format!("{} = ${}", quoted(col), q.push_param(v)))
        .collect();
    let stamp = q.push_param(FieldValue::Timestamp(entity.audit().update_time));
    sets.push(format!("{} = ${}", quoted(UPDATE_TIME_COLUMN), stamp));
    let id_param = q.push_param(FieldValue::BigInt(entity.id()));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} AND {}",
        quoted(E::TABLE),
        sets.join(", "),
        quoted(ID_COLUMN),
        id_param,
        live_predicate()
    );
    q
}

/// Flag a live row as deleted. Caller binds id as $1.
pub fn soft_delete<E: Entity>() -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "UPDATE {} SET {} = {} WHERE {} = $1 AND {}",
        quoted(E::TABLE),
        quoted(DELETED_COLUMN),
        DELETED,
        quoted(ID_COLUMN),
        live_predicate()
    );
    q
}
