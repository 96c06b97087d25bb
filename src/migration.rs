//! Database bootstrap: create the database if missing, then apply idempotent table DDL.

use crate::error::AppError;
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

/// Statements run in order on every start; each is safe to repeat.
const DDL: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS "good" (
        "id" BIGSERIAL PRIMARY KEY,
        "name" VARCHAR(100) NOT NULL,
        "price" NUMERIC(10, 2) NOT NULL,
        "description" VARCHAR(500),
        "stock" INTEGER NOT NULL DEFAULT 0,
        "deleted" INTEGER NOT NULL DEFAULT 0,
        "create_time" TIMESTAMPTZ NOT NULL,
        "update_time" TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS "category" (
        "id" BIGSERIAL PRIMARY KEY,
        "name" VARCHAR(50) NOT NULL,
        "description" VARCHAR(200),
        "sort_order" INTEGER NOT NULL DEFAULT 0,
        "deleted" INTEGER NOT NULL DEFAULT 0,
        "create_time" TIMESTAMPTZ NOT NULL,
        "update_time" TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS "user" (
        "id" BIGSERIAL PRIMARY KEY,
        "username" VARCHAR(30) NOT NULL,
        "password" VARCHAR(100) NOT NULL,
        "email" VARCHAR(100),
        "phone" VARCHAR(20),
        "nickname" VARCHAR(50),
        "avatar" VARCHAR(500),
        "status" INTEGER NOT NULL DEFAULT 1,
        "role" VARCHAR(20),
        "deleted" INTEGER NOT NULL DEFAULT 0,
        "create_time" TIMESTAMPTZ NOT NULL,
        "update_time" TIMESTAMPTZ NOT NULL
    )"#,
    // Live usernames only: a deleted user's handle can be taken again.
    r#"CREATE UNIQUE INDEX IF NOT EXISTS "user_username_live_key"
        ON "user" ("username") WHERE "deleted" = 0"#,
    r#"CREATE INDEX IF NOT EXISTS "good_price_idx" ON "good" ("price") WHERE "deleted" = 0"#,
];

pub async fn apply_migrations(pool: &PgPool) -> Result<(), AppError> {
    for statement in DDL {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!(statements = DDL.len(), "schema up to date");
    Ok(())
}

/// Connects to the server's `postgres` database and creates the target database when absent.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::Internal(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn = opts.connect().await?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %db_name, "created database");
    }
    Ok(())
}

/// Splits a connection URL into the admin URL (same server, `postgres` database) and the database name.
fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| AppError::Internal("DATABASE_URL has no database path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let query = path_and_query
        .split_once('?')
        .map(|(_, q)| format!("?{}", q))
        .unwrap_or_default();
    Ok((format!("{}postgres{}", base, query), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
