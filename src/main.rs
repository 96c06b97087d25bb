use shopfront::{
    app, apply_migrations, ensure_database_exists, AppError, AppState, AuditStamper, ConfigError,
    MemoryStore, PgStore, Settings, Store, StoreBackend,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("shopfront=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    tracing::info!(backend = ?settings.backend, empty_patch = ?settings.empty_patch, "starting");

    match settings.backend {
        StoreBackend::Postgres => {
            let database_url = settings
                .database_url
                .as_deref()
                .ok_or(AppError::Config(ConfigError::Missing("DATABASE_URL")))?;
            ensure_database_exists(database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(settings.db_max_connections)
                .connect(database_url)
                .await?;
            apply_migrations(&pool).await?;
            serve(PgStore::new(pool, AuditStamper::default()), &settings).await
        }
        StoreBackend::Memory => {
            tracing::warn!("memory backend: data is lost on restart");
            serve(MemoryStore::default(), &settings).await
        }
    }
}

async fn serve<S: Store>(store: S, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let router = app(AppState::from_settings(store, settings));
    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
