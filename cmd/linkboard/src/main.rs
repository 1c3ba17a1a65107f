//! linkboard server binary.
//!
//! Loads settings, picks adapters for storage, sessions and credentials,
//! and serves the axum router until Ctrl-C or SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use api_adapters::web::{router, AppState, Credentials};
use auth_adapters::{Argon2PasswordHasher, JwtTokenIssuer};
use configs::{AuthMode, LogSettings, SessionBackend, Settings, StorageBackend};
use domains::{PostRepository, SessionStore, UserRepository};
use secrecy::ExposeSecret;
use services::{AccountService, PostService, SessionService};
use storage_adapters::memory::{MemoryPostRepository, MemorySessionStore, MemoryUserRepository};
use tokio::net::TcpListener;
use tokio::signal::{self, ctrl_c};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;
    init_tracing(&settings.log);

    let (posts, users) = storage(&settings).await?;
    let tokens = JwtTokenIssuer::new(
        settings.auth.jwt_secret.expose_secret().as_bytes(),
        settings.auth.token_ttl(),
    );
    let accounts = AccountService::new(users, Arc::new(Argon2PasswordHasher::new()), Arc::new(tokens));

    let credentials = match settings.auth.mode {
        AuthMode::Bearer => Credentials::Bearer,
        AuthMode::Cookie => {
            let store = session_store(&settings)?;
            Credentials::Cookie(Arc::new(SessionService::new(store, settings.sessions.ttl())))
        }
    };
    info!(mode = ?settings.auth.mode, "credentials configured");

    let state = AppState::new(PostService::new(posts), accounts, credentials);
    let app = router(state);

    let address = settings.server.address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!(%address, "linkboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("linkboard stopped");
    Ok(())
}

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    if log.json {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}

async fn storage(settings: &Settings) -> anyhow::Result<(Arc<dyn PostRepository>, Arc<dyn UserRepository>)> {
    match settings.storage.backend {
        StorageBackend::Memory => {
            info!("using in-memory storage");
            Ok((
                Arc::new(MemoryPostRepository::new()),
                Arc::new(MemoryUserRepository::new()),
            ))
        }
        StorageBackend::Postgres => postgres_storage(settings).await,
    }
}

#[cfg(feature = "db-postgres")]
async fn postgres_storage(
    settings: &Settings,
) -> anyhow::Result<(Arc<dyn PostRepository>, Arc<dyn UserRepository>)> {
    use storage_adapters::postgres::{connect, PgPostRepository, PgUserRepository};

    let url = settings
        .storage
        .database_url
        .as_ref()
        .context("storage.database_url is not set")?;
    let pool = connect(url.expose_secret(), settings.storage.max_connections)
        .await
        .context("connecting to postgres")?;
    let timeout = settings.storage.op_timeout();

    Ok((
        Arc::new(PgPostRepository::new(pool.clone()).with_op_timeout(timeout)),
        Arc::new(PgUserRepository::new(pool).with_op_timeout(timeout)),
    ))
}

#[cfg(not(feature = "db-postgres"))]
async fn postgres_storage(
    _settings: &Settings,
) -> anyhow::Result<(Arc<dyn PostRepository>, Arc<dyn UserRepository>)> {
    anyhow::bail!("postgres storage requested but the binary was built without `db-postgres`")
}

fn session_store(settings: &Settings) -> anyhow::Result<Arc<dyn SessionStore>> {
    match settings.sessions.backend {
        SessionBackend::Memory => Ok(Arc::new(MemorySessionStore::new())),
        SessionBackend::Redis => redis_sessions(settings),
    }
}

#[cfg(feature = "redis")]
fn redis_sessions(settings: &Settings) -> anyhow::Result<Arc<dyn SessionStore>> {
    use storage_adapters::redis::RedisSessionStore;

    let url = settings
        .sessions
        .redis_url
        .as_ref()
        .context("sessions.redis_url is not set")?;
    let store = RedisSessionStore::connect(url.expose_secret())
        .context("creating redis pool")?
        .with_op_timeout(settings.storage.op_timeout());
    Ok(Arc::new(store))
}

#[cfg(not(feature = "redis"))]
fn redis_sessions(_settings: &Settings) -> anyhow::Result<Arc<dyn SessionStore>> {
    anyhow::bail!("redis sessions requested but the binary was built without `redis`")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
