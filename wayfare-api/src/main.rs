use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wayfare_api::{app, AppState, AuthConfig};
use wayfare_store::app_config::Config;
use wayfare_store::{DbClient, LogMailer, Mailer, MemoryStore, RedisClient, Repositories, SmtpMailer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wayfare_api=debug,wayfare=info,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Wayfare API on port {}", config.server.port);

    let repos = if config.database.is_memory() {
        tracing::warn!("Using the in-memory store; data is lost on restart");
        Repositories::memory(MemoryStore::new())
    } else {
        let db = DbClient::new(&config.database.url, config.database.max_connections)
            .await
            .context("Failed to connect to Postgres")?;
        db.migrate().await.context("Failed to run migrations")?;
        Repositories::postgres(&db)
    };

    let mailer: Arc<dyn Mailer> = match &config.mail {
        Some(mail) => Arc::new(SmtpMailer::new(mail).context("Invalid mail configuration")?),
        None => {
            tracing::warn!("No mail section configured; reset emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let auth = AuthConfig {
        secret: config.auth.jwt_secret.clone(),
        expiration: config.auth.jwt_expiration_seconds,
    };
    let mut state = AppState::new(repos, mailer, auth, config.server.frontend_url.clone());

    match &config.redis {
        Some(redis) => {
            let client = RedisClient::new(&redis.url).context("Invalid Redis URL")?;
            state = state.with_rate_limit(Arc::new(client), config.rate_limit.clone());
        }
        None => tracing::warn!("No Redis configured; rate limiting is disabled"),
    }

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>()
    ).await?;

    Ok(())
}
