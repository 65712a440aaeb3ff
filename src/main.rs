use std::net::SocketAddr;
use std::sync::Arc;

use bazaar_admin::config::AppConfig;
use bazaar_admin::db::{self, MarketplaceStore, PgStore};
use bazaar_admin::services::session::{MemoryRevocations, RedisRevocations, SessionRevocations};
use bazaar_admin::{routes, AppState};
use mimalloc::MiMalloc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// M-MIMALLOC-APP: Use mimalloc as global allocator for improved performance.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bazaar_admin=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = AppConfig::from_env()?;

    let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;
    let store: Arc<dyn MarketplaceStore> = Arc::new(PgStore::new(pool));

    let revocations: Arc<dyn SessionRevocations> = match &config.redis_url {
        Some(url) => Arc::new(RedisRevocations::open(url)?),
        None => {
            tracing::warn!("REDIS_URL not set; sign-outs are remembered by this process only");
            Arc::new(MemoryRevocations::new())
        }
    };

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!(host = %addr, "Starting bazaar admin API server");

    let app = routes::router(AppState {
        store,
        revocations,
        config,
    });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
