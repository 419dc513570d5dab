//! Backend entry-point: wires configuration, persistence, and the HTTP server.

use std::env;
use std::net::SocketAddr;

use actix_web::web;
use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use mockable::DefaultEnv;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::domain::seed::{AdminSeed, seed_admin, seed_catalog};
use backend::inbound::http::health::HealthState;
use backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use backend::outbound::BcryptPasswordHasher;
use backend::outbound::persistence::{
    DbPool, DieselCatalogRepository, DieselUserRepository, PoolConfig,
};
use backend::server::{ServerConfig, create_server};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

const BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 8080);

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
            .map_err(std::io::Error::other)?;

    let bind_addr = SocketAddr::from(BIND_ADDR);
    let mut config = ServerConfig::new(
        settings.key,
        settings.cookie_secure,
        settings.same_site,
        settings.ttl_hours,
        bind_addr,
    );

    match env::var("DATABASE_URL") {
        Ok(database_url) => {
            run_migrations(&database_url)?;
            let pool = DbPool::new(PoolConfig::new(&database_url))
                .await
                .map_err(std::io::Error::other)?;
            seed_database(&pool).await?;
            config = config.with_db_pool(pool);
        }
        Err(_) => {
            warn!("DATABASE_URL not set; serving fixture data only");
        }
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(addr = %bind_addr, "server started");
    server.await
}

/// Apply pending migrations over a blocking connection before the pool spins
/// up.
fn run_migrations(database_url: &str) -> std::io::Result<()> {
    let mut connection = PgConnection::establish(database_url)
        .map_err(|error| std::io::Error::other(format!("database connection failed: {error}")))?;
    let applied = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|error| std::io::Error::other(format!("migrations failed: {error}")))?;
    if !applied.is_empty() {
        info!(count = applied.len(), "applied database migrations");
    }
    Ok(())
}

/// Seed the admin account and starter catalogue when configured.
async fn seed_database(pool: &DbPool) -> std::io::Result<()> {
    let user_repo = std::sync::Arc::new(DieselUserRepository::new(pool.clone()));
    let catalog_repo = std::sync::Arc::new(DieselCatalogRepository::new(pool.clone()));
    let hasher = std::sync::Arc::new(BcryptPasswordHasher);

    if let (Ok(email), Ok(password)) = (env::var("SEED_ADMIN_EMAIL"), env::var("SEED_ADMIN_PASSWORD"))
    {
        let admin = AdminSeed {
            display_name: env::var("SEED_ADMIN_NAME").unwrap_or_else(|_| "Librarian".to_owned()),
            email,
            password,
        };
        seed_admin(&user_repo, &hasher, &admin)
            .await
            .map_err(std::io::Error::other)?;
    }

    if env::var("SEED_CATALOG").map(|v| v == "1").unwrap_or(false) {
        seed_catalog(&catalog_repo)
            .await
            .map_err(std::io::Error::other)?;
    }

    Ok(())
}
