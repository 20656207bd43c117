//! Postgres container shared by the database-backed tests.
//!
//! One container is started for the whole test binary and migrated once.
//! Each test connects its own pool and works on fresh ids, so tests never
//! see each other's rows.

use anyhow::{Context, Result};
use sqlx::PgPool;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

use super::init_tracing;

struct SharedDatabase {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

/// `None` when no container runtime is reachable.
static SHARED_DB: OnceCell<Option<SharedDatabase>> = OnceCell::const_new();

impl SharedDatabase {
    async fn init() -> Result<Self> {
        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let host = postgres.get_host().await?;
        let port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);

        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;
        pool.close().await;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }
}

pub struct TestDatabase {
    pub pool: PgPool,
}

impl TestDatabase {
    /// Connect to the shared, migrated database. Returns `None` (and logs
    /// why) when Docker is not available so the rest of the suite still runs.
    pub async fn connect() -> Option<Self> {
        init_tracing();
        let shared = SHARED_DB
            .get_or_init(|| async {
                match SharedDatabase::init().await {
                    Ok(db) => Some(db),
                    Err(e) => {
                        eprintln!("Skipping Postgres-backed tests: {:#}", e);
                        None
                    }
                }
            })
            .await
            .as_ref()?;

        let pool = PgPool::connect(&shared.db_url)
            .await
            .expect("Failed to connect to test database");
        Some(Self { pool })
    }
}
