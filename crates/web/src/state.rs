//! Application state shared across handlers.

use std::sync::Arc;

use moka::future::Cache;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::db::ImportedJob;
use crate::services::IdentityProvider;

/// Time-to-live for the cached public job listing.
const JOB_CACHE_TTL_SECS: u64 = 60;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    pool: PgPool,
    identity: IdentityProvider,
    job_cache: Cache<&'static str, Arc<Vec<ImportedJob>>>,
}

impl AppState {
    /// Build the application state.
    #[must_use]
    pub fn new(config: AppConfig, pool: PgPool) -> Self {
        let identity = IdentityProvider::from_config(&config.auth);
        let job_cache = Cache::builder()
            .time_to_live(std::time::Duration::from_secs(JOB_CACHE_TTL_SECS))
            .max_capacity(8)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                identity,
                job_cache,
            }),
        }
    }

    /// The loaded configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// The database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// The external identity provider.
    #[must_use]
    pub fn identity(&self) -> &IdentityProvider {
        &self.inner.identity
    }

    /// Cache for the public job listing.
    #[must_use]
    pub fn job_cache(&self) -> &Cache<&'static str, Arc<Vec<ImportedJob>>> {
        &self.inner.job_cache
    }
}
