use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::{JwtError, TokenService};
use crate::config::AppConfig;
use crate::observer::{default_pipeline, ObserverPipeline, PgBootcampAggregates};
use crate::services::geocoder::{self, Geocoder};

/// Everything a request handler can reach. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: PgPool,
    pub tokens: TokenService,
    pub geocoder: Arc<dyn Geocoder>,
    pub observers: Arc<ObserverPipeline>,
}

impl AppState {
    pub fn new(config: AppConfig, pool: PgPool, geocoder: Arc<dyn Geocoder>) -> Result<Self, JwtError> {
        let tokens = TokenService::from_config(&config.security)?;
        let aggregates = Arc::new(PgBootcampAggregates::new(pool.clone()));
        let observers = Arc::new(default_pipeline(aggregates));

        Ok(Self {
            config: Arc::new(config),
            pool,
            tokens,
            geocoder,
            observers,
        })
    }

    /// State with the geocoder named by the configuration
    pub fn from_config(config: AppConfig, pool: PgPool) -> anyhow::Result<Self> {
        let geocoder = geocoder::from_config(&config.geocoder)?;
        Ok(Self::new(config, pool, geocoder)?)
    }
}
