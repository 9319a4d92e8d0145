use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::observer::error::ObserverError;

/// Recomputes a bootcamp's derived fields from its current children
#[async_trait]
pub trait BootcampAggregates: Send + Sync {
    /// `average_cost = AVG(tuition)` over the bootcamp's courses, NULL when none
    async fn refresh_average_cost(&self, bootcamp_id: Uuid) -> Result<(), ObserverError>;

    /// `average_rating = AVG(rating)` over the bootcamp's reviews, NULL when none
    async fn refresh_average_rating(&self, bootcamp_id: Uuid) -> Result<(), ObserverError>;
}

pub struct PgBootcampAggregates {
    pool: PgPool,
}

impl PgBootcampAggregates {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BootcampAggregates for PgBootcampAggregates {
    async fn refresh_average_cost(&self, bootcamp_id: Uuid) -> Result<(), ObserverError> {
        // A bootcamp deleted in the meantime updates zero rows; that is fine
        sqlx::query(
            "UPDATE bootcamps SET average_cost = \
             (SELECT AVG(tuition)::float8 FROM courses WHERE bootcamp_id = $1) \
             WHERE id = $1",
        )
        .bind(bootcamp_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn refresh_average_rating(&self, bootcamp_id: Uuid) -> Result<(), ObserverError> {
        sqlx::query(
            "UPDATE bootcamps SET average_rating = \
             (SELECT AVG(rating)::float8 FROM reviews WHERE bootcamp_id = $1) \
             WHERE id = $1",
        )
        .bind(bootcamp_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
