// Post-database: keeps bootcamps.average_rating in step with review writes
use async_trait::async_trait;
use std::sync::Arc;

use crate::observer::aggregates::BootcampAggregates;
use crate::observer::error::ObserverError;
use crate::observer::traits::{MutationEvent, Observer, Operation};

pub struct AverageRatingObserver {
    aggregates: Arc<dyn BootcampAggregates>,
}

impl AverageRatingObserver {
    pub fn new(aggregates: Arc<dyn BootcampAggregates>) -> Self {
        Self { aggregates }
    }
}

#[async_trait]
impl Observer for AverageRatingObserver {
    fn name(&self) -> &'static str {
        "AverageRatingObserver"
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update | Operation::Delete)
    }

    fn applies_to_schema(&self, schema: &str) -> bool {
        schema == "reviews"
    }

    async fn execute(&self, event: &MutationEvent) -> Result<(), ObserverError> {
        tracing::info!("Recomputing average rating for bootcamp {}", event.bootcamp_id);
        self.aggregates.refresh_average_rating(event.bootcamp_id).await
    }
}
