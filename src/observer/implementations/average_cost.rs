// Post-database: keeps bootcamps.average_cost in step with course writes
use async_trait::async_trait;
use std::sync::Arc;

use crate::observer::aggregates::BootcampAggregates;
use crate::observer::error::ObserverError;
use crate::observer::traits::{MutationEvent, Observer, Operation};

pub struct AverageCostObserver {
    aggregates: Arc<dyn BootcampAggregates>,
}

impl AverageCostObserver {
    pub fn new(aggregates: Arc<dyn BootcampAggregates>) -> Self {
        Self { aggregates }
    }
}

#[async_trait]
impl Observer for AverageCostObserver {
    fn name(&self) -> &'static str {
        "AverageCostObserver"
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update | Operation::Delete)
    }

    fn applies_to_schema(&self, schema: &str) -> bool {
        schema == "courses"
    }

    async fn execute(&self, event: &MutationEvent) -> Result<(), ObserverError> {
        tracing::info!("Recomputing average cost for bootcamp {}", event.bootcamp_id);
        self.aggregates.refresh_average_cost(event.bootcamp_id).await
    }
}
