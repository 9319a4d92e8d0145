// Post-database observers that maintain derived bootcamp fields

pub mod average_cost;
pub mod average_rating;

pub use average_cost::*;
pub use average_rating::*;

use std::sync::Arc;

use crate::observer::aggregates::BootcampAggregates;
use crate::observer::pipeline::ObserverPipeline;

/// Pipeline with every aggregate observer registered
pub fn default_pipeline(aggregates: Arc<dyn BootcampAggregates>) -> ObserverPipeline {
    let mut pipeline = ObserverPipeline::new();
    pipeline.register_observer(Arc::new(AverageCostObserver::new(aggregates.clone())));
    pipeline.register_observer(Arc::new(AverageRatingObserver::new(aggregates)));
    pipeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::error::ObserverError;
    use crate::observer::traits::{MutationEvent, Operation};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct RecordingAggregates {
        calls: Mutex<Vec<(&'static str, Uuid)>>,
        fail: bool,
    }

    #[async_trait]
    impl BootcampAggregates for RecordingAggregates {
        async fn refresh_average_cost(&self, bootcamp_id: Uuid) -> Result<(), ObserverError> {
            self.calls.lock().unwrap().push(("cost", bootcamp_id));
            if self.fail {
                return Err(ObserverError::DatabaseError("connection reset".into()));
            }
            Ok(())
        }

        async fn refresh_average_rating(&self, bootcamp_id: Uuid) -> Result<(), ObserverError> {
            self.calls.lock().unwrap().push(("rating", bootcamp_id));
            Ok(())
        }
    }

    #[tokio::test]
    async fn course_writes_refresh_average_cost() {
        let aggregates = Arc::new(RecordingAggregates::default());
        let pipeline = default_pipeline(aggregates.clone());
        let id = Uuid::new_v4();

        for op in [Operation::Create, Operation::Update, Operation::Delete] {
            pipeline.notify(&MutationEvent::new(op, "courses", id)).await;
        }

        let calls = aggregates.calls.lock().unwrap().clone();
        assert_eq!(calls, vec![("cost", id), ("cost", id), ("cost", id)]);
    }

    #[tokio::test]
    async fn review_writes_refresh_average_rating() {
        let aggregates = Arc::new(RecordingAggregates::default());
        let pipeline = default_pipeline(aggregates.clone());
        let id = Uuid::new_v4();

        let report = pipeline.notify(&MutationEvent::new(Operation::Create, "reviews", id)).await;

        assert_eq!(report.executed, vec!["AverageRatingObserver"]);
        assert_eq!(aggregates.calls.lock().unwrap().clone(), vec![("rating", id)]);
    }

    #[tokio::test]
    async fn bootcamp_writes_trigger_nothing() {
        let aggregates = Arc::new(RecordingAggregates::default());
        let pipeline = default_pipeline(aggregates.clone());
        pipeline.notify(&MutationEvent::new(Operation::Update, "bootcamps", Uuid::new_v4())).await;
        assert!(aggregates.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn aggregate_failure_is_reported_not_raised() {
        let aggregates = Arc::new(RecordingAggregates { fail: true, ..Default::default() });
        let pipeline = default_pipeline(aggregates);
        let report = pipeline.notify(&MutationEvent::new(Operation::Create, "courses", Uuid::new_v4())).await;
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].0, "AverageCostObserver");
    }
}
