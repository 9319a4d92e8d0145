use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio::time::timeout;

use crate::observer::error::ObserverError;
use crate::observer::traits::{MutationEvent, Observer};

/// Outcome of one notification. The pipeline never propagates failures; this is
/// for logging and tests.
#[derive(Debug, Default)]
pub struct ObserverReport {
    pub executed: Vec<&'static str>,
    pub errors: Vec<(&'static str, ObserverError)>,
}

impl ObserverReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Registry of post-write observers
#[derive(Default)]
pub struct ObserverPipeline {
    observers: Vec<Arc<dyn Observer>>,
}

impl ObserverPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_observer(&mut self, observer: Arc<dyn Observer>) {
        tracing::debug!("Registered observer '{}'", observer.name());
        self.observers.push(observer);
    }

    /// Run every observer that applies to `event` concurrently, each under its own timeout.
    /// Errors and timeouts are logged and collected, never raised.
    pub async fn notify(&self, event: &MutationEvent) -> ObserverReport {
        let applicable: Vec<&Arc<dyn Observer>> = self
            .observers
            .iter()
            .filter(|o| o.applies_to_schema(event.schema) && o.applies_to_operation(event.operation))
            .collect();

        if applicable.is_empty() {
            tracing::debug!("No observers for {:?} on {}", event.operation, event.schema);
            return ObserverReport::default();
        }

        let runs = applicable.into_iter().map(|observer| async move {
            let started = Instant::now();
            let result = match timeout(observer.timeout(), observer.execute(event)).await {
                Ok(result) => result,
                Err(_elapsed) => Err(ObserverError::TimeoutError(format!(
                    "Observer {} timed out after {:?}",
                    observer.name(),
                    observer.timeout()
                ))),
            };
            (observer.name(), started.elapsed(), result)
        });

        let mut report = ObserverReport::default();
        for (name, elapsed, result) in join_all(runs).await {
            report.executed.push(name);
            match result {
                Ok(()) => {
                    tracing::debug!("Observer: {} completed in {:?} for bootcamp {}", name, elapsed, event.bootcamp_id);
                }
                Err(e) => {
                    tracing::error!("Observer: {} failed for bootcamp {}: {}", name, event.bootcamp_id, e);
                    report.errors.push((name, e));
                }
            }
        }
        report
    }
}
