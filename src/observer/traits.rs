use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

use crate::observer::error::ObserverError;
pub use crate::types::Operation;

/// A confirmed write, reported after the row change has committed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationEvent {
    pub operation: Operation,
    /// Table the write touched (`courses`, `reviews`, ...)
    pub schema: &'static str,
    /// Bootcamp whose derived fields may be stale
    pub bootcamp_id: Uuid,
}

impl MutationEvent {
    pub fn new(operation: Operation, schema: &'static str, bootcamp_id: Uuid) -> Self {
        Self { operation, schema, bootcamp_id }
    }
}

/// Post-write hook. Runs after the mutation; its failure never undoes it.
#[async_trait]
pub trait Observer: Send + Sync {
    /// Observer name for logging and debugging
    fn name(&self) -> &'static str;

    fn applies_to_operation(&self, op: Operation) -> bool;

    fn applies_to_schema(&self, schema: &str) -> bool;

    /// Execution timeout (default 5 seconds)
    fn timeout(&self) -> Duration {
        Duration::from_secs(5)
    }

    async fn execute(&self, event: &MutationEvent) -> Result<(), ObserverError>;
}
