/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Confirmed write operations reported to the observer pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}
