// Observer system: explicit post-write hooks notified by the services

pub mod aggregates;
pub mod error;
pub mod implementations;
pub mod pipeline;
pub mod traits;

// Re-export core types
pub use aggregates::*;
pub use error::*;
pub use implementations::*;
pub use pipeline::*;
pub use traits::*;
