pub mod manager;
pub mod query_builder;
pub mod models;

pub use manager::{DatabaseManager, DatabaseError};
pub use query_builder::{Expansion, Page, QueryBuilder};
