pub mod types;
pub mod filter;
pub mod filter_where;
pub mod filter_order;
pub mod error;
pub mod schema;
pub mod query;
pub mod pagination;

pub use types::*;
pub use filter::Filter;
pub use filter_order::FilterOrder;
pub use error::FilterError;
pub use schema::{FieldDef, FieldKind, Schema};
pub use query::parse_query;
pub use pagination::{PageRef, Pagination};
