// handlers/mod.rs - HTTP handlers, one module per resource
//
// Access tiers are attached in `crate::app`:
// public (no auth) → protected (JWT) → role-gated (JWT + authorize)

pub mod auth;
pub mod bootcamps;
pub mod courses;
pub mod reviews;
pub mod root;
pub mod users;

use axum::extract::{rejection::QueryRejection, Query};

use crate::config::FilterConfig;
use crate::error::ApiError;
use crate::filter::{parse_query, FilterData, Schema};

/// Raw query pairs kept in order so repeated keys survive
pub type QueryPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

pub(crate) fn filter_data(schema: &Schema, query: QueryPairs, config: &FilterConfig) -> Result<FilterData, ApiError> {
    let Query(pairs) = query?;
    Ok(parse_query(schema, &pairs, config)?)
}
