use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::schema::Schema;
use super::types::{FilterData, SqlResult};

/// SQL generation for one list request against one resource table
pub struct Filter<'a> {
    schema: &'a Schema,
    data: &'a FilterData,
}

impl<'a> Filter<'a> {
    pub fn new(schema: &'a Schema, data: &'a FilterData) -> Self {
        Self { schema, data }
    }

    /// Paged row query. LIMIT/OFFSET are integers from `FilterData`, everything else is bound.
    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(self.schema, &self.data.clauses)?;
        let order = if self.data.order.is_empty() {
            FilterOrder::generate(&FilterOrder::default_order())
        } else {
            FilterOrder::generate(&self.data.order)
        };

        let query = [
            format!("SELECT * FROM \"{}\"", self.schema.table),
            where_sql(&where_clause),
            order,
            format!("LIMIT {} OFFSET {}", self.data.limit, self.data.offset()),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params })
    }

    /// Same predicate as `to_sql`, no ordering or paging
    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(self.schema, &self.data.clauses)?;
        let query = [
            format!("SELECT COUNT(*) AS count FROM \"{}\"", self.schema.table),
            where_sql(&where_clause),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params })
    }
}

fn where_sql(clause: &str) -> String {
    if clause.is_empty() { String::new() } else { format!("WHERE {}", clause) }
}
