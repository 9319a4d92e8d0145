use serde_json::Value;

use super::error::FilterError;
use super::schema::{FieldKind, Schema};
use super::types::{FilterClause, FilterOp};

/// Renders typed clauses into a parameterised, AND-joined WHERE body
pub struct FilterWhere<'a> {
    schema: &'a Schema,
    param_values: Vec<Value>,
    param_index: usize,
}

impl<'a> FilterWhere<'a> {
    pub fn new(schema: &'a Schema, starting_param_index: usize) -> Self {
        Self {
            schema,
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Returns an empty string when there are no clauses
    pub fn generate(schema: &Schema, clauses: &[FilterClause]) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = FilterWhere::new(schema, 0);
        let mut sql_conditions = Vec::with_capacity(clauses.len());
        for clause in clauses {
            sql_conditions.push(filter_where.build_sql_condition(clause)?);
        }
        Ok((sql_conditions.join(" AND "), filter_where.param_values))
    }

    fn build_sql_condition(&mut self, clause: &FilterClause) -> Result<String, FilterError> {
        let field = self.schema.field(&clause.field)?;
        let quoted_column = format!("\"{}\"", field.column);
        let cast = field.kind.cast();

        match (field.kind, clause.op) {
            (FieldKind::TextArray, FilterOp::Eq) => {
                Ok(format!("{} = ANY({})", self.param(clause.value.clone()), quoted_column))
            }
            (FieldKind::TextArray, FilterOp::In) => {
                let params = self.params(&clause.value);
                if params.is_empty() {
                    return Ok("1=0".to_string());
                }
                Ok(format!("{} && ARRAY[{}]::text[]", quoted_column, params.join(", ")))
            }
            (FieldKind::TextArray, op) => Err(FilterError::InvalidOperatorData {
                field: field.name.to_string(),
                op: op.to_sql().to_string(),
            }),
            (_, FilterOp::In) => {
                let params: Vec<String> = self.params(&clause.value).into_iter().map(|p| format!("{}{}", p, cast)).collect();
                if params.is_empty() {
                    return Ok("1=0".to_string());
                }
                Ok(format!("{} IN ({})", quoted_column, params.join(", ")))
            }
            (_, FilterOp::Eq) if clause.value.is_null() => Ok(format!("{} IS NULL", quoted_column)),
            (_, op) => Ok(format!("{} {} {}{}", quoted_column, op.to_sql(), self.param(clause.value.clone()), cast)),
        }
    }

    fn params(&mut self, value: &Value) -> Vec<String> {
        match value {
            Value::Array(values) => values.iter().map(|v| self.param(v.clone())).collect(),
            other => vec![self.param(other.clone())],
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}
